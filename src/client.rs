// This file is part of the tf-client project
//
// Copyright (C) ANEO, 2026-2026. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [`Terraform`] client

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::{
    cmd::{Cmd, OutputPolicy},
    error::{Error, Result},
    plan::Plan,
    schema::SchemaDescription,
    state::State,
    version::Version,
};

/// Environment variable consulted before searching `PATH` for the binary
const BINARY_ENV: &str = "TERRAFORM_BIN";

/// Configuration file written into the working directory at construction
const CONFIGURATION_FILE: &str = "main.tf.json";

/// Client for one terraform working directory.
///
/// Every operation spawns the terraform binary as a child process inside the
/// client's working directory and resolves once the child has exited. The
/// plugin cache environment variable is overlaid on each invocation,
/// pointing at the binary's own install directory.
///
/// A client owns exactly one working directory and its methods are not meant
/// to run concurrently: terraform itself serializes on the directory, so
/// concurrent calls on the same instance are the caller's responsibility to
/// avoid.
#[derive(Debug)]
pub struct Terraform {
    binary: PathBuf,
    working_dir: PathBuf,
    /// Keeps an auto-created working directory alive (and removed on drop)
    _temp_dir: Option<tempfile::TempDir>,
}

impl Terraform {
    /// Create a client for `working_dir`, resolving the binary from the
    /// `TERRAFORM_BIN` environment variable or from `PATH`.
    ///
    /// The working directory is created when it does not exist yet.
    pub fn new(working_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_binary(Self::resolve_binary()?, working_dir)
    }

    /// Create a client for `working_dir` using an explicit binary path
    pub fn with_binary(
        binary: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let binary = binary.into();
        if !binary.is_file() {
            return Err(Error::BinaryNotFound);
        }
        let working_dir = working_dir.into();
        std::fs::create_dir_all(&working_dir)?;
        Ok(Self {
            binary,
            working_dir,
            _temp_dir: None,
        })
    }

    /// Create a client in a fresh temporary working directory.
    ///
    /// The directory lives as long as the client and is removed on drop.
    pub fn in_temp_dir() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("tf-client-").tempdir()?;
        let mut client = Self::with_binary(Self::resolve_binary()?, temp_dir.path())?;
        client._temp_dir = Some(temp_dir);
        Ok(client)
    }

    /// Write `configuration` as a pretty-printed `main.tf.json` into the
    /// working directory.
    ///
    /// The configuration schema is the caller's business; any encodable
    /// value goes.
    pub fn with_configuration<C: Serialize>(self, configuration: &C) -> Result<Self> {
        let content =
            serde_json::to_vec_pretty(configuration).map_err(|source| Error::Decode {
                document: "configuration",
                source,
            })?;
        let path = self.working_dir.join(CONFIGURATION_FILE);
        debug!(path = %path.display(), "writing configuration");
        std::fs::write(path, content)?;
        Ok(self)
    }

    fn resolve_binary() -> Result<PathBuf> {
        if let Some(binary) = std::env::var_os(BINARY_ENV) {
            return Ok(PathBuf::from(binary));
        }
        which::which("terraform").map_err(|_| Error::BinaryNotFound)
    }

    /// Path of the terraform binary in use
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Working directory of the client
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn cmd(&self) -> Cmd {
        let mut cmd = Cmd::new(&self.binary, &self.working_dir);
        // Share the plugin cache with the binary's install location so
        // repeated clients do not re-download providers.
        if let Some(cache) = self.binary.parent() {
            cmd = cmd.env("TF_PLUGIN_CACHE_DIR", cache);
        }
        cmd
    }

    /// `terraform init`
    pub async fn init(&self) -> Result<()> {
        self.cmd().arg("init").run().await?;
        Ok(())
    }

    /// `terraform plan`, rendered as JSON.
    ///
    /// The binary plan artifact goes through a private temporary file and
    /// comes back attached as [`Plan::raw`], so a later [`Self::apply`] can
    /// submit exactly the planned artifact.
    pub async fn plan(&self) -> Result<Plan> {
        let artifact = tempfile::Builder::new()
            .prefix("tf-client-plan-")
            .tempfile_in(&self.working_dir)?;
        self.cmd()
            .arg("plan")
            .arg("-out")
            .arg(artifact.path())
            .run()
            .await?;
        let output = self
            .cmd()
            .args(["show", "-json"])
            .arg(artifact.path())
            .stdout(OutputPolicy::Collect)
            .run()
            .await?;

        let mut plan = Plan::from_slice(&output.stdout)?;
        plan.raw = tokio::fs::read(artifact.path()).await?;
        Ok(plan)
    }

    /// `terraform apply` of a previously computed [`Plan`]
    pub async fn apply(&self, plan: &Plan) -> Result<()> {
        let artifact = tempfile::Builder::new()
            .prefix("tf-client-plan-")
            .tempfile_in(&self.working_dir)?;
        tokio::fs::write(artifact.path(), &plan.raw).await?;
        self.cmd()
            .args(["apply", "-auto-approve", "-input=false"])
            .arg(artifact.path())
            .run()
            .await?;
        Ok(())
    }

    /// `terraform destroy`
    pub async fn destroy(&self) -> Result<()> {
        self.cmd()
            .args(["destroy", "-auto-approve"])
            .arg(&self.working_dir)
            .run()
            .await?;
        Ok(())
    }

    /// Current state, via `terraform show -json`
    pub async fn state(&self) -> Result<State> {
        let output = self
            .cmd()
            .args(["show", "-json"])
            .stdout(OutputPolicy::Collect)
            .run()
            .await?;
        State::from_slice(&output.stdout)
    }

    /// Schemas of every provider in use, via `terraform providers schema -json`
    pub async fn schema(&self) -> Result<SchemaDescription> {
        let output = self
            .cmd()
            .args(["providers", "schema", "-json"])
            .stdout(OutputPolicy::Collect)
            .run()
            .await?;
        SchemaDescription::from_slice(&output.stdout)
    }

    /// Versions of the binary and of the initialized providers
    pub async fn version(&self) -> Result<Version> {
        let output = self
            .cmd()
            .arg("version")
            .stdout(OutputPolicy::Collect)
            .run()
            .await?;
        Version::parse(&String::from_utf8_lossy(&output.stdout))
    }

    /// Run an arbitrary terraform subcommand with explicit output policies
    /// and get the collected standard output back.
    ///
    /// Escape hatch for subcommands without a typed wrapper; the usual
    /// working directory and environment overlay apply.
    pub async fn invoke<I, A>(
        &self,
        args: I,
        stdout: OutputPolicy,
        stderr: OutputPolicy,
    ) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<std::ffi::OsStr>,
    {
        let output = self
            .cmd()
            .args(args)
            .stdout(stdout)
            .stderr(stderr)
            .run()
            .await?;
        Ok(output.stdout)
    }
}
