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

//! Subprocess invocation layer

use std::{
    ffi::{OsStr, OsString},
    path::PathBuf,
    process::Stdio,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::Command,
};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// What to do with one output stream of the child process
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OutputPolicy {
    /// Redirect the stream to the null sink
    Discard,
    /// Let the child inherit the caller's own stream
    Passthrough,
    /// Buffer silently; replay to the caller's stream only when the child
    /// exits with a non-zero status
    #[default]
    PassthroughOnFailure,
    /// Accumulate every byte and deliver the complete buffer once the child
    /// has exited; nothing is delivered while it runs
    Collect,
}

impl OutputPolicy {
    fn stdio(self) -> Stdio {
        match self {
            OutputPolicy::Discard => Stdio::null(),
            OutputPolicy::Passthrough => Stdio::inherit(),
            OutputPolicy::PassthroughOnFailure | OutputPolicy::Collect => Stdio::piped(),
        }
    }
}

/// Buffers captured from the child, empty for streams that were not piped
#[derive(Debug, Default)]
pub(crate) struct CmdOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// One invocation of the external binary.
///
/// Running blocks the calling task until the child has exited and both
/// capture buffers are complete; there is no partial delivery and no
/// built-in timeout.
#[derive(Debug)]
pub(crate) struct Cmd {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: PathBuf,
    envs: Vec<(OsString, OsString)>,
    stdout: OutputPolicy,
    stderr: OutputPolicy,
}

impl Cmd {
    pub fn new(program: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: current_dir.into(),
            envs: Vec::new(),
            stdout: OutputPolicy::default(),
            stderr: OutputPolicy::default(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        self
    }

    pub fn stdout(mut self, policy: OutputPolicy) -> Self {
        self.stdout = policy;
        self
    }

    pub fn stderr(mut self, policy: OutputPolicy) -> Self {
        self.stderr = policy;
        self
    }

    /// Spawn the child and wait for it to exit.
    ///
    /// Piped streams are drained concurrently with the wait so a full OS
    /// pipe buffer cannot wedge the child; the drains are complete before
    /// this returns. A non-zero exit yields [`Error::Exit`] with the exit
    /// code and whatever was captured.
    pub async fn run(self) -> Result<CmdOutput> {
        debug!(
            program = %self.program.display(),
            args = ?self.args,
            cwd = %self.current_dir.display(),
            "invoking terraform",
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.current_dir)
            .stdin(Stdio::inherit())
            .stdout(self.stdout.stdio())
            .stderr(self.stderr.stdio());
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let (status, stdout, stderr) =
            tokio::join!(child.wait(), drain(stdout_pipe), drain(stderr_pipe));
        let (status, stdout, stderr) = (status?, stdout?, stderr?);

        trace!(
            code = ?status.code(),
            stdout = stdout.len(),
            stderr = stderr.len(),
            "terraform exited",
        );

        if status.success() {
            return Ok(CmdOutput { stdout, stderr });
        }

        if self.stdout == OutputPolicy::PassthroughOnFailure && !stdout.is_empty() {
            let mut sink = tokio::io::stdout();
            sink.write_all(&stdout).await?;
            sink.flush().await?;
        }
        if self.stderr == OutputPolicy::PassthroughOnFailure && !stderr.is_empty() {
            let mut sink = tokio::io::stderr();
            sink.write_all(&stderr).await?;
            sink.flush().await?;
        }

        Err(Error::Exit {
            code: status.code().unwrap_or(0x7fffffff),
            stdout,
            stderr,
        })
    }
}

async fn drain<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Cmd {
        Cmd::new("/bin/sh", ".").args(["-c", script])
    }

    #[tokio::test]
    async fn collect_delivers_complete_buffers() {
        let output = sh("printf out; printf err 1>&2")
            .stdout(OutputPolicy::Collect)
            .stderr(OutputPolicy::Collect)
            .run()
            .await
            .unwrap();
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
    }

    #[tokio::test]
    async fn discard_captures_nothing() {
        let output = sh("printf noise")
            .stdout(OutputPolicy::Discard)
            .stderr(OutputPolicy::Discard)
            .run()
            .await
            .unwrap();
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn failure_carries_exit_code_and_captured_bytes() {
        let err = sh("printf partial; exit 1")
            .stdout(OutputPolicy::PassthroughOnFailure)
            .stderr(OutputPolicy::Discard)
            .run()
            .await
            .unwrap_err();
        let Error::Exit {
            code,
            stdout,
            stderr,
        } = err
        else {
            panic!("expected an exit error, got {err}");
        };
        assert_eq!(code, 1);
        assert_eq!(stdout, b"partial");
        assert!(stderr.is_empty());
    }

    #[tokio::test]
    async fn large_output_does_not_wedge_the_child() {
        // Well past the usual 64 KiB pipe buffer.
        let output = sh("head -c 1000000 /dev/zero")
            .stdout(OutputPolicy::Collect)
            .run()
            .await
            .unwrap();
        assert_eq!(output.stdout.len(), 1_000_000);
    }

    #[tokio::test]
    async fn invocation_logging_runs_under_a_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let output = sh("printf logged")
            .stdout(OutputPolicy::Collect)
            .run()
            .await
            .unwrap();
        assert_eq!(output.stdout, b"logged");
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let err = Cmd::new("/nonexistent/terraform", ".").run().await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }), "{err}");
    }

    #[tokio::test]
    async fn working_directory_and_env_overlay_apply() {
        let dir = tempfile::tempdir().unwrap();
        let output = Cmd::new("/bin/sh", dir.path())
            .args(["-c", "printf '%s:%s' \"$PWD\" \"$TF_CLIENT_TEST\""])
            .env("TF_CLIENT_TEST", "overlay")
            .stdout(OutputPolicy::Collect)
            .run()
            .await
            .unwrap();
        let text = String::from_utf8(output.stdout).unwrap();
        let (pwd, overlay) = text.rsplit_once(':').unwrap();
        assert_eq!(
            std::fs::canonicalize(pwd).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
        assert_eq!(overlay, "overlay");
    }
}
