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

//! Plain-text output of `terraform version`

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Versions reported by `terraform version`.
///
/// The command emits plain text, not JSON:
///
/// ```text
/// Terraform v0.13.2
/// + provider.random v2.3.0
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Version {
    /// Version of the terraform binary, leading `v` stripped
    pub version: String,
    /// Version of each initialized provider, by provider name
    pub providers: HashMap<String, String>,
}

impl Version {
    /// Parse the line-oriented output of `terraform version`.
    ///
    /// The first line starting with the `Terraform` marker yields the tool
    /// version; each `+`-prefixed line yields one provider entry. Output
    /// without a version line is an [`Error::UnexpectedOutput`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut version = None;
        let mut providers = HashMap::new();

        for line in text.lines() {
            if line.starts_with("Terraform ") && version.is_none() {
                version = line
                    .split_whitespace()
                    .nth(1)
                    .map(|field| field.strip_prefix('v').unwrap_or(field).to_owned());
            } else if line.starts_with('+') {
                let mut fields = line.split_whitespace().skip(1);
                if let (Some(name), Some(provider_version)) = (fields.next(), fields.next()) {
                    providers.insert(
                        name.strip_prefix("provider.").unwrap_or(name).to_owned(),
                        provider_version
                            .strip_prefix('v')
                            .unwrap_or(provider_version)
                            .to_owned(),
                    );
                }
            }
        }

        match version {
            Some(version) => Ok(Version { version, providers }),
            None => Err(Error::UnexpectedOutput(format!(
                "no version line in {text:?}"
            ))),
        }
    }
}
