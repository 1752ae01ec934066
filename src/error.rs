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

//! Error type of the crate

use std::path::PathBuf;

/// Any error surfaced by the client
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A JSON document did not have the expected shape
    #[error("malformed {document} document: {source}")]
    Decode {
        /// Which document was being decoded
        document: &'static str,
        /// The underlying decode failure
        #[source]
        source: serde_json::Error,
    },

    /// A type specification carried a tag this crate does not model
    #[error("unknown type {tag:?} in {document} document")]
    UnknownType {
        /// Which document was being decoded
        document: &'static str,
        /// The unrecognized type tag, verbatim
        tag: String,
    },

    /// The terraform binary could not be found
    #[error("terraform binary not found (set TERRAFORM_BIN or install terraform on PATH)")]
    BinaryNotFound,

    /// The child process could not be started
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: PathBuf,
        /// The underlying launch failure
        #[source]
        source: std::io::Error,
    },

    /// The child process exited with a non-zero status
    #[error("terraform exited with status {code}")]
    Exit {
        /// Exit code of the child
        code: i32,
        /// Captured standard output, empty unless the stream was piped
        stdout: Vec<u8>,
        /// Captured standard error, empty unless the stream was piped
        stderr: Vec<u8>,
    },

    /// Plain-text output did not match the expected line grammar
    #[error("unexpected terraform output: {0}")]
    UnexpectedOutput(String),

    /// A filesystem operation failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Fetching or unpacking a terraform release failed.
    ///
    /// Never produced by this crate itself: acquiring the binary is left to
    /// layers built on top of it, which report their failures here.
    #[error("failed to acquire terraform release: {0}")]
    Download(String),
}

impl Error {
    /// Wrap a document decode failure, pulling the unrecognized-type-tag
    /// case out into [`Error::UnknownType`] so callers can match on it.
    ///
    /// The type-specification decoder reports unknown tags with a fixed
    /// `unknown type "<tag>"` message; everything else stays a plain
    /// [`Error::Decode`].
    pub(crate) fn decode(document: &'static str, source: serde_json::Error) -> Self {
        let message = source.to_string();
        if let Some(rest) = message.split_once("unknown type \"").map(|(_, rest)| rest) {
            if let Some((tag, _)) = rest.split_once('"') {
                return Error::UnknownType {
                    document,
                    tag: tag.to_owned(),
                };
            }
        }
        Error::Decode { document, source }
    }
}

/// Alias of `Result` with the crate error
pub type Result<T, E = Error> = std::result::Result<T, E>;
