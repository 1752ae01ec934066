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

//! Terraform client library
//!
//! It drives the `terraform` binary as a subprocess and decodes the JSON
//! documents it emits (state, plan, and provider schema) into typed
//! models.
//!
//! A [`Terraform`] client owns one working directory and exposes the usual
//! lifecycle as async methods ([`init`](Terraform::init),
//! [`plan`](Terraform::plan), [`apply`](Terraform::apply),
//! [`destroy`](Terraform::destroy)) plus typed accessors for the rendered
//! documents ([`state`](Terraform::state), [`schema`](Terraform::schema),
//! [`version`](Terraform::version)). The document models can also be used
//! on their own to decode JSON captured elsewhere, via
//! [`Plan::from_slice`], [`State::from_slice`], and
//! [`SchemaDescription::from_slice`].

mod client;
mod cmd;
mod error;
mod version;

pub mod plan;
pub mod schema;
pub mod state;
pub mod value;

pub use client::Terraform;
pub use cmd::OutputPolicy;
pub use error::{Error, Result};
pub use plan::{Action, Change, Plan, ResourceChange};
pub use schema::{Schema, SchemaDescription, TypeSpec};
pub use state::{Module, Resource, ResourceMode, State, Values};
pub use value::ScalarValue;
pub use version::Version;
