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

//! State document (`terraform show -json`)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{value::ScalarValue, Error};

/// Whether a resource is managed or only read
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    /// Resource managed by terraform
    Managed,
    /// Data source, read but not managed
    Data,
}

/// One resource instance of a module
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Resource {
    /// Opaque, string-comparable address of the instance
    pub address: String,
    /// Managed resource or data source
    pub mode: ResourceMode,
    /// Resource type (e.g. `random_pet`)
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name from the configuration
    pub name: String,
    /// Instance index, present when the resource uses `count`
    #[serde(default)]
    pub index: Option<i64>,
    /// Name of the provider the resource belongs to
    #[serde(alias = "providerName")]
    pub provider_name: String,
    /// Version of the resource schema the values were written with
    #[serde(alias = "schemaVersion")]
    pub schema_version: i64,
    /// Attribute values, shaped by the provider schema
    #[serde(default)]
    pub values: Option<BTreeMap<String, ScalarValue>>,
}

/// Tree of resources, recursive through child modules
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Module {
    /// Resources of the module itself
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Nested modules
    #[serde(default, alias = "childModules")]
    pub child_modules: Vec<ChildModule>,
}

impl Module {
    /// Number of resources in the module and all of its descendants
    pub fn resource_count(&self) -> usize {
        self.resources.len()
            + self
                .child_modules
                .iter()
                .map(|child| child.module.resource_count())
                .sum::<usize>()
    }
}

/// A [`Module`] addressed below the root
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ChildModule {
    /// Opaque, module-scoped address (e.g. `module.network`)
    pub address: String,
    /// Content of the module
    #[serde(flatten)]
    pub module: Module,
}

/// Output values and the resource tree of a state or of planned values
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Values {
    /// Output values, by name
    #[serde(default)]
    pub outputs: BTreeMap<String, ScalarValue>,
    /// Root of the module tree, absent when nothing is recorded
    #[serde(default, alias = "rootModule")]
    pub root_module: Option<Module>,
}

impl Values {
    /// Number of resources across the whole module tree
    pub fn resource_count(&self) -> usize {
        self.root_module
            .as_ref()
            .map_or(0, Module::resource_count)
    }
}

/// Top-level document produced by `terraform show -json`
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct State {
    /// Version of the document format
    #[serde(default, alias = "formatVersion")]
    pub format_version: Option<String>,
    /// Version of the terraform binary that wrote the state
    #[serde(alias = "terraformVersion")]
    pub terraform_version: String,
    /// Current output values and resource tree
    #[serde(default)]
    pub values: Values,
}

impl State {
    /// Decode a `terraform show -json` byte buffer
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(data).map_err(|source| Error::decode("state", source))
    }
}
