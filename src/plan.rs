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

//! Plan and configuration document (`terraform show -json <planfile>`)

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    state::{ResourceMode, State, Values},
    value::ScalarValue,
    Error,
};

/// Attribute expression of a configuration block
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Expression {
    /// Value of the expression when it is a constant
    #[serde(default, alias = "constantValue")]
    pub constant_value: Option<ScalarValue>,
    /// Traversals the expression refers to, expanded to strings
    #[serde(default)]
    pub references: Vec<String>,
}

/// Expression tree of a configuration block.
///
/// The JSON shape is polymorphic; decoding attempts each variant in
/// declaration order and keeps the first that matches:
/// a plain [`Expression`], a single-nested block, a sequence of nested
/// blocks, and finally a mapping of named nested blocks. A JSON scalar
/// matches none of them and fails the decode.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(untagged)]
pub enum BlockExpression {
    /// Leaf attribute expression
    Expression(Expression),
    /// Block that appears exactly once, keyed by its block name
    Single(Box<BlockExpression>),
    /// Blocks that repeat in order
    Sequence(Vec<BlockExpression>),
    /// Blocks keyed by name
    Mapping(HashMap<String, BlockExpression>),
}

impl BlockExpression {
    /// Expression keys that identify a leaf [`Expression`] object.
    ///
    /// An `Expression` has only optional fields and would otherwise match
    /// every JSON object, making the later variants unreachable.
    const EXPRESSION_KEYS: [&'static str; 3] = ["references", "constant_value", "constantValue"];

    fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error;
        match value {
            serde_json::Value::Object(fields) => {
                if Self::EXPRESSION_KEYS
                    .iter()
                    .any(|key| fields.contains_key(*key))
                {
                    if let Ok(expression) = Expression::deserialize(value) {
                        return Ok(BlockExpression::Expression(expression));
                    }
                }
                if fields.len() == 1 {
                    let inner = fields.values().next().unwrap();
                    if let Ok(inner) = Self::from_json(inner) {
                        return Ok(BlockExpression::Single(Box::new(inner)));
                    }
                }
                fields
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), Self::from_json(value)?)))
                    .collect::<Result<_, _>>()
                    .map(BlockExpression::Mapping)
            }
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<_, _>>()
                .map(BlockExpression::Sequence),
            _ => Err(serde_json::Error::custom("malformed block expression")),
        }
    }
}

impl<'de> Deserialize<'de> for BlockExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        BlockExpression::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Provider block of the configuration
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name of the provider
    pub name: String,
    /// Alias when the provider is configured more than once
    #[serde(default)]
    pub alias: Option<String>,
    /// Address of the module the provider is configured in
    #[serde(default, alias = "moduleAddress")]
    pub module_address: Option<String>,
    /// Attribute expressions of the provider block
    #[serde(default)]
    pub expressions: HashMap<String, BlockExpression>,
}

/// Output declaration of a module
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Property {
    /// Expression producing the output value
    #[serde(default)]
    pub expression: Expression,
    /// The output value is hidden from rendered output
    #[serde(default)]
    pub sensitive: bool,
}

/// Provisioner attached to a resource block
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Provisioner {
    /// Type of the provisioner (e.g. `local-exec`)
    #[serde(rename = "type")]
    pub provisioner_type: String,
    /// Attribute expressions of the provisioner block
    #[serde(default)]
    pub expressions: HashMap<String, BlockExpression>,
}

/// Resource block of the configuration
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ResourceConfiguration {
    /// Opaque, string-comparable address of the resource block
    pub address: String,
    /// Managed resource or data source
    pub mode: ResourceMode,
    /// Resource type (e.g. `random_pet`)
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name from the configuration
    pub name: String,
    /// Key into [`Configuration::provider_configs`]
    #[serde(alias = "providerConfigKey")]
    pub provider_config_key: String,
    /// Provisioners of the resource block
    #[serde(default)]
    pub provisioners: Vec<Provisioner>,
    /// Attribute expressions of the resource block
    #[serde(default)]
    pub expressions: HashMap<String, BlockExpression>,
    /// Version of the resource schema the block was written against
    #[serde(default, alias = "schemaVersion")]
    pub schema_version: i64,
    /// `count` meta-argument expression, when present
    #[serde(default, alias = "countExpression")]
    pub count_expression: Option<Expression>,
    /// `for_each` meta-argument expression, when present
    #[serde(default, alias = "forEachExpression")]
    pub for_each_expression: Option<Expression>,
}

/// Call of a child module, recursive through its module body
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ModuleCall {
    /// Source of the called module after resolution
    #[serde(alias = "resolvedSource")]
    pub resolved_source: String,
    /// Input expressions of the call
    #[serde(default)]
    pub expressions: HashMap<String, BlockExpression>,
    /// `count` meta-argument expression, when present
    #[serde(default, alias = "countExpression")]
    pub count_expression: Option<Expression>,
    /// `for_each` meta-argument expression, when present
    #[serde(default, alias = "forEachExpression")]
    pub for_each_expression: Option<Expression>,
    /// Body of the called module, which may call further modules
    #[serde(default)]
    pub module: ModuleConfiguration,
}

/// Body of a module in the configuration tree
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct ModuleConfiguration {
    /// Output declarations, by name
    #[serde(default)]
    pub outputs: HashMap<String, Property>,
    /// Resource blocks of the module
    #[serde(default)]
    pub resources: Vec<ResourceConfiguration>,
    /// Calls to child modules, by name
    #[serde(default, alias = "moduleCalls")]
    pub module_calls: HashMap<String, ModuleCall>,
}

/// Configuration tree of a plan
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Provider blocks, by configuration key
    #[serde(
        default,
        alias = "provider_config",
        alias = "providerConfig",
        alias = "providerConfigs"
    )]
    pub provider_configs: HashMap<String, ProviderConfig>,
    /// Body of the root module
    #[serde(default, alias = "rootModule")]
    pub root_module: ModuleConfiguration,
}

impl Configuration {
    /// Resource blocks of the root module
    pub fn resources(&self) -> &[ResourceConfiguration] {
        &self.root_module.resources
    }
    /// Module calls of the root module
    pub fn module_calls(&self) -> &HashMap<String, ModuleCall> {
        &self.root_module.module_calls
    }
}

/// One step of a change
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Nothing to do
    NoOp,
    /// Create the object
    Create,
    /// Read the object (data sources)
    Read,
    /// Update the object in place
    Update,
    /// Delete the object
    Delete,
}

/// Planned change of a resource or output.
///
/// `actions` holds one of the permitted combinations: `[no-op]`,
/// `[create]`, `[read]`, `[update]`, `[delete]`, or the two replace
/// orderings `[delete, create]` and `[create, delete]`. `before` is absent
/// for a create, `after` is absent for a delete.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Change<V> {
    /// Ordered action list
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Value before the change
    #[serde(default)]
    pub before: Option<V>,
    /// Value after the change
    #[serde(default)]
    pub after: Option<V>,
}

impl<V> Change<V> {
    /// Whether the change leaves the object untouched
    pub fn is_no_op(&self) -> bool {
        self.actions == [Action::NoOp]
    }
    /// Whether the change creates the object
    pub fn is_create(&self) -> bool {
        self.actions == [Action::Create]
    }
    /// Whether the change reads the object
    pub fn is_read(&self) -> bool {
        self.actions == [Action::Read]
    }
    /// Whether the change updates the object in place
    pub fn is_update(&self) -> bool {
        self.actions == [Action::Update]
    }
    /// Whether the change deletes the object without replacement
    pub fn is_delete(&self) -> bool {
        self.actions == [Action::Delete]
    }
    /// Whether the change replaces the object (either ordering)
    pub fn is_replace(&self) -> bool {
        self.actions == [Action::Delete, Action::Create]
            || self.actions == [Action::Create, Action::Delete]
    }
}

/// Planned change of one resource instance.
///
/// `(address, deposed)` is unique across a plan: during a replacement the
/// object being disposed of is tracked separately under a deposed key.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Opaque, string-comparable address of the instance
    pub address: String,
    /// Address of the containing module, absent for the root module
    #[serde(default, alias = "moduleAddress")]
    pub module_address: Option<String>,
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
    /// Deposed key when the change concerns a replaced object
    #[serde(default)]
    pub deposed: Option<String>,
    /// The change itself, over the resource's attribute values
    pub change: Change<BTreeMap<String, ScalarValue>>,
}

/// Value planned for an input variable
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct PlanVariable {
    /// The variable value
    #[serde(default)]
    pub value: ScalarValue,
}

/// Top-level document produced by `terraform show -json <planfile>`
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Bytes of the binary plan artifact the document was rendered from.
    ///
    /// The JSON document does not contain the artifact; [`crate::Terraform::plan`]
    /// attaches it after decoding. [`crate::Terraform::apply`] submits these
    /// bytes unchanged.
    #[serde(skip)]
    pub raw: Vec<u8>,
    /// Version of the document format
    #[serde(default, alias = "formatVersion")]
    pub format_version: Option<String>,
    /// Version of the terraform binary that produced the plan
    #[serde(default, alias = "terraformVersion")]
    pub terraform_version: Option<String>,
    /// State the plan was computed against, absent on a first run
    #[serde(default, alias = "priorState")]
    pub prior_state: Option<State>,
    /// Configuration tree the plan was computed from
    #[serde(default)]
    pub configuration: Configuration,
    /// Values as they will be once the plan is applied
    #[serde(default, alias = "plannedValues")]
    pub planned_values: Values,
    /// Markers for values only known after apply (booleans, not values)
    #[serde(default, alias = "proposedUnknown")]
    pub proposed_unknown: Option<Values>,
    /// Input variables of the plan, by name; absent means none
    #[serde(default)]
    pub variables: HashMap<String, PlanVariable>,
    /// Planned resource changes; absent means none
    #[serde(default, alias = "resourceChanges")]
    pub resource_changes: Vec<ResourceChange>,
    /// Planned output changes, by name; absent means none
    #[serde(default, alias = "outputChanges")]
    pub output_changes: HashMap<String, Change<ScalarValue>>,
}

impl Plan {
    /// Decode a `terraform show -json <planfile>` byte buffer.
    ///
    /// The decoded plan has no raw artifact attached (`raw` is empty).
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(data).map_err(|source| Error::decode("plan", source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_decodes_before_block_variants() {
        let expr: BlockExpression =
            serde_json::from_str(r#"{"references": ["var.prefix"]}"#).unwrap();
        assert_eq!(
            expr,
            BlockExpression::Expression(Expression {
                constant_value: None,
                references: vec!["var.prefix".into()],
            })
        );

        let expr: BlockExpression = serde_json::from_str(r#"{"constant_value": 2}"#).unwrap();
        let BlockExpression::Expression(expr) = expr else {
            panic!("expected an expression");
        };
        assert_eq!(expr.constant_value, Some(2i64.into()));
        assert!(expr.references.is_empty());
    }

    #[test]
    fn single_entry_object_decodes_as_single_nested_block() {
        let expr: BlockExpression =
            serde_json::from_str(r#"{"timeouts": {"create": {"constant_value": "5m"}}}"#).unwrap();
        let BlockExpression::Single(inner) = expr else {
            panic!("expected a single-nested block");
        };
        let BlockExpression::Single(inner) = *inner else {
            panic!("expected the nested single block body");
        };
        assert!(matches!(*inner, BlockExpression::Expression(_)));
    }

    #[test]
    fn arrays_and_objects_decode_as_sequence_and_mapping() {
        let expr: BlockExpression = serde_json::from_str(
            r#"[
                {"from_port": {"constant_value": 80}, "to_port": {"constant_value": 80}},
                {"from_port": {"constant_value": 443}, "to_port": {"constant_value": 443}}
            ]"#,
        )
        .unwrap();
        let BlockExpression::Sequence(items) = expr else {
            panic!("expected a sequence of blocks");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], BlockExpression::Mapping(_)));
    }

    #[test]
    fn scalar_block_expression_is_malformed() {
        let err = serde_json::from_str::<BlockExpression>("42").unwrap_err();
        assert!(err.to_string().contains("malformed"), "{err}");
    }

    #[test]
    fn action_wire_spellings() {
        let actions: Vec<Action> =
            serde_json::from_str(r#"["no-op", "create", "read", "update", "delete"]"#).unwrap();
        assert_eq!(
            actions,
            [
                Action::NoOp,
                Action::Create,
                Action::Read,
                Action::Update,
                Action::Delete,
            ]
        );
    }

    #[test]
    fn change_action_combinations() {
        let change: Change<ScalarValue> =
            serde_json::from_str(r#"{"actions": ["create"], "after": "x"}"#).unwrap();
        assert!(change.is_create() && !change.is_replace());
        assert_eq!(change.before, None);

        let change: Change<ScalarValue> =
            serde_json::from_str(r#"{"actions": ["delete"], "before": "x"}"#).unwrap();
        assert!(change.is_delete());
        assert_eq!(change.after, None);

        let change: Change<ScalarValue> = serde_json::from_str(
            r#"{"actions": ["delete", "create"], "before": "x", "after": "y"}"#,
        )
        .unwrap();
        assert!(change.is_replace());
        let change: Change<ScalarValue> = serde_json::from_str(
            r#"{"actions": ["create", "delete"], "before": "x", "after": "y"}"#,
        )
        .unwrap();
        assert!(change.is_replace());

        let change: Change<ScalarValue> =
            serde_json::from_str(r#"{"actions": ["no-op"], "before": "x", "after": "x"}"#).unwrap();
        assert!(change.is_no_op());
        assert_eq!(change.before, change.after);
    }

    #[test]
    fn absent_change_collections_mean_none_present() {
        let plan = Plan::from_slice(br#"{"format_version": "0.1"}"#).unwrap();
        assert!(plan.variables.is_empty());
        assert!(plan.resource_changes.is_empty());
        assert!(plan.output_changes.is_empty());
        assert!(plan.prior_state.is_none());
        assert_eq!(plan.planned_values.resource_count(), 0);
    }

    #[test]
    fn configuration_accessors_delegate_to_root_module() {
        let configuration: Configuration = serde_json::from_str(
            r#"{
                "provider_config": {
                    "random": {"name": "random"}
                },
                "root_module": {
                    "resources": [
                        {
                            "address": "random_pet.animal",
                            "mode": "managed",
                            "type": "random_pet",
                            "name": "animal",
                            "provider_config_key": "random",
                            "expressions": {"length": {"constant_value": 2}},
                            "schema_version": 0
                        }
                    ],
                    "module_calls": {
                        "network": {
                            "resolved_source": "./network",
                            "expressions": {"cidr": {"references": ["var.cidr"]}},
                            "module": {}
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(configuration.provider_configs["random"].name, "random");
        assert_eq!(configuration.resources().len(), 1);
        assert_eq!(configuration.resources()[0].provider_config_key, "random");
        let network = &configuration.module_calls()["network"];
        assert_eq!(network.resolved_source, "./network");
        assert!(network.module.resources.is_empty());
    }
}
