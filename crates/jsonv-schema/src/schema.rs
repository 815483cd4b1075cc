use std::fmt::Display;
use std::sync::Arc;

use either::Either;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pointer::SchemaRef;
use crate::value::ValueKind;

/// A compiled schema node: the generic keywords every schema may carry plus
/// the typed constraint node for its declared (or inferred) type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub examples: Option<Vec<Value>>,
    pub const_value: Option<Value>,
    pub enum_value: Option<Vec<Value>>,
    pub all_of: Option<Vec<Schema>>,
    pub any_of: Option<Vec<Schema>>,
    pub one_of: Option<Vec<Schema>>,
    pub not: Option<Box<Schema>>,
    /// Declared `type` names, in source order; empty when `type` was absent.
    pub types: Vec<SchemaType>,
    pub node: SchemaNode,
}

/// The closed set of typed constraint nodes. Every keyword combination is
/// checked at compile time instead of being discovered as a shape mismatch
/// during validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SchemaNode {
    /// An unresolved `$ref`; replaced in place by its target subtree during
    /// resolution.
    Ref(Box<RefNode>),
    /// No type-specific constraints at all.
    #[default]
    Any,
    Null,
    Boolean,
    String(StringSchema),
    Number(NumberSchema),
    Array(Box<ArraySchema>),
    Object(Box<ObjectSchema>),
    /// One constraint group per type when `type` names several, or when an
    /// untyped schema carries keywords spanning several groups.
    Union(Vec<SchemaNode>),
}

/// An unresolved reference together with the raw document it was compiled
/// from. Local targets resolve against `root`, never against the compiled
/// tree.
#[derive(Clone, Debug, PartialEq)]
pub struct RefNode {
    pub reference: SchemaRef,
    pub root: Arc<Value>,
    /// URL `root` was fetched from; `None` for the caller-supplied document.
    pub base_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringSchema {
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub pattern: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberSchema {
    pub maximum: Option<f64>,
    pub minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub multiple_of: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArraySchema {
    pub items: Option<OneOrMultiSchemas>,
    pub additional_items: Option<BoolOrSchema>,
    pub contains: Option<Schema>,
    pub max_items: Option<u64>,
    pub min_items: Option<u64>,
    pub unique_items: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectSchema {
    pub max_properties: Option<u64>,
    pub min_properties: Option<u64>,
    pub required: Option<Vec<String>>,
    pub properties: Option<IndexMap<String, Schema>>,
    pub pattern_properties: Option<IndexMap<String, Schema>>,
    pub additional_properties: Option<BoolOrSchema>,
    pub dependencies: Option<IndexMap<String, Dependency>>,
    /// Raw pattern every property name must match.
    pub property_names: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoolOrSchema {
    pub value: Either<bool, Box<Schema>>,
}

/// `items` in list mode (one schema for every element) or tuple mode
/// (positional schemas). The distinction is preserved into validation.
#[derive(Clone, Debug, PartialEq)]
pub struct OneOrMultiSchemas {
    pub value: Either<Box<Schema>, Vec<Schema>>,
}

/// A `dependencies` entry: either a list of property names that must
/// accompany the key, or a schema the whole value must satisfy.
#[derive(Clone, Debug, PartialEq)]
pub struct Dependency {
    pub value: Either<Vec<String>, Box<Schema>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Boolean,
    Integer,
    Null,
    Object,
    Array,
}

impl SchemaType {
    /// `type: "number"` accepts integer values; `type: "integer"` does not
    /// accept fractional ones.
    pub fn matches_kind(&self, kind: ValueKind) -> bool {
        match self {
            SchemaType::String => kind == ValueKind::String,
            SchemaType::Number => matches!(kind, ValueKind::Number | ValueKind::Integer),
            SchemaType::Boolean => kind == ValueKind::Boolean,
            SchemaType::Integer => kind == ValueKind::Integer,
            SchemaType::Null => kind == ValueKind::Null,
            SchemaType::Object => kind == ValueKind::Object,
            SchemaType::Array => kind == ValueKind::Array,
        }
    }
}

impl Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_str = match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
        };
        f.write_str(type_str)
    }
}

impl Schema {
    /// Whether the tree is free of `Ref` nodes and therefore ready for
    /// validation.
    pub fn is_resolved(&self) -> bool {
        self.subschemas().all(Schema::is_resolved) && node_resolved(&self.node)
    }

    fn subschemas(&self) -> impl Iterator<Item = &Schema> {
        self.not
            .iter()
            .map(|v| v.as_ref())
            .chain(self.all_of.iter().flatten())
            .chain(self.any_of.iter().flatten())
            .chain(self.one_of.iter().flatten())
    }
}

fn node_resolved(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Ref(_) => false,
        SchemaNode::Any | SchemaNode::Null | SchemaNode::Boolean => true,
        SchemaNode::String(_) | SchemaNode::Number(_) => true,
        SchemaNode::Array(array) => {
            let items_resolved = match array.items.as_ref().map(|v| v.value.as_ref()) {
                Some(Either::Left(schema)) => schema.is_resolved(),
                Some(Either::Right(schemas)) => schemas.iter().all(Schema::is_resolved),
                None => true,
            };
            items_resolved
                && bool_or_schema_resolved(array.additional_items.as_ref())
                && array.contains.as_ref().map_or(true, Schema::is_resolved)
        }
        SchemaNode::Object(object) => {
            object
                .properties
                .iter()
                .flatten()
                .all(|(_, v)| v.is_resolved())
                && object
                    .pattern_properties
                    .iter()
                    .flatten()
                    .all(|(_, v)| v.is_resolved())
                && bool_or_schema_resolved(object.additional_properties.as_ref())
                && object
                    .dependencies
                    .iter()
                    .flatten()
                    .all(|(_, dep)| match dep.value.as_ref() {
                        Either::Left(_) => true,
                        Either::Right(schema) => schema.is_resolved(),
                    })
        }
        SchemaNode::Union(members) => members.iter().all(node_resolved),
    }
}

fn bool_or_schema_resolved(value: Option<&BoolOrSchema>) -> bool {
    match value.map(|v| v.value.as_ref()) {
        Some(Either::Right(schema)) => schema.is_resolved(),
        _ => true,
    }
}
