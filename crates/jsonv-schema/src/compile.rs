use std::str::FromStr;
use std::sync::Arc;

use either::Either;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::pointer::SchemaRef;
use crate::schema::{
    ArraySchema, BoolOrSchema, Dependency, NumberSchema, ObjectSchema, OneOrMultiSchemas, RefNode,
    Schema, SchemaNode, SchemaType, StringSchema,
};
use crate::value::resolve_kind;

const STRING_KEYWORDS: &[&str] = &["maxLength", "minLength", "pattern"];
const NUMBER_KEYWORDS: &[&str] = &[
    "maximum",
    "minimum",
    "exclusiveMaximum",
    "exclusiveMinimum",
    "multipleOf",
];
const ARRAY_KEYWORDS: &[&str] = &[
    "items",
    "additionalItems",
    "contains",
    "maxItems",
    "minItems",
    "uniqueItems",
];
const OBJECT_KEYWORDS: &[&str] = &[
    "maxProperties",
    "minProperties",
    "required",
    "properties",
    "patternProperties",
    "additionalProperties",
    "dependencies",
    "propertyNames",
];

/// Compile a raw schema document into a typed [`Schema`] tree. `$ref`
/// targets are left unresolved; compilation never fetches.
pub fn compile(raw: &Value) -> SchemaResult<Schema> {
    let root = Arc::new(raw.clone());
    Compiler::new(root, None).compile(raw)
}

impl TryFrom<&Value> for Schema {
    type Error = SchemaError;

    fn try_from(raw: &Value) -> SchemaResult<Self> {
        compile(raw)
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        let raw: Value = serde_json::from_str(s).map_err(|err| SchemaError::MalformedSchema {
            reason: err.to_string(),
        })?;
        compile(&raw)
    }
}

pub(crate) struct Compiler {
    root: Arc<Value>,
    base_url: Option<String>,
}

impl Compiler {
    pub(crate) fn new(root: Arc<Value>, base_url: Option<String>) -> Self {
        Self { root, base_url }
    }

    pub(crate) fn compile(&self, raw: &Value) -> SchemaResult<Schema> {
        let obj = match raw {
            Value::Object(v) => v,
            _ => {
                return Err(malformed(format!(
                    "expected an object, got {}",
                    resolve_kind(raw)
                )))
            }
        };

        if let Some(ref_value) = obj.get("$ref") {
            let text = ref_value
                .as_str()
                .ok_or_else(|| malformed("`$ref` must be a string"))?;
            // `$ref` is exclusive, sibling keywords are ignored
            return Ok(Schema {
                node: SchemaNode::Ref(Box::new(RefNode {
                    reference: SchemaRef::parse(text),
                    root: self.root.clone(),
                    base_url: self.base_url.clone(),
                })),
                ..Default::default()
            });
        }

        let mut schema = Schema {
            id: match take_string(obj, "$id")? {
                Some(v) => Some(v),
                None => take_string(obj, "id")?,
            },
            title: take_string(obj, "title")?,
            description: take_string(obj, "description")?,
            default: obj.get("default").cloned(),
            examples: take_values(obj, "examples")?,
            const_value: obj.get("const").cloned(),
            enum_value: take_values(obj, "enum")?,
            all_of: self.compile_sequence(obj, "allOf")?,
            any_of: self.compile_sequence(obj, "anyOf")?,
            one_of: self.compile_sequence(obj, "oneOf")?,
            not: match obj.get("not") {
                Some(v) => Some(Box::new(self.compile(v)?)),
                None => None,
            },
            ..Default::default()
        };

        schema.types = compile_types(obj)?;
        check_keyword_compatibility(obj, &schema.types)?;

        let string = self.compile_string_group(obj)?;
        let number = self.compile_number_group(obj)?;
        let array = self.compile_array_group(obj)?;
        let object = self.compile_object_group(obj)?;
        schema.node = build_node(&schema.types, string, number, array, object);
        Ok(schema)
    }

    fn compile_string_group(&self, obj: &Map<String, Value>) -> SchemaResult<Option<StringSchema>> {
        if !has_any(obj, STRING_KEYWORDS) {
            return Ok(None);
        }
        Ok(Some(StringSchema {
            max_length: take_u64(obj, "maxLength")?,
            min_length: take_u64(obj, "minLength")?,
            pattern: take_string(obj, "pattern")?,
        }))
    }

    fn compile_number_group(&self, obj: &Map<String, Value>) -> SchemaResult<Option<NumberSchema>> {
        if !has_any(obj, NUMBER_KEYWORDS) {
            return Ok(None);
        }
        Ok(Some(NumberSchema {
            maximum: take_f64(obj, "maximum")?,
            minimum: take_f64(obj, "minimum")?,
            exclusive_maximum: take_f64(obj, "exclusiveMaximum")?,
            exclusive_minimum: take_f64(obj, "exclusiveMinimum")?,
            multiple_of: take_f64(obj, "multipleOf")?,
        }))
    }

    fn compile_array_group(&self, obj: &Map<String, Value>) -> SchemaResult<Option<ArraySchema>> {
        if !has_any(obj, ARRAY_KEYWORDS) {
            return Ok(None);
        }
        let items = match obj.get("items") {
            None => None,
            Some(Value::Array(schemas)) => {
                // tuple mode: positional schemas
                let schemas = schemas
                    .iter()
                    .map(|v| self.compile(v))
                    .collect::<SchemaResult<Vec<_>>>()?;
                Some(OneOrMultiSchemas {
                    value: Either::Right(schemas),
                })
            }
            Some(value) => Some(OneOrMultiSchemas {
                value: Either::Left(Box::new(self.compile(value)?)),
            }),
        };
        Ok(Some(ArraySchema {
            items,
            additional_items: self.compile_bool_or_schema(obj, "additionalItems")?,
            contains: match obj.get("contains") {
                Some(v) => Some(self.compile(v)?),
                None => None,
            },
            max_items: take_u64(obj, "maxItems")?,
            min_items: take_u64(obj, "minItems")?,
            unique_items: take_bool(obj, "uniqueItems")?.unwrap_or(false),
        }))
    }

    fn compile_object_group(&self, obj: &Map<String, Value>) -> SchemaResult<Option<ObjectSchema>> {
        if !has_any(obj, OBJECT_KEYWORDS) {
            return Ok(None);
        }
        Ok(Some(ObjectSchema {
            max_properties: take_u64(obj, "maxProperties")?,
            min_properties: take_u64(obj, "minProperties")?,
            required: take_string_list(obj, "required")?,
            properties: self.compile_schema_map(obj, "properties")?,
            pattern_properties: self.compile_schema_map(obj, "patternProperties")?,
            additional_properties: self.compile_bool_or_schema(obj, "additionalProperties")?,
            dependencies: self.compile_dependencies(obj)?,
            property_names: take_string(obj, "propertyNames")?,
        }))
    }

    fn compile_sequence(
        &self,
        obj: &Map<String, Value>,
        key: &str,
    ) -> SchemaResult<Option<Vec<Schema>>> {
        match obj.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(
                items
                    .iter()
                    .map(|v| self.compile(v))
                    .collect::<SchemaResult<_>>()?,
            )),
            Some(other) => Err(malformed(format!(
                "`{}` must be an array of schemas, got {}",
                key,
                resolve_kind(other)
            ))),
        }
    }

    fn compile_schema_map(
        &self,
        obj: &Map<String, Value>,
        key: &str,
    ) -> SchemaResult<Option<IndexMap<String, Schema>>> {
        match obj.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => {
                let mut result = IndexMap::with_capacity(map.len());
                for (name, value) in map.iter() {
                    result.insert(name.clone(), self.compile(value)?);
                }
                Ok(Some(result))
            }
            Some(other) => Err(malformed(format!(
                "`{}` must be an object of schemas, got {}",
                key,
                resolve_kind(other)
            ))),
        }
    }

    fn compile_bool_or_schema(
        &self,
        obj: &Map<String, Value>,
        key: &str,
    ) -> SchemaResult<Option<BoolOrSchema>> {
        match obj.get(key) {
            None => Ok(None),
            Some(Value::Bool(allowed)) => Ok(Some(BoolOrSchema {
                value: Either::Left(*allowed),
            })),
            Some(value @ Value::Object(_)) => Ok(Some(BoolOrSchema {
                value: Either::Right(Box::new(self.compile(value)?)),
            })),
            Some(other) => Err(malformed(format!(
                "`{}` must be a boolean or a schema, got {}",
                key,
                resolve_kind(other)
            ))),
        }
    }

    fn compile_dependencies(
        &self,
        obj: &Map<String, Value>,
    ) -> SchemaResult<Option<IndexMap<String, Dependency>>> {
        let map = match obj.get("dependencies") {
            None => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(malformed(format!(
                    "`dependencies` must be an object, got {}",
                    resolve_kind(other)
                )))
            }
        };
        let mut result = IndexMap::with_capacity(map.len());
        for (name, value) in map.iter() {
            let dependency = match value {
                Value::Array(names) => Dependency {
                    value: Either::Left(string_list(names, "dependencies")?),
                },
                Value::Object(_) => Dependency {
                    value: Either::Right(Box::new(self.compile(value)?)),
                },
                other => {
                    return Err(malformed(format!(
                        "`dependencies` entry `{}` must be a list of names or a schema, got {}",
                        name,
                        resolve_kind(other)
                    )))
                }
            };
            result.insert(name.clone(), dependency);
        }
        Ok(Some(result))
    }
}

fn compile_types(obj: &Map<String, Value>) -> SchemaResult<Vec<SchemaType>> {
    match obj.get("type") {
        None => Ok(Vec::new()),
        Some(value @ Value::String(_)) => Ok(vec![parse_type(value)?]),
        Some(Value::Array(items)) => items.iter().map(parse_type).collect(),
        Some(other) => Err(SchemaError::InvalidType {
            value: other.to_string(),
        }),
    }
}

fn parse_type(value: &Value) -> SchemaResult<SchemaType> {
    serde_json::from_value(value.clone()).map_err(|_| SchemaError::InvalidType {
        value: value.to_string(),
    })
}

fn check_keyword_compatibility(
    obj: &Map<String, Value>,
    types: &[SchemaType],
) -> SchemaResult<()> {
    if types.is_empty() {
        return Ok(());
    }
    let allow_string = types.contains(&SchemaType::String);
    let allow_number =
        types.contains(&SchemaType::Number) || types.contains(&SchemaType::Integer);
    let allow_array = types.contains(&SchemaType::Array);
    let allow_object = types.contains(&SchemaType::Object);
    for keyword in obj.keys() {
        let allowed = if STRING_KEYWORDS.contains(&keyword.as_str()) {
            allow_string
        } else if NUMBER_KEYWORDS.contains(&keyword.as_str()) {
            allow_number
        } else if ARRAY_KEYWORDS.contains(&keyword.as_str()) {
            allow_array
        } else if OBJECT_KEYWORDS.contains(&keyword.as_str()) {
            allow_object
        } else {
            continue;
        };
        if !allowed {
            return Err(SchemaError::IncompatibleKeyword {
                keyword: keyword.clone(),
                declared: types
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(","),
            });
        }
    }
    Ok(())
}

fn build_node(
    types: &[SchemaType],
    string: Option<StringSchema>,
    number: Option<NumberSchema>,
    array: Option<ArraySchema>,
    object: Option<ObjectSchema>,
) -> SchemaNode {
    if types.is_empty() {
        // type is inferred from whichever constraint groups are present
        let mut members: Vec<SchemaNode> = Vec::new();
        if let Some(v) = number {
            members.push(SchemaNode::Number(v));
        }
        if let Some(v) = string {
            members.push(SchemaNode::String(v));
        }
        if let Some(v) = array {
            members.push(SchemaNode::Array(Box::new(v)));
        }
        if let Some(v) = object {
            members.push(SchemaNode::Object(Box::new(v)));
        }
        return match members.len() {
            0 => SchemaNode::Any,
            1 => members.remove(0),
            _ => SchemaNode::Union(members),
        };
    }

    let mut string = string;
    let mut number = number;
    let mut array = array;
    let mut object = object;
    let mut members: Vec<SchemaNode> = Vec::new();
    let mut seen: Vec<SchemaType> = Vec::new();
    for schema_type in types {
        // integer and number share the number constraint group
        let bucket = match schema_type {
            SchemaType::Integer => SchemaType::Number,
            other => *other,
        };
        if seen.contains(&bucket) {
            continue;
        }
        seen.push(bucket);
        members.push(match bucket {
            SchemaType::Null => SchemaNode::Null,
            SchemaType::Boolean => SchemaNode::Boolean,
            SchemaType::String => SchemaNode::String(string.take().unwrap_or_default()),
            SchemaType::Number => SchemaNode::Number(number.take().unwrap_or_default()),
            SchemaType::Array => SchemaNode::Array(Box::new(array.take().unwrap_or_default())),
            SchemaType::Object => SchemaNode::Object(Box::new(object.take().unwrap_or_default())),
            SchemaType::Integer => unreachable!("folded into number above"),
        });
    }
    if members.len() == 1 {
        members.remove(0)
    } else {
        SchemaNode::Union(members)
    }
}

fn has_any(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| obj.contains_key(*key))
}

fn malformed(reason: impl Into<String>) -> SchemaError {
    SchemaError::MalformedSchema {
        reason: reason.into(),
    }
}

fn take_string(obj: &Map<String, Value>, key: &str) -> SchemaResult<Option<String>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(other) => Err(malformed(format!(
            "`{}` must be a string, got {}",
            key,
            resolve_kind(other)
        ))),
    }
}

fn take_bool(obj: &Map<String, Value>, key: &str) -> SchemaResult<Option<bool>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Bool(v)) => Ok(Some(*v)),
        Some(other) => Err(malformed(format!(
            "`{}` must be a boolean, got {}",
            key,
            resolve_kind(other)
        ))),
    }
}

fn take_u64(obj: &Map<String, Value>, key: &str) -> SchemaResult<Option<u64>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Number(v)) => match v.as_u64() {
            Some(v) => Ok(Some(v)),
            None => Err(malformed(format!(
                "`{}` must be a non-negative integer",
                key
            ))),
        },
        Some(other) => Err(malformed(format!(
            "`{}` must be a non-negative integer, got {}",
            key,
            resolve_kind(other)
        ))),
    }
}

fn take_f64(obj: &Map<String, Value>, key: &str) -> SchemaResult<Option<f64>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Number(v)) => match v.as_f64() {
            Some(v) => Ok(Some(v)),
            None => Err(malformed(format!("`{}` must be a number", key))),
        },
        Some(other) => Err(malformed(format!(
            "`{}` must be a number, got {}",
            key,
            resolve_kind(other)
        ))),
    }
}

fn take_values(obj: &Map<String, Value>, key: &str) -> SchemaResult<Option<Vec<Value>>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        Some(other) => Err(malformed(format!(
            "`{}` must be an array, got {}",
            key,
            resolve_kind(other)
        ))),
    }
}

fn take_string_list(obj: &Map<String, Value>, key: &str) -> SchemaResult<Option<Vec<String>>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(string_list(items, key)?)),
        Some(other) => Err(malformed(format!(
            "`{}` must be an array of strings, got {}",
            key,
            resolve_kind(other)
        ))),
    }
}

fn string_list(items: &[Value], key: &str) -> SchemaResult<Vec<String>> {
    items
        .iter()
        .map(|v| match v {
            Value::String(v) => Ok(v.clone()),
            other => Err(malformed(format!(
                "`{}` entries must be strings, got {}",
                key,
                resolve_kind(other)
            ))),
        })
        .collect()
}
