use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime kind of a JSON value. A whole-valued float is still [`Number`];
/// only values carried as integers resolve to [`Integer`].
///
/// [`Number`]: ValueKind::Number
/// [`Integer`]: ValueKind::Integer
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

pub fn resolve_kind(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Boolean,
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                ValueKind::Integer
            } else {
                ValueKind::Number
            }
        }
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_str = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(kind_str)
    }
}
