//! Validation engine for compiled, resolved JSON Schema trees.
//!
//! Violations are data, not failures: [`JsonSchemaValidator::validate`]
//! returns a sequence of [`Error`] values and an empty sequence means the
//! value is valid. The only fatal condition is constructing a validator
//! over a tree that still contains `$ref` nodes.

mod translate;
mod validates;

use serde_json::Value;
use thiserror::Error as ThisError;

pub use jsonv_schema::Schema;
pub use translate::{catalogs, translate, Catalog, TranslateError};
pub use validates::{deep_equal, EqualsFn, Error, ErrorKind};

/// The schema still contains unresolved `$ref` nodes; resolve it first.
#[derive(Clone, Copy, Debug, ThisError)]
#[error("schema contains unresolved $ref nodes")]
pub struct NotResolvedError;

/// Compile-once, validate-many wrapper around a resolved schema tree. The
/// tree is immutable, so one validator may check unboundedly many values.
#[derive(Debug)]
pub struct JsonSchemaValidator {
    schema: Schema,
    equals: EqualsFn,
}

impl JsonSchemaValidator {
    pub fn new(schema: Schema) -> Result<Self, NotResolvedError> {
        Self::with_equals(schema, deep_equal)
    }

    /// Use a caller-supplied deep-equality for `enum`, `const` and
    /// `uniqueItems` comparisons.
    pub fn with_equals(schema: Schema, equals: EqualsFn) -> Result<Self, NotResolvedError> {
        if !schema.is_resolved() {
            return Err(NotResolvedError);
        }
        Ok(Self { schema, equals })
    }

    pub fn validate(&self, value: &Value) -> Vec<Error> {
        validates::validate(&self.schema, value, self.equals)
    }

    pub fn validate_translate(
        &self,
        value: &Value,
        catalog: &Catalog,
    ) -> Result<Vec<String>, TranslateError> {
        self.validate(value)
            .iter()
            .map(|error| translate(error, catalog))
            .collect()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// One-shot validation of a resolved schema.
pub fn validate(schema: &Schema, value: &Value) -> Result<Vec<Error>, NotResolvedError> {
    if !schema.is_resolved() {
        return Err(NotResolvedError);
    }
    Ok(validates::validate(schema, value, deep_equal))
}
