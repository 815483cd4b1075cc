use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error as ThisError;

use crate::validates::{Error, ErrorKind};

/// Per-locale mapping from error kind to a `{param}` template. Catalogs are
/// supplied by the embedding application; [`catalogs::EN`] is the built-in
/// default.
pub type Catalog = IndexMap<String, String>;

#[derive(Clone, Debug, ThisError)]
pub enum TranslateError {
    #[error("unknown locale key `{kind}`")]
    UnknownLocaleKey { kind: String },
}

/// Render `error` through the catalog template for its kind. Nested error
/// maps and sequences are translated first, then interpolated into the
/// parent template. The error tree is never mutated.
pub fn translate(error: &Error, catalog: &Catalog) -> Result<String, TranslateError> {
    let name = error.kind.name();
    let template = catalog
        .get(name)
        .ok_or_else(|| TranslateError::UnknownLocaleKey {
            kind: name.to_string(),
        })?;
    let mut message = template.clone();
    for (param, rendered) in params(error, catalog)? {
        message = message.replace(&format!("{{{}}}", param), &rendered);
    }
    Ok(message)
}

fn params(
    error: &Error,
    catalog: &Catalog,
) -> Result<Vec<(&'static str, String)>, TranslateError> {
    let mut params = vec![("value", error.value.to_string())];
    match &error.kind {
        ErrorKind::MultipleOf {
            multiple_of,
            actual,
        } => {
            params.push(("multipleOf", multiple_of.to_string()));
            params.push(("actualReminder", actual.to_string()));
        }
        ErrorKind::Maximum { maximum } => params.push(("maximum", maximum.to_string())),
        ErrorKind::ExclusiveMaximum { exclusive_maximum } => {
            params.push(("exclusiveMaximum", exclusive_maximum.to_string()))
        }
        ErrorKind::Minimum { minimum } => params.push(("minimum", minimum.to_string())),
        ErrorKind::ExclusiveMinimum { exclusive_minimum } => {
            params.push(("exclusiveMinimum", exclusive_minimum.to_string()))
        }
        ErrorKind::MaxLength {
            max_length,
            actual_length,
        } => {
            params.push(("maxLength", max_length.to_string()));
            params.push(("actualLength", actual_length.to_string()));
        }
        ErrorKind::MinLength {
            min_length,
            actual_length,
        } => {
            params.push(("minLength", min_length.to_string()));
            params.push(("actualLength", actual_length.to_string()));
        }
        ErrorKind::Pattern { pattern } => params.push(("pattern", pattern.clone())),
        ErrorKind::Items { errors } => {
            // flattened: every nested message in index order
            let nested = translate_all(errors.values().flatten(), catalog)?;
            params.push(("errors", nested.join(", ")));
        }
        ErrorKind::MaxItems {
            max_items,
            actual_items,
        } => {
            params.push(("maxItems", max_items.to_string()));
            params.push(("actualItems", actual_items.to_string()));
        }
        ErrorKind::MinItems {
            min_items,
            actual_items,
        } => {
            params.push(("minItems", min_items.to_string()));
            params.push(("actualItems", actual_items.to_string()));
        }
        ErrorKind::UniqueItems { dups, dup_indices } => {
            params.push(("dups", join_values(dups)));
            params.push((
                "dupIndices",
                dup_indices
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", "),
            ));
        }
        ErrorKind::Contains => {}
        ErrorKind::MaxProperties {
            max_properties,
            actual_properties,
        } => {
            params.push(("maxProperties", max_properties.to_string()));
            params.push(("actualProperties", actual_properties.to_string()));
        }
        ErrorKind::MinProperties {
            min_properties,
            actual_properties,
        } => {
            params.push(("minProperties", min_properties.to_string()));
            params.push(("actualProperties", actual_properties.to_string()));
        }
        ErrorKind::Required {
            required,
            missing_properties,
            actual_properties,
        } => {
            params.push(("required", required.join(", ")));
            params.push(("missingProperties", missing_properties.join(", ")));
            params.push(("actualProperties", actual_properties.join(", ")));
        }
        ErrorKind::Properties { errors }
        | ErrorKind::PatternProperties { errors }
        | ErrorKind::AdditionalProperties { errors }
        | ErrorKind::Dependencies { errors } => {
            params.push(("errors", translate_keyed(errors, catalog)?));
        }
        ErrorKind::PropertyNames {
            property_names,
            mismatch_properties,
            actual_properties,
        } => {
            params.push(("propertyNames", property_names.clone()));
            params.push(("mismatchProperties", mismatch_properties.join(", ")));
            params.push(("actualProperties", actual_properties.join(", ")));
        }
        ErrorKind::Enum { allowed } => params.push(("enum", join_values(allowed))),
        ErrorKind::Const { expected } => params.push(("const", expected.to_string())),
        ErrorKind::Type {
            expected_types,
            actual_type,
        } => {
            params.push((
                "expectedTypes",
                expected_types
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", "),
            ));
            params.push(("actualType", actual_type.to_string()));
        }
        ErrorKind::AllOf { errors } | ErrorKind::AnyOf { errors } => {
            let nested = translate_all(errors.iter(), catalog)?;
            params.push(("errors", nested.join(", ")));
        }
        ErrorKind::OneOf { matched } => {
            params.push((
                "matched",
                matched
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", "),
            ));
        }
        ErrorKind::Not => {}
    }
    Ok(params)
}

fn translate_all<'a>(
    errors: impl Iterator<Item = &'a Error>,
    catalog: &Catalog,
) -> Result<Vec<String>, TranslateError> {
    errors.map(|error| translate(error, catalog)).collect()
}

fn translate_keyed(
    map: &IndexMap<String, Vec<Error>>,
    catalog: &Catalog,
) -> Result<String, TranslateError> {
    let mut parts = Vec::with_capacity(map.len());
    for (key, errors) in map.iter() {
        if errors.is_empty() {
            // a key that is itself the violation carries no nested detail
            parts.push(format!("({})", key));
        } else {
            let nested = translate_all(errors.iter(), catalog)?;
            parts.push(format!("({}: {})", key, nested.join("; ")));
        }
    }
    Ok(parts.join(", "))
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

pub mod catalogs {
    use once_cell::sync::Lazy;

    use super::Catalog;

    /// Built-in English catalog.
    pub static EN: Lazy<Catalog> = Lazy::new(|| {
        [
            (
                "multipleOf",
                "{value} is not a multiple of {multipleOf} (remainder {actualReminder})",
            ),
            ("maximum", "{value} is greater than maximum {maximum}"),
            (
                "exclusiveMaximum",
                "{value} is not less than exclusive maximum {exclusiveMaximum}",
            ),
            ("minimum", "{value} is less than minimum {minimum}"),
            (
                "exclusiveMinimum",
                "{value} is not greater than exclusive minimum {exclusiveMinimum}",
            ),
            (
                "maxLength",
                "length {actualLength} exceeds maxLength {maxLength}",
            ),
            (
                "minLength",
                "length {actualLength} is below minLength {minLength}",
            ),
            ("pattern", "{value} does not match pattern {pattern}"),
            ("items", "invalid items: {errors}"),
            ("maxItems", "{actualItems} items exceed maxItems {maxItems}"),
            ("minItems", "{actualItems} items are below minItems {minItems}"),
            (
                "uniqueItems",
                "duplicate items {dups} at indices {dupIndices}",
            ),
            ("contains", "no item of {value} matches the contains schema"),
            (
                "maxProperties",
                "{actualProperties} properties exceed maxProperties {maxProperties}",
            ),
            (
                "minProperties",
                "{actualProperties} properties are below minProperties {minProperties}",
            ),
            ("required", "missing required properties {missingProperties}"),
            ("properties", "invalid properties: {errors}"),
            ("patternProperties", "invalid pattern properties: {errors}"),
            (
                "additionalProperties",
                "additional properties not allowed or invalid: {errors}",
            ),
            ("dependencies", "unsatisfied dependencies: {errors}"),
            (
                "propertyNames",
                "property names {mismatchProperties} do not match {propertyNames}",
            ),
            ("enum", "{value} is not one of {enum}"),
            ("const", "{value} is not the constant {const}"),
            ("type", "expected {expectedTypes}, got {actualType}"),
            ("allOf", "allOf conditions are not met: {errors}"),
            ("anyOf", "anyOf conditions are not met: {errors}"),
            (
                "oneOf",
                "oneOf condition is not met, matched subschemas [{matched}]",
            ),
            ("not", "{value} must not match the not schema"),
        ]
        .into_iter()
        .map(|(key, template)| (key.to_string(), template.to_string()))
        .collect()
    });
}
