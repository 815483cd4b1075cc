use std::fmt::{Display, Formatter};
use std::ops::Index;

use either::Either;
use indexmap::IndexMap;
use jsonv_schema::{
    resolve_kind, ArraySchema, NumberSchema, ObjectSchema, Schema, SchemaNode, SchemaType,
    StringSchema, ValueKind,
};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// Injected deep-equality capability used by `enum`, `const` and
/// `uniqueItems`; [`deep_equal`] is the default.
pub type EqualsFn = fn(&Value, &Value) -> bool;

static CONTROL_GROUPS_RE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"\\c[A-Za-z]").unwrap());

pub(crate) fn validate(schema: &Schema, value: &Value, equals: EqualsFn) -> Vec<Error> {
    let mut errors = vec![];
    validate_impl(&mut errors, schema, value, equals);
    errors
}

fn validate_impl(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    let kind = resolve_kind(value);
    let mut expected: Vec<SchemaType> = vec![];
    validate_node(errors, &schema.node, value, &mut expected, equals);
    validate_enum(errors, schema, value, equals);
    validate_const(errors, schema, value, equals);
    validate_type(errors, schema, kind, value, &expected);
    validate_allof(errors, schema, value, equals);
    validate_anyof(errors, schema, value, equals);
    validate_oneof(errors, schema, value, equals);
    validate_not(errors, schema, value, equals);
}

fn validate_node(
    errors: &mut Vec<Error>,
    node: &SchemaNode,
    value: &Value,
    expected: &mut Vec<SchemaType>,
    equals: EqualsFn,
) {
    match node {
        SchemaNode::String(string) => match value {
            Value::String(s) => validate_string(errors, string, s, value),
            _ => push_expected(expected, &[SchemaType::String]),
        },
        SchemaNode::Number(number) => match value {
            Value::Number(_) => validate_number(errors, number, value),
            _ => push_expected(expected, &[SchemaType::Number, SchemaType::Integer]),
        },
        SchemaNode::Array(array) => match value {
            Value::Array(items) => validate_array(errors, array, items, value, equals),
            _ => push_expected(expected, &[SchemaType::Array]),
        },
        SchemaNode::Object(object) => match value {
            Value::Object(map) => validate_object(errors, object, map, value, equals),
            _ => push_expected(expected, &[SchemaType::Object]),
        },
        SchemaNode::Union(members) => {
            for member in members {
                validate_node(errors, member, value, expected, equals);
            }
        }
        // Ref is rejected before validation starts; the rest carry no
        // type-specific constraints
        SchemaNode::Ref(_) | SchemaNode::Any | SchemaNode::Null | SchemaNode::Boolean => {}
    }
}

fn validate_number(errors: &mut Vec<Error>, number: &NumberSchema, value: &Value) {
    let n = match value.as_f64() {
        Some(v) => v,
        None => return,
    };
    if let Some(multiple_of) = number.multiple_of {
        let remainder = n % multiple_of;
        if remainder != 0.0 {
            errors.push(Error::new(
                ErrorKind::MultipleOf {
                    multiple_of,
                    actual: remainder,
                },
                value,
            ));
        }
    }
    if let Some(maximum) = number.maximum {
        if n > maximum {
            errors.push(Error::new(ErrorKind::Maximum { maximum }, value));
        }
    }
    if let Some(exclusive_maximum) = number.exclusive_maximum {
        if n >= exclusive_maximum {
            errors.push(Error::new(
                ErrorKind::ExclusiveMaximum { exclusive_maximum },
                value,
            ));
        }
    }
    if let Some(minimum) = number.minimum {
        if n < minimum {
            errors.push(Error::new(ErrorKind::Minimum { minimum }, value));
        }
    }
    if let Some(exclusive_minimum) = number.exclusive_minimum {
        if n <= exclusive_minimum {
            errors.push(Error::new(
                ErrorKind::ExclusiveMinimum { exclusive_minimum },
                value,
            ));
        }
    }
}

fn validate_string(errors: &mut Vec<Error>, string: &StringSchema, s: &str, value: &Value) {
    // length in Unicode scalar values, not bytes
    let length = bytecount::num_chars(s.as_bytes()) as u64;
    if let Some(max_length) = string.max_length {
        if length > max_length {
            errors.push(Error::new(
                ErrorKind::MaxLength {
                    max_length,
                    actual_length: length,
                },
                value,
            ));
        }
    }
    if let Some(min_length) = string.min_length {
        if length < min_length {
            errors.push(Error::new(
                ErrorKind::MinLength {
                    min_length,
                    actual_length: length,
                },
                value,
            ));
        }
    }
    if let Some(pattern) = string.pattern.as_ref() {
        if let Ok(re) = convert_regex(pattern) {
            if !matches!(re.is_match(s), Ok(true)) {
                errors.push(Error::new(
                    ErrorKind::Pattern {
                        pattern: pattern.clone(),
                    },
                    value,
                ));
            }
        }
    }
}

fn validate_array(
    errors: &mut Vec<Error>,
    array: &ArraySchema,
    items: &[Value],
    value: &Value,
    equals: EqualsFn,
) {
    if let Some(item_schemas) = array.items.as_ref() {
        let mut errs: IndexMap<usize, Vec<Error>> = IndexMap::new();
        match item_schemas.value.as_ref() {
            Either::Left(schema) => {
                for (idx, element) in items.iter().enumerate() {
                    let element_errors = validate(schema, element, equals);
                    if !element_errors.is_empty() {
                        errs.insert(idx, element_errors);
                    }
                }
            }
            Either::Right(schemas) => {
                for (idx, element) in items.iter().enumerate() {
                    if let Some(schema) = schemas.get(idx) {
                        let element_errors = validate(schema, element, equals);
                        if !element_errors.is_empty() {
                            errs.insert(idx, element_errors);
                        }
                        continue;
                    }
                    match array.additional_items.as_ref().map(|v| v.value.as_ref()) {
                        Some(Either::Right(schema)) => {
                            let element_errors = validate(schema, element, equals);
                            if !element_errors.is_empty() {
                                errs.insert(idx, element_errors);
                            }
                        }
                        Some(Either::Left(&true)) => {}
                        // absent or `false`: overflow past the tuple is a
                        // bounded maxItems violation
                        Some(Either::Left(&false)) | None => {
                            errs.insert(
                                idx,
                                vec![Error::new(
                                    ErrorKind::MaxItems {
                                        max_items: schemas.len() as u64,
                                        actual_items: items.len() as u64,
                                    },
                                    element,
                                )],
                            );
                        }
                    }
                }
            }
        }
        if !errs.is_empty() {
            errors.push(Error::new(ErrorKind::Items { errors: errs }, value));
        }
    }

    if let Some(max_items) = array.max_items {
        if items.len() as u64 > max_items {
            errors.push(Error::new(
                ErrorKind::MaxItems {
                    max_items,
                    actual_items: items.len() as u64,
                },
                value,
            ));
        }
    }
    if let Some(min_items) = array.min_items {
        if (items.len() as u64) < min_items {
            errors.push(Error::new(
                ErrorKind::MinItems {
                    min_items,
                    actual_items: items.len() as u64,
                },
                value,
            ));
        }
    }

    if array.unique_items {
        let mut dups: Vec<Value> = vec![];
        let mut dup_indices: Vec<usize> = vec![];
        for (idx, element) in items.iter().enumerate() {
            let count = items.iter().filter(|other| equals(element, other)).count();
            if count > 1 {
                dup_indices.push(idx);
                if !dups.iter().any(|seen| equals(seen, element)) {
                    dups.push(element.clone());
                }
            }
        }
        if !dups.is_empty() {
            errors.push(Error::new(ErrorKind::UniqueItems { dups, dup_indices }, value));
        }
    }

    if let Some(schema) = array.contains.as_ref() {
        let any_matched = items
            .iter()
            .any(|element| validate(schema, element, equals).is_empty());
        if !any_matched {
            errors.push(Error::new(ErrorKind::Contains, value));
        }
    }
}

fn validate_object(
    errors: &mut Vec<Error>,
    object: &ObjectSchema,
    map: &Map<String, Value>,
    value: &Value,
    equals: EqualsFn,
) {
    if let Some(max_properties) = object.max_properties {
        if map.len() as u64 > max_properties {
            errors.push(Error::new(
                ErrorKind::MaxProperties {
                    max_properties,
                    actual_properties: map.len() as u64,
                },
                value,
            ));
        }
    }
    if let Some(min_properties) = object.min_properties {
        if (map.len() as u64) < min_properties {
            errors.push(Error::new(
                ErrorKind::MinProperties {
                    min_properties,
                    actual_properties: map.len() as u64,
                },
                value,
            ));
        }
    }

    if let Some(required) = object.required.as_ref() {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !map.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            errors.push(Error::new(
                ErrorKind::Required {
                    required: required.clone(),
                    missing_properties: missing,
                    actual_properties: map.keys().cloned().collect(),
                },
                value,
            ));
        }
    }

    if let Some(properties) = object.properties.as_ref() {
        let mut errs: IndexMap<String, Vec<Error>> = IndexMap::new();
        for (name, schema) in properties.iter() {
            // absent declared properties are not validated
            if let Some(v) = map.get(name) {
                let property_errors = validate(schema, v, equals);
                if !property_errors.is_empty() {
                    errs.insert(name.clone(), property_errors);
                }
            }
        }
        if !errs.is_empty() {
            errors.push(Error::new(ErrorKind::Properties { errors: errs }, value));
        }
    }

    if let Some(patterns) = object.pattern_properties.as_ref() {
        let mut errs: IndexMap<String, Vec<Error>> = IndexMap::new();
        for (pattern, schema) in patterns.iter() {
            if let Ok(re) = convert_regex(pattern) {
                for (key, v) in map.iter() {
                    if matches!(re.is_match(key), Ok(true)) {
                        let key_errors = validate(schema, v, equals);
                        if !key_errors.is_empty() {
                            // a key matching several patterns collects from
                            // each of them
                            errs.entry(key.clone()).or_default().extend(key_errors);
                        }
                    }
                }
            }
        }
        if !errs.is_empty() {
            errors.push(Error::new(
                ErrorKind::PatternProperties { errors: errs },
                value,
            ));
        }
    }

    if let Some(additional) = object.additional_properties.as_ref() {
        let pattern_res: Vec<fancy_regex::Regex> = object
            .pattern_properties
            .as_ref()
            .map(|patterns| {
                patterns
                    .keys()
                    .filter_map(|pattern| convert_regex(pattern).ok())
                    .collect()
            })
            .unwrap_or_default();
        let mut errs: IndexMap<String, Vec<Error>> = IndexMap::new();
        for (key, v) in map.iter() {
            let declared = object
                .properties
                .as_ref()
                .map(|properties| properties.contains_key(key))
                .unwrap_or(false);
            let pattern_matched = pattern_res
                .iter()
                .any(|re| matches!(re.is_match(key), Ok(true)));
            if declared || pattern_matched {
                continue;
            }
            match additional.value.as_ref() {
                Either::Left(allowed) => {
                    if !allowed {
                        // the key itself is the violation, no nested detail
                        errs.insert(key.clone(), vec![]);
                    }
                }
                Either::Right(schema) => {
                    let key_errors = validate(schema, v, equals);
                    if !key_errors.is_empty() {
                        errs.insert(key.clone(), key_errors);
                    }
                }
            }
        }
        if !errs.is_empty() {
            errors.push(Error::new(
                ErrorKind::AdditionalProperties { errors: errs },
                value,
            ));
        }
    }

    if let Some(dependencies) = object.dependencies.as_ref() {
        let mut errs: IndexMap<String, Vec<Error>> = IndexMap::new();
        for (name, dependency) in dependencies.iter() {
            if !map.contains_key(name) {
                continue;
            }
            match dependency.value.as_ref() {
                Either::Left(names) => {
                    let missing: Vec<String> = names
                        .iter()
                        .filter(|name| !map.contains_key(*name))
                        .cloned()
                        .collect();
                    if !missing.is_empty() {
                        errs.insert(
                            name.clone(),
                            vec![Error::new(
                                ErrorKind::Required {
                                    required: names.clone(),
                                    missing_properties: missing,
                                    actual_properties: map.keys().cloned().collect(),
                                },
                                value,
                            )],
                        );
                    }
                }
                Either::Right(schema) => {
                    // a schema dependency constrains the whole value
                    let dependency_errors = validate(schema, value, equals);
                    if !dependency_errors.is_empty() {
                        errs.insert(name.clone(), dependency_errors);
                    }
                }
            }
        }
        if !errs.is_empty() {
            errors.push(Error::new(ErrorKind::Dependencies { errors: errs }, value));
        }
    }

    if let Some(pattern) = object.property_names.as_ref() {
        if let Ok(re) = convert_regex(pattern) {
            let mismatch: Vec<String> = map
                .keys()
                .filter(|key| !matches!(re.is_match(key), Ok(true)))
                .cloned()
                .collect();
            if !mismatch.is_empty() {
                errors.push(Error::new(
                    ErrorKind::PropertyNames {
                        property_names: pattern.clone(),
                        mismatch_properties: mismatch,
                        actual_properties: map.keys().cloned().collect(),
                    },
                    value,
                ));
            }
        }
    }
}

fn validate_enum(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    if let Some(allowed) = schema.enum_value.as_ref() {
        if !allowed.iter().any(|candidate| equals(candidate, value)) {
            errors.push(Error::new(
                ErrorKind::Enum {
                    allowed: allowed.clone(),
                },
                value,
            ));
        }
    }
}

fn validate_const(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    if let Some(expected) = schema.const_value.as_ref() {
        if !equals(expected, value) {
            errors.push(Error::new(
                ErrorKind::Const {
                    expected: expected.clone(),
                },
                value,
            ));
        }
    }
}

fn validate_type(
    errors: &mut Vec<Error>,
    schema: &Schema,
    kind: ValueKind,
    value: &Value,
    expected: &[SchemaType],
) {
    if !schema.types.is_empty() {
        if !schema.types.iter().any(|t| t.matches_kind(kind)) {
            errors.push(Error::new(
                ErrorKind::Type {
                    expected_types: schema.types.clone(),
                    actual_type: kind,
                },
                value,
            ));
        }
    } else if !expected.is_empty() {
        // no declared type: report the kinds the present keywords imply
        errors.push(Error::new(
            ErrorKind::Type {
                expected_types: expected.to_vec(),
                actual_type: kind,
            },
            value,
        ));
    }
}

fn validate_allof(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    if let Some(all_of) = schema.all_of.as_ref() {
        let mut collected = vec![];
        for sub in all_of.iter() {
            collected.extend(validate(sub, value, equals));
        }
        if !collected.is_empty() {
            errors.push(Error::new(ErrorKind::AllOf { errors: collected }, value));
        }
    }
}

fn validate_anyof(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    if let Some(any_of) = schema.any_of.as_ref() {
        let mut collected = vec![];
        let mut valid = false;
        for sub in any_of.iter() {
            let sub_errors = validate(sub, value, equals);
            if sub_errors.is_empty() {
                valid = true;
            } else {
                collected.extend(sub_errors);
            }
        }
        if !valid {
            errors.push(Error::new(ErrorKind::AnyOf { errors: collected }, value));
        }
    }
}

fn validate_oneof(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    if let Some(one_of) = schema.one_of.as_ref() {
        let mut matched = vec![];
        for (index, sub) in one_of.iter().enumerate() {
            if validate(sub, value, equals).is_empty() {
                matched.push(index);
            }
        }
        if matched.len() != 1 {
            errors.push(Error::new(ErrorKind::OneOf { matched }, value));
        }
    }
}

fn validate_not(errors: &mut Vec<Error>, schema: &Schema, value: &Value, equals: EqualsFn) {
    if let Some(sub) = schema.not.as_ref() {
        if validate(sub, value, equals).is_empty() {
            errors.push(Error::new(ErrorKind::Not, value));
        }
    }
}

fn push_expected(expected: &mut Vec<SchemaType>, types: &[SchemaType]) {
    for schema_type in types {
        if !expected.contains(schema_type) {
            expected.push(*schema_type);
        }
    }
}

/// A single constraint violation, stamped with the value that was being
/// checked at its nesting level.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub value: Value,
}

impl Error {
    pub fn new(kind: ErrorKind, value: &Value) -> Self {
        Self {
            kind,
            value: value.clone(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    MultipleOf { multiple_of: f64, actual: f64 },
    Maximum { maximum: f64 },
    ExclusiveMaximum { exclusive_maximum: f64 },
    Minimum { minimum: f64 },
    ExclusiveMinimum { exclusive_minimum: f64 },
    MaxLength { max_length: u64, actual_length: u64 },
    MinLength { min_length: u64, actual_length: u64 },
    Pattern { pattern: String },
    Items { errors: IndexMap<usize, Vec<Error>> },
    MaxItems { max_items: u64, actual_items: u64 },
    MinItems { min_items: u64, actual_items: u64 },
    UniqueItems { dups: Vec<Value>, dup_indices: Vec<usize> },
    Contains,
    MaxProperties { max_properties: u64, actual_properties: u64 },
    MinProperties { min_properties: u64, actual_properties: u64 },
    Required {
        required: Vec<String>,
        missing_properties: Vec<String>,
        actual_properties: Vec<String>,
    },
    Properties { errors: IndexMap<String, Vec<Error>> },
    PatternProperties { errors: IndexMap<String, Vec<Error>> },
    AdditionalProperties { errors: IndexMap<String, Vec<Error>> },
    Dependencies { errors: IndexMap<String, Vec<Error>> },
    PropertyNames {
        property_names: String,
        mismatch_properties: Vec<String>,
        actual_properties: Vec<String>,
    },
    Enum { allowed: Vec<Value> },
    Const { expected: Value },
    Type {
        expected_types: Vec<SchemaType>,
        actual_type: ValueKind,
    },
    AllOf { errors: Vec<Error> },
    AnyOf { errors: Vec<Error> },
    OneOf { matched: Vec<usize> },
    Not,
}

impl ErrorKind {
    /// Locale catalog key for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::MultipleOf { .. } => "multipleOf",
            ErrorKind::Maximum { .. } => "maximum",
            ErrorKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ErrorKind::Minimum { .. } => "minimum",
            ErrorKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ErrorKind::MaxLength { .. } => "maxLength",
            ErrorKind::MinLength { .. } => "minLength",
            ErrorKind::Pattern { .. } => "pattern",
            ErrorKind::Items { .. } => "items",
            ErrorKind::MaxItems { .. } => "maxItems",
            ErrorKind::MinItems { .. } => "minItems",
            ErrorKind::UniqueItems { .. } => "uniqueItems",
            ErrorKind::Contains => "contains",
            ErrorKind::MaxProperties { .. } => "maxProperties",
            ErrorKind::MinProperties { .. } => "minProperties",
            ErrorKind::Required { .. } => "required",
            ErrorKind::Properties { .. } => "properties",
            ErrorKind::PatternProperties { .. } => "patternProperties",
            ErrorKind::AdditionalProperties { .. } => "additionalProperties",
            ErrorKind::Dependencies { .. } => "dependencies",
            ErrorKind::PropertyNames { .. } => "propertyNames",
            ErrorKind::Enum { .. } => "enum",
            ErrorKind::Const { .. } => "const",
            ErrorKind::Type { .. } => "type",
            ErrorKind::AllOf { .. } => "allOf",
            ErrorKind::AnyOf { .. } => "anyOf",
            ErrorKind::OneOf { .. } => "oneOf",
            ErrorKind::Not => "not",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Type {
                expected_types,
                actual_type,
            } => write!(
                f,
                "expected {}, got {}",
                expected_types
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(","),
                actual_type
            ),
            ErrorKind::OneOf { matched } => {
                write!(f, "oneOf matched {} subschemas", matched.len())
            }
            other => write!(f, "{} condition is not met", other.name()),
        }
    }
}

/// Structural deep equality over JSON values; numbers compare by `f64`
/// value so `1` and `1.0` are equal.
pub fn deep_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(a, b)| deep_equal(a, b))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, a)| right.get(key).map_or(false, |b| deep_equal(a, b)))
        }
        (_, _) => false,
    }
}

// Schema patterns use ECMA 262 semantics; rewrite the character classes
// and control escapes that differ before handing the pattern to
// fancy-regex.
fn convert_regex(pattern: &str) -> Result<fancy_regex::Regex, fancy_regex::Error> {
    let new_pattern = CONTROL_GROUPS_RE.replace_all(pattern, replace_control_group);
    let mut out = String::with_capacity(new_pattern.len());
    let mut chars = new_pattern.chars();
    while let Some(current) = chars.next() {
        if current != '\\' {
            out.push(current);
            continue;
        }
        match chars.next() {
            Some('d') => out.push_str("[0-9]"),
            Some('D') => out.push_str("[^0-9]"),
            Some('w') => out.push_str("[A-Za-z0-9_]"),
            Some('W') => out.push_str("[^A-Za-z0-9_]"),
            Some('s') => {
                out.push_str("[ \t\n\r\u{000b}\u{000c}\u{2003}\u{feff}\u{2029}\u{00a0}]")
            }
            Some('S') => {
                out.push_str("[^ \t\n\r\u{000b}\u{000c}\u{2003}\u{feff}\u{2029}\u{00a0}]")
            }
            Some(next) => {
                out.push(current);
                out.push(next)
            }
            // trailing backslash: an incomplete escape, rejected below
            None => out.push(current),
        }
    }
    fancy_regex::Regex::new(&out)
}

fn replace_control_group(captures: &regex::Captures) -> String {
    // minimum value is 65 (char 'A'), so the subtraction cannot underflow
    ((captures
        .index(0)
        .trim_start_matches(r"\c")
        .chars()
        .next()
        .expect("the pattern guarantees [A-Za-z] after \\c")
        .to_ascii_uppercase() as u8
        - 64) as char)
        .to_string()
}
