use jsonv_schema::{compile, SchemaType, ValueKind};
use jsonv_schema_validator::{Error, ErrorKind, JsonSchemaValidator};
use serde_json::{json, Value};

fn validator(schema: Value) -> JsonSchemaValidator {
    JsonSchemaValidator::new(compile(&schema).unwrap()).unwrap()
}

fn check(schema: Value, value: Value) -> Vec<Error> {
    validator(schema).validate(&value)
}

#[test]
fn test_unresolved_schema_is_rejected() {
    let schema = compile(&json!({"properties": {"a": {"$ref": "#/definitions/a"}}})).unwrap();
    assert!(JsonSchemaValidator::new(schema).is_err());
}

#[test]
fn test_multiple_of_scenario() {
    let errors = check(json!({"multipleOf": 7}), json!(1));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::MultipleOf {
            multiple_of,
            actual,
        } => {
            assert_eq!(*multiple_of, 7.0);
            assert_eq!(*actual, 1.0);
        }
        other => panic!("expected multipleOf error, got {:?}", other),
    }
    assert_eq!(errors[0].value, json!(1));

    assert!(check(json!({"multipleOf": 7}), json!(7)).is_empty());

    // wrong kind: the keyword implies the expected types
    let errors = check(json!({"multipleOf": 7}), json!("lol"));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::Type {
            expected_types,
            actual_type,
        } => {
            assert_eq!(
                expected_types,
                &[SchemaType::Number, SchemaType::Integer]
            );
            assert_eq!(*actual_type, ValueKind::String);
        }
        other => panic!("expected type error, got {:?}", other),
    }
}

#[test]
fn test_number_bounds() {
    assert!(check(json!({"minimum": 2, "maximum": 4}), json!(3)).is_empty());
    assert!(check(json!({"minimum": 2}), json!(2)).is_empty());
    assert!(matches!(
        check(json!({"minimum": 2}), json!(1))[0].kind,
        ErrorKind::Minimum { .. }
    ));
    assert!(matches!(
        check(json!({"maximum": 2}), json!(3))[0].kind,
        ErrorKind::Maximum { .. }
    ));
    // exclusive bounds reject equality
    assert!(matches!(
        check(json!({"exclusiveMinimum": 2}), json!(2))[0].kind,
        ErrorKind::ExclusiveMinimum { .. }
    ));
    assert!(matches!(
        check(json!({"exclusiveMaximum": 2}), json!(2))[0].kind,
        ErrorKind::ExclusiveMaximum { .. }
    ));
    assert!(check(json!({"exclusiveMinimum": 2}), json!(2.5)).is_empty());
}

#[test]
fn test_string_errors_accumulate() {
    let errors = check(json!({"minLength": 5, "pattern": "^a"}), json!("bcd"));
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0].kind, ErrorKind::MinLength { .. }));
    assert!(matches!(errors[1].kind, ErrorKind::Pattern { .. }));
}

#[test]
fn test_string_length_counts_scalar_values() {
    // 3 scalar values, 9 bytes
    let errors = check(json!({"maxLength": 2}), json!("日本語"));
    match &errors[0].kind {
        ErrorKind::MaxLength {
            max_length,
            actual_length,
        } => {
            assert_eq!(*max_length, 2);
            assert_eq!(*actual_length, 3);
        }
        other => panic!("expected maxLength error, got {:?}", other),
    }
    assert!(check(json!({"maxLength": 3}), json!("日本語")).is_empty());
}

#[test]
fn test_pattern_is_unanchored() {
    assert!(check(json!({"pattern": "b"}), json!("abc")).is_empty());
    assert!(!check(json!({"pattern": "^b"}), json!("abc")).is_empty());
}

#[test]
fn test_type_integer_number_rule() {
    assert!(check(json!({"type": "number"}), json!(5)).is_empty());
    assert!(check(json!({"type": "number"}), json!(5.5)).is_empty());
    assert!(check(json!({"type": "integer"}), json!(5)).is_empty());
    let errors = check(json!({"type": "integer"}), json!(5.5));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::Type {
            expected_types,
            actual_type,
        } => {
            assert_eq!(expected_types, &[SchemaType::Integer]);
            assert_eq!(*actual_type, ValueKind::Number);
        }
        other => panic!("expected type error, got {:?}", other),
    }
    // a whole-valued float is still a number, not an integer
    assert!(!check(json!({"type": "integer"}), json!(5.0)).is_empty());
}

#[test]
fn test_type_list() {
    let schema = json!({"type": ["string", "null"]});
    assert!(check(schema.clone(), json!(null)).is_empty());
    assert!(check(schema.clone(), json!("x")).is_empty());
    assert_eq!(check(schema, json!(5)).len(), 1);
}

#[test]
fn test_items_list_mode_collects_per_index() {
    let errors = check(
        json!({"items": {"type": "integer"}}),
        json!([1, "x", 3, "y"]),
    );
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::Items { errors } => {
            assert_eq!(errors.keys().copied().collect::<Vec<usize>>(), vec![1, 3]);
        }
        other => panic!("expected items error, got {:?}", other),
    }
}

#[test]
fn test_items_tuple_mode() {
    let schema = json!({"items": [{"type": "integer"}, {"type": "string"}]});
    assert!(check(schema.clone(), json!([1, "a"])).is_empty());

    // overflow without additionalItems is a bounded maxItems violation
    let errors = check(schema, json!([1, "a", true]));
    match &errors[0].kind {
        ErrorKind::Items { errors } => {
            let overflow = &errors[&2];
            match &overflow[0].kind {
                ErrorKind::MaxItems {
                    max_items,
                    actual_items,
                } => {
                    assert_eq!(*max_items, 2);
                    assert_eq!(*actual_items, 3);
                }
                other => panic!("expected maxItems error, got {:?}", other),
            }
        }
        other => panic!("expected items error, got {:?}", other),
    }
}

#[test]
fn test_items_tuple_mode_with_additional_items() {
    let schema = json!({
        "items": [{"type": "integer"}],
        "additionalItems": {"type": "string"}
    });
    assert!(check(schema.clone(), json!([1, "a", "b"])).is_empty());
    let errors = check(schema, json!([1, 2]));
    match &errors[0].kind {
        ErrorKind::Items { errors } => {
            assert!(matches!(errors[&1][0].kind, ErrorKind::Type { .. }));
        }
        other => panic!("expected items error, got {:?}", other),
    }
}

#[test]
fn test_min_max_items() {
    assert!(matches!(
        check(json!({"maxItems": 1}), json!([1, 2]))[0].kind,
        ErrorKind::MaxItems { .. }
    ));
    assert!(matches!(
        check(json!({"minItems": 3}), json!([1, 2]))[0].kind,
        ErrorKind::MinItems { .. }
    ));
    assert!(check(json!({"minItems": 2, "maxItems": 2}), json!([1, 2])).is_empty());
}

#[test]
fn test_unique_items_scenario() {
    let errors = check(json!({"uniqueItems": true}), json!([1, 2, 1]));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::UniqueItems { dups, dup_indices } => {
            assert_eq!(dups, &[json!(1)]);
            assert_eq!(dup_indices, &[0, 2]);
        }
        other => panic!("expected uniqueItems error, got {:?}", other),
    }
    assert!(check(json!({"uniqueItems": true}), json!([1, 2, 3])).is_empty());
    // deep equality groups structurally equal values
    let errors = check(
        json!({"uniqueItems": true}),
        json!([{"a": 1}, {"a": 1}, {"a": 2}]),
    );
    match &errors[0].kind {
        ErrorKind::UniqueItems { dups, dup_indices } => {
            assert_eq!(dups, &[json!({"a": 1})]);
            assert_eq!(dup_indices, &[0, 1]);
        }
        other => panic!("expected uniqueItems error, got {:?}", other),
    }
}

#[test]
fn test_contains_is_aggregate_only() {
    assert!(check(json!({"contains": {"type": "integer"}}), json!(["a", 1])).is_empty());
    let errors = check(json!({"contains": {"type": "integer"}}), json!(["a", "b"]));
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, ErrorKind::Contains));
}

#[test]
fn test_min_max_properties() {
    assert!(matches!(
        check(json!({"maxProperties": 1}), json!({"a": 1, "b": 2}))[0].kind,
        ErrorKind::MaxProperties { .. }
    ));
    assert!(matches!(
        check(json!({"minProperties": 2}), json!({"a": 1}))[0].kind,
        ErrorKind::MinProperties { .. }
    ));
}

#[test]
fn test_required_lists_all_missing_names_together() {
    let errors = check(json!({"required": ["a", "b", "c"]}), json!({"a": 1}));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::Required {
            missing_properties, ..
        } => assert_eq!(missing_properties, &["b", "c"]),
        other => panic!("expected required error, got {:?}", other),
    }
}

#[test]
fn test_properties_absent_names_are_not_validated() {
    let schema = json!({"properties": {"a": {"type": "string"}, "b": {"type": "integer"}}});
    assert!(check(schema.clone(), json!({})).is_empty());
    let errors = check(schema, json!({"a": 1}));
    match &errors[0].kind {
        ErrorKind::Properties { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains_key("a"));
        }
        other => panic!("expected properties error, got {:?}", other),
    }
}

#[test]
fn test_pattern_properties_each_match_contributes() {
    let errors = check(
        json!({"patternProperties": {
            "^a": {"minimum": 5},
            "a$": {"maximum": 0}
        }}),
        json!({"a": 3}),
    );
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::PatternProperties { errors } => {
            // both patterns matched the key and each contributed an error
            assert_eq!(errors["a"].len(), 2);
        }
        other => panic!("expected patternProperties error, got {:?}", other),
    }
}

#[test]
fn test_additional_properties_scenario() {
    let schema = json!({
        "additionalProperties": {"minimum": 1},
        "properties": {"bar": {"minimum": 7}}
    });
    let errors = check(schema.clone(), json!({"baka": 0}));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::AdditionalProperties { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains_key("baka"));
        }
        other => panic!("expected additionalProperties error, got {:?}", other),
    }
    assert!(check(schema, json!({"baka": 5})).is_empty());
}

#[test]
fn test_additional_properties_false() {
    let schema = json!({
        "properties": {"a": {}},
        "patternProperties": {"^x-": {}},
        "additionalProperties": false
    });
    assert!(check(schema.clone(), json!({"a": 1, "x-b": 2})).is_empty());
    let errors = check(schema, json!({"a": 1, "stray": 2}));
    match &errors[0].kind {
        ErrorKind::AdditionalProperties { errors } => {
            // the key itself is the violation, no nested detail
            assert!(errors.contains_key("stray"));
            assert!(errors["stray"].is_empty());
        }
        other => panic!("expected additionalProperties error, got {:?}", other),
    }
}

#[test]
fn test_dependencies() {
    let schema = json!({"dependencies": {
        "a": ["b"],
        "c": {"required": ["d"]}
    }});
    assert!(check(schema.clone(), json!({"a": 1, "b": 2})).is_empty());
    assert!(check(schema.clone(), json!({})).is_empty());

    let errors = check(schema.clone(), json!({"a": 1}));
    match &errors[0].kind {
        ErrorKind::Dependencies { errors } => {
            assert!(matches!(errors["a"][0].kind, ErrorKind::Required { .. }));
        }
        other => panic!("expected dependencies error, got {:?}", other),
    }

    // a schema dependency constrains the whole value
    let errors = check(schema, json!({"c": 1}));
    match &errors[0].kind {
        ErrorKind::Dependencies { errors } => {
            assert!(matches!(errors["c"][0].kind, ErrorKind::Required { .. }));
        }
        other => panic!("expected dependencies error, got {:?}", other),
    }
}

#[test]
fn test_property_names() {
    let errors = check(
        json!({"propertyNames": "^[a-z]+$"}),
        json!({"ok": 1, "Bad": 2}),
    );
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::PropertyNames {
            mismatch_properties,
            ..
        } => assert_eq!(mismatch_properties, &["Bad"]),
        other => panic!("expected propertyNames error, got {:?}", other),
    }
}

#[test]
fn test_enum_and_const_use_deep_equality() {
    assert!(check(json!({"enum": [1, "a"]}), json!("a")).is_empty());
    // 1 and 1.0 are the same number
    assert!(check(json!({"enum": [1]}), json!(1.0)).is_empty());
    assert!(matches!(
        check(json!({"enum": [1, 2]}), json!(3))[0].kind,
        ErrorKind::Enum { .. }
    ));
    assert!(check(json!({"const": {"a": [1]}}), json!({"a": [1]})).is_empty());
    assert!(matches!(
        check(json!({"const": 2}), json!(3))[0].kind,
        ErrorKind::Const { .. }
    ));
}

#[test]
fn test_all_of_flattens_sub_errors() {
    let schema = json!({"allOf": [{"minimum": 5}, {"multipleOf": 2}]});
    assert!(check(schema.clone(), json!(6)).is_empty());
    let errors = check(schema, json!(3));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::AllOf { errors } => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0].kind, ErrorKind::Minimum { .. }));
            assert!(matches!(errors[1].kind, ErrorKind::MultipleOf { .. }));
        }
        other => panic!("expected allOf error, got {:?}", other),
    }
}

#[test]
fn test_any_of_aggregates_when_none_pass() {
    let schema = json!({"anyOf": [{"type": "string"}, {"minimum": 5}]});
    assert!(check(schema.clone(), json!("x")).is_empty());
    assert!(check(schema.clone(), json!(7)).is_empty());
    let errors = check(schema, json!(1));
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::AnyOf { errors } => assert_eq!(errors.len(), 2),
        other => panic!("expected anyOf error, got {:?}", other),
    }
}

#[test]
fn test_one_of_reports_matched_list() {
    let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}]});
    // an integer satisfies both subschemas
    let errors = check(schema.clone(), json!(1));
    match &errors[0].kind {
        ErrorKind::OneOf { matched } => assert_eq!(matched, &[0, 1]),
        other => panic!("expected oneOf error, got {:?}", other),
    }
    // a fractional number satisfies exactly one
    assert!(check(schema.clone(), json!(1.5)).is_empty());
    // no match at all reports the same kind with an empty list
    let errors = check(schema, json!("x"));
    match &errors[0].kind {
        ErrorKind::OneOf { matched } => assert!(matched.is_empty()),
        other => panic!("expected oneOf error, got {:?}", other),
    }
}

#[test]
fn test_not_inverts() {
    assert!(check(json!({"not": {"type": "string"}}), json!(1)).is_empty());
    let errors = check(json!({"not": {"type": "string"}}), json!("x"));
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, ErrorKind::Not));
}

#[test]
fn test_errors_are_stamped_with_the_checked_value() {
    let errors = check(
        json!({"properties": {"a": {"minLength": 3}}}),
        json!({"a": "x"}),
    );
    // outer error carries the object, nested error carries the string
    assert_eq!(errors[0].value, json!({"a": "x"}));
    match &errors[0].kind {
        ErrorKind::Properties { errors } => {
            assert_eq!(errors["a"][0].value, json!("x"));
        }
        other => panic!("expected properties error, got {:?}", other),
    }
}

#[test]
fn test_validate_is_pure() {
    let v = validator(json!({"minLength": 5, "pattern": "^a"}));
    let value = json!("bcd");
    assert_eq!(v.validate(&value), v.validate(&value));
}

#[test]
fn test_custom_equals_is_injectable() {
    fn never_equal(_: &Value, _: &Value) -> bool {
        false
    }
    let schema = compile(&json!({"const": 1})).unwrap();
    let v = JsonSchemaValidator::with_equals(schema, never_equal).unwrap();
    assert_eq!(v.validate(&json!(1)).len(), 1);
}
