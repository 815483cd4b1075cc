use either::Either;
use jsonv_schema::{compile, Schema, SchemaError, SchemaNode, SchemaType};
use serde_json::json;

#[test]
fn test_compile_typed_string() {
    let schema = compile(&json!({"type": "string", "minLength": 2, "pattern": "^a"})).unwrap();
    assert_eq!(schema.types, vec![SchemaType::String]);
    match &schema.node {
        SchemaNode::String(s) => {
            assert_eq!(s.min_length, Some(2));
            assert_eq!(s.pattern.as_deref(), Some("^a"));
        }
        other => panic!("expected string node, got {:?}", other),
    }
}

#[test]
fn test_compile_generic_keywords() {
    let schema = compile(&json!({
        "$id": "https://example.com/s.json",
        "title": "a title",
        "description": "words",
        "default": 1,
        "examples": [1, 2],
        "const": 3,
        "enum": [1, 2, 3],
        "not": {"type": "null"}
    }))
    .unwrap();
    assert_eq!(schema.id.as_deref(), Some("https://example.com/s.json"));
    assert_eq!(schema.title.as_deref(), Some("a title"));
    assert_eq!(schema.const_value, Some(json!(3)));
    assert_eq!(schema.enum_value, Some(vec![json!(1), json!(2), json!(3)]));
    assert!(schema.not.is_some());
    assert_eq!(schema.node, SchemaNode::Any);
}

#[test]
fn test_compile_rejects_incompatible_keyword() {
    let err = compile(&json!({"type": "object", "minLength": 2})).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::IncompatibleKeyword { ref keyword, .. } if keyword == "minLength"
    ));
}

#[test]
fn test_compile_rejects_invalid_type() {
    assert!(matches!(
        compile(&json!({"type": "strang"})).unwrap_err(),
        SchemaError::InvalidType { .. }
    ));
    assert!(matches!(
        compile(&json!({"type": 5})).unwrap_err(),
        SchemaError::InvalidType { .. }
    ));
}

#[test]
fn test_compile_malformed_text_is_fatal() {
    let err = "{ not json".parse::<Schema>().unwrap_err();
    assert!(matches!(err, SchemaError::MalformedSchema { .. }));
}

#[test]
fn test_compile_rejects_bad_keyword_shapes() {
    assert!(matches!(
        compile(&json!({"minLength": -1})).unwrap_err(),
        SchemaError::MalformedSchema { .. }
    ));
    assert!(matches!(
        compile(&json!({"required": [1]})).unwrap_err(),
        SchemaError::MalformedSchema { .. }
    ));
}

#[test]
fn test_compile_ref_is_exclusive() {
    let schema = compile(&json!({"$ref": "#/defs/a", "title": "ignored"})).unwrap();
    assert_eq!(schema.title, None);
    match &schema.node {
        SchemaNode::Ref(ref_node) => {
            assert_eq!(ref_node.reference.segments, vec!["defs", "a"]);
            assert_eq!(ref_node.reference.url, None);
        }
        other => panic!("expected ref node, got {:?}", other),
    }
}

#[test]
fn test_compile_items_list_mode() {
    let schema = compile(&json!({"items": {"type": "integer"}})).unwrap();
    match &schema.node {
        SchemaNode::Array(array) => {
            let items = array.items.as_ref().unwrap();
            assert!(matches!(items.value, Either::Left(_)));
        }
        other => panic!("expected array node, got {:?}", other),
    }
}

#[test]
fn test_compile_items_tuple_mode() {
    let schema = compile(&json!({
        "items": [{"type": "integer"}, {"type": "string"}],
        "additionalItems": {"type": "null"}
    }))
    .unwrap();
    match &schema.node {
        SchemaNode::Array(array) => {
            let items = array.items.as_ref().unwrap();
            match &items.value {
                Either::Right(schemas) => assert_eq!(schemas.len(), 2),
                other => panic!("expected tuple items, got {:?}", other),
            }
            assert!(array.additional_items.is_some());
        }
        other => panic!("expected array node, got {:?}", other),
    }
}

#[test]
fn test_compile_untyped_infers_group() {
    let schema = compile(&json!({"multipleOf": 7})).unwrap();
    assert!(schema.types.is_empty());
    assert!(matches!(schema.node, SchemaNode::Number(_)));
}

#[test]
fn test_compile_untyped_keywords_spanning_groups() {
    let schema = compile(&json!({"minLength": 2, "minimum": 3})).unwrap();
    match &schema.node {
        SchemaNode::Union(members) => assert_eq!(members.len(), 2),
        other => panic!("expected union node, got {:?}", other),
    }
}

#[test]
fn test_compile_type_list() {
    let schema = compile(&json!({"type": ["string", "null"], "maxLength": 3})).unwrap();
    assert_eq!(schema.types, vec![SchemaType::String, SchemaType::Null]);
    match &schema.node {
        SchemaNode::Union(members) => {
            assert_eq!(members.len(), 2);
            assert!(matches!(members[0], SchemaNode::String(_)));
            assert!(matches!(members[1], SchemaNode::Null));
        }
        other => panic!("expected union node, got {:?}", other),
    }
}

#[test]
fn test_compile_integer_and_number_share_a_group() {
    let schema = compile(&json!({"type": ["integer", "number"], "minimum": 1})).unwrap();
    assert!(matches!(schema.node, SchemaNode::Number(_)));
    assert_eq!(schema.types.len(), 2);
}

#[test]
fn test_compile_object_keywords() {
    let schema = compile(&json!({
        "type": "object",
        "required": ["a"],
        "properties": {"a": {"type": "string"}},
        "patternProperties": {"^x-": {"type": "integer"}},
        "additionalProperties": false,
        "dependencies": {"a": ["b"], "c": {"minProperties": 2}},
        "propertyNames": "^[a-z]+$",
        "maxProperties": 5
    }))
    .unwrap();
    match &schema.node {
        SchemaNode::Object(object) => {
            assert_eq!(object.required.as_deref(), Some(&["a".to_string()][..]));
            assert!(object.properties.as_ref().unwrap().contains_key("a"));
            assert!(object
                .pattern_properties
                .as_ref()
                .unwrap()
                .contains_key("^x-"));
            assert!(matches!(
                object.additional_properties.as_ref().unwrap().value,
                Either::Left(false)
            ));
            let deps = object.dependencies.as_ref().unwrap();
            assert!(matches!(deps.get("a").unwrap().value, Either::Left(_)));
            assert!(matches!(deps.get("c").unwrap().value, Either::Right(_)));
            assert_eq!(object.property_names.as_deref(), Some("^[a-z]+$"));
            assert_eq!(object.max_properties, Some(5));
        }
        other => panic!("expected object node, got {:?}", other),
    }
}

#[test]
fn test_compiled_tree_reports_resolution_state() {
    let with_ref = compile(&json!({"properties": {"a": {"$ref": "#/x"}}})).unwrap();
    assert!(!with_ref.is_resolved());
    let plain = compile(&json!({"properties": {"a": {"type": "string"}}})).unwrap();
    assert!(plain.is_resolved());
}
