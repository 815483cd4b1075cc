use jsonv_schema_validator::{catalogs, JsonSchemaValidator, Schema};

fn main() {
    let mut args = std::env::args();
    args.next();
    let (schema_path, value_path) = if let (Some(v1), Some(v2)) = (args.next(), args.next()) {
        (v1, v2)
    } else {
        println!("Usage: validate <schema-json> <to-validate-json>");
        return;
    };
    let schema_text = std::fs::read_to_string(&schema_path).expect("not found schema file");
    let schema: Schema = schema_text.parse().expect("invalid schema file");
    let validator = JsonSchemaValidator::new(schema).expect("schema must be resolved first");
    let value_text = std::fs::read_to_string(&value_path).expect("not found to validate file");
    let value = serde_json::from_str(&value_text).expect("invalid to validate file");
    let messages = validator
        .validate_translate(&value, &catalogs::EN)
        .expect("incomplete locale catalog");
    messages.iter().for_each(|message| {
        println!("{}", message);
    });
}
