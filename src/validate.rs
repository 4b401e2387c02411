// Request body validation, wrapped behind a single errors-list contract so
// the dispatcher never touches the schema engine's own types.
use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Shape of an `ApiKey` body for POST /admin/keys.
pub static API_KEY_SHAPE: Lazy<Validator> = Lazy::new(|| {
    compile(json!({
        "type": "object",
        "properties": {
            "key": { "type": "string" },
            "accessLevel": { "type": "string", "enum": ["admin", "write", "read"] },
            "enabled": { "type": "boolean" }
        },
        "required": ["key", "accessLevel", "enabled"]
    }))
});

/// Shape of a `Flag` body for POST /flags.
pub static FLAG_SHAPE: Lazy<Validator> = Lazy::new(|| {
    let flag_part = json!({
        "type": "object",
        "properties": {
            "value": { "type": "boolean" },
            "name": { "type": "string" },
            "description": { "type": "string" },
            "appliesTo": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["value", "name", "description", "appliesTo"]
    });
    compile(json!({
        "type": "object",
        "properties": {
            "tag": { "type": "string" },
            "name": { "type": "string" },
            "description": { "type": "string" },
            "enabled": { "type": "boolean" },
            "data": {
                "type": "object",
                "properties": {
                    "blue": flag_part.clone(),
                    "green": flag_part,
                    "default": { "type": "string", "enum": ["blue", "green"] }
                },
                "required": ["blue", "green", "default"]
            }
        },
        "required": ["tag", "name", "description", "enabled", "data"]
    }))
});

fn compile(schema: Value) -> Validator {
    // Schemas are embedded literals; a compile failure is a programming error.
    jsonschema::options()
        .build(&schema)
        .expect("embedded schema must compile")
}

/// Validate `payload` against `validator`. An empty list means valid; each
/// entry carries the instance path and a human-readable message.
pub fn validation_errors(validator: &Validator, payload: &Value) -> Vec<Value> {
    validator
        .iter_errors(payload)
        .map(|error| {
            let path = error.instance_path.to_string();
            let path = if path.is_empty() {
                "$".to_string()
            } else {
                format!("${path}")
            };
            json!({ "path": path, "message": error.to_string() })
        })
        .collect()
}
