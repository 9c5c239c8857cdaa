use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// Generate a JSON schema the provider accepts in strict mode.
///
/// Strict mode requires `additionalProperties: false` on every object, every
/// property listed in `required`, and no `$ref` indirection, none of which
/// schemars emits by default.
pub fn strict_schema<T: JsonSchema>() -> Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    fix_object_schemas(&mut value);

    let definitions = match &value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };
    inline_refs(&mut value, definitions.as_ref());

    if let Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }

    value
}

/// Add `additionalProperties: false` and a full `required` list to every
/// object schema in the tree.
fn fix_object_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                if let Some(Value::Object(properties)) = map.get("properties") {
                    let required: Vec<Value> = properties
                        .keys()
                        .map(|k| Value::String(k.clone()))
                        .collect();
                    map.insert("required".to_string(), Value::Array(required));
                }
            }
            for nested in map.values_mut() {
                fix_object_schemas(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                fix_object_schemas(item);
            }
        }
        _ => {}
    }
}

/// Replace `$ref` nodes with the referenced definition body.
fn inline_refs(value: &mut Value, definitions: Option<&Value>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let name = reference
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if let Some(Value::Object(defs)) = definitions {
                    if let Some(definition) = defs.get(&name) {
                        let mut inlined = definition.clone();
                        inline_refs(&mut inlined, definitions);
                        *value = inlined;
                        return;
                    }
                }
            }
            for nested in map.values_mut() {
                inline_refs(nested, definitions);
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}
