//! Conversion between plain JSON fields and Firestore's typed value encoding.

use serde_json::{json, Map, Number, Value};

use super::Fields;

/// Encode plain fields as a Firestore `fields` object.
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    )
}

/// Decode a Firestore `fields` object. Unknown value kinds decode as `null`.
pub fn decode_fields(fields: &Map<String, Value>) -> Fields {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), decode_value(value)))
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => number.as_i64().map_or_else(
            || json!({ "doubleValue": number.as_f64().unwrap_or(0.0) }),
            |integer| json!({ "integerValue": integer.to_string() }),
        ),
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

fn decode_value(value: &Value) -> Value {
    let Some(typed) = value.as_object() else {
        return Value::Null;
    };

    if let Some(flag) = typed.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(flag);
    }
    if let Some(integer) = typed.get("integerValue") {
        let parsed = match integer {
            Value::String(text) => text.parse::<i64>().ok(),
            Value::Number(number) => number.as_i64(),
            _ => None,
        };
        return parsed.map_or(Value::Null, |integer| Value::Number(integer.into()));
    }
    if let Some(double) = typed.get("doubleValue") {
        return double
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number);
    }
    for key in ["stringValue", "timestampValue", "referenceValue", "bytesValue"] {
        if let Some(text) = typed.get(key).and_then(Value::as_str) {
            return Value::String(text.to_string());
        }
    }
    if let Some(array) = typed.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = typed.get("mapValue") {
        let fields = map
            .get("fields")
            .and_then(Value::as_object)
            .map(decode_fields)
            .unwrap_or_default();
        return Value::Object(fields);
    }

    Value::Null
}
