//! Response clean-up.
//!
//! The platform decorates every response with call metadata, and schema
//! responses with server-computed field attributes that `setSchema` rejects.
//! Both are stripped so fetched payloads can be written back verbatim.

use serde_json::{Map, Value};

const RESPONSE_METADATA: &[&str] = &["callId", "errorCode", "statusCode", "statusReason", "time"];

/// Read-only attributes reported on every profile field.
const PROFILE_FIELD_READ_ONLY: &[&str] = &["arrayOp", "allowNull", "type", "encrypt", "format"];

pub fn strip_response_metadata(body: &mut Value) {
    if let Some(map) = body.as_object_mut() {
        for key in RESPONSE_METADATA {
            map.remove(*key);
        }
    }
}

/// Make a fetched schema acceptable to `accounts.setSchema`.
pub fn sanitize_schema(schema: &mut Value) {
    if let Some(profile) = schema.get_mut("profileSchema").and_then(Value::as_object_mut) {
        profile.remove("unique");
        profile.remove("dynamicSchema");
        if let Some(fields) = fields_mut(profile) {
            for field in fields.values_mut().filter_map(Value::as_object_mut) {
                for key in PROFILE_FIELD_READ_ONLY {
                    field.remove(*key);
                }
            }
        }
    }

    if let Some(data) = schema.get_mut("dataSchema").and_then(Value::as_object_mut) {
        let empty_unique = data
            .get("unique")
            .and_then(Value::as_array)
            .is_some_and(|u| u.is_empty());
        if empty_unique {
            data.remove("unique");
        }
        if let Some(fields) = fields_mut(data) {
            fields.retain(|_, field| field.get("type").is_some_and(is_truthy));
        }
    }
}

fn fields_mut(section: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    section.get_mut("fields").and_then(Value::as_object_mut)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
