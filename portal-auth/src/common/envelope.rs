use serde_json::Value;

/// Status code embedded in a response envelope, if any.
///
/// The backend sometimes answers HTTP 200 with `{"status": 401, ...}`; callers
/// treat the embedded code exactly like the transport status. Both numeric and
/// numeric-string forms are accepted.
pub fn embedded_status(body: &Value) -> Option<u16> {
    match body.get("status")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Human readable message carried by an error envelope.
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Payload of a success envelope: the `data` member when present, otherwise
/// the whole body.
pub fn into_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// True for codes that must not be treated as success.
pub fn is_failure(status: u16) -> bool {
    status >= 400
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_numeric_and_string_status() {
        assert_eq!(embedded_status(&json!({"status": 401})), Some(401));
        assert_eq!(embedded_status(&json!({"status": "403"})), Some(403));
        assert_eq!(embedded_status(&json!({"status": "OK"})), None);
        assert_eq!(embedded_status(&json!({"data": []})), None);
    }

    #[test]
    fn unwraps_data_member() {
        assert_eq!(into_data(json!({"status": 200, "data": {"a": 1}})), json!({"a": 1}));
        assert_eq!(into_data(json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn picks_first_available_message() {
        assert_eq!(
            error_message(&json!({"error": "boom", "detail": "later"})),
            Some("boom".to_string())
        );
        assert_eq!(error_message(&json!({})), None);
    }
}
