//! Safe-to-log config snapshots.

use serde_json::Value;

use crate::schema::Config;

/// Masks every field whose name ends in `_key`.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) if is_sensitive_key(k) => Value::String(mask(s)),
                        other => redact(other),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.ends_with("_key") || key.contains("secret") || key.contains("token")
}

/// Keep a four-character hint.
fn mask(s: &str) -> String {
    match s.get(..4) {
        Some(prefix) if s.len() > 8 => format!("{prefix}***"),
        _ => "***".to_string(),
    }
}

impl Config {
    pub fn redacted(&self) -> Value {
        serde_json::to_value(self).map(|v| redact(&v)).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_api_keys() {
        let mut config = Config::with_gemini_key("AIzaSyA-very-secret-value");
        config.vision_api_key = Some("short".into());
        let redacted = config.redacted();
        assert_eq!(redacted["gemini_api_key"], "AIza***");
        assert_eq!(redacted["vision_api_key"], "***");
        assert_eq!(redacted["geocoding_api_key"], Value::Null);
        assert_eq!(redacted["port"], 5001);
    }
}
