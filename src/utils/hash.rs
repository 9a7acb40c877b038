//! Content hashing for correlated payloads
//!
//! The digest is taken over a canonical serialization (compact JSON,
//! object keys sorted at every depth) so it only depends on content,
//! never on the order fields arrived in.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialize `value` canonically
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // 字符串的 JSON 转义交给 serde_json，不会失败
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// SHA-256 of the canonical form, hex encoded (64 chars)
pub fn content_hash(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(value).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"b": 1, "a": {"z": true, "m": [3, {"y": null, "x": "s"}]}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"m":[3,{"x":"s","y":null}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_canonical_json_escapes_strings() {
        let value = json!({"k\"ey": "line\nbreak"});
        assert_eq!(canonical_json(&value), r#"{"k\"ey":"line\nbreak"}"#);
    }

    #[test]
    fn test_content_hash_is_deterministic() {
        let a = json!({"clientData": {"basic": {"platform": "Linux"}}, "behavior": {}});
        let b = json!({"behavior": {}, "clientData": {"basic": {"platform": "Linux"}}});
        assert_eq!(content_hash(&a), content_hash(&b));
        assert_eq!(content_hash(&a).len(), 64);
    }

    #[test]
    fn test_content_hash_differs_for_different_content() {
        let a = json!({"clientData": {"basic": {"platform": "Linux"}}, "behavior": {}});
        let b = json!({"clientData": {"basic": {"platform": "MacIntel"}}, "behavior": {}});
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_content_hash_known_vector() {
        // sha256("{}")
        assert_eq!(
            content_hash(&json!({})),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }
}
