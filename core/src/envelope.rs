//! The wire envelope: `{"$ch": "name" | "prefix:name", "p": <payload>}`.
//!
//! Encoding and decoding here must match the injected client script byte for
//! byte in behavior (size cap, `__proto__` stripping, required `$ch` shape)
//! even though the two live in different languages - see `client_script.rs`.

use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub ch: String,
    pub payload: Option<Value>,
}

/// Encode `(event_type, payload)` under an optional channel prefix.
/// `prefix` is the resolved, non-colon-suffixed channel id; pass `""` for none.
pub fn encode(prefix: &str, event_type: &str, payload: Option<&Value>) -> Result<String> {
    let ch = if prefix.is_empty() {
        event_type.to_string()
    } else {
        format!("{prefix}:{event_type}")
    };
    let mut obj = Map::new();
    obj.insert("$ch".to_string(), Value::String(ch));
    if let Some(p) = payload {
        obj.insert("p".to_string(), p.clone());
    }
    serde_json::to_string(&Value::Object(obj)).map_err(CoreError::Json)
}

/// Decode a raw wire message: enforce the size cap, parse, strip any
/// `__proto__` own-property anywhere a `Map` appears, then require the
/// result to be an object with a string `$ch`. Returns `None` - not an
/// error - for anything that isn't a well-formed envelope, matching the
/// "drop silently" posture of the client-side decoder.
pub fn decode(raw: &str, max_size: usize) -> Option<Envelope> {
    if raw.len() > max_size {
        return None;
    }
    let mut value: Value = serde_json::from_str(raw).ok()?;
    strip_proto_pollution(&mut value);
    let obj = value.as_object()?;
    let ch = obj.get("$ch")?.as_str()?.to_string();
    let payload = obj.get("p").cloned();
    Some(Envelope { ch, payload })
}

/// Recursively delete any `__proto__` own key from every object in the tree.
/// `serde_json::Map` is not JS's `Object.prototype`-backed map, so a
/// `__proto__` key parsed here is inert data - but we still strip it before
/// handing the value to application code, mirroring the client decoder's
/// defense so a payload can't rely on carrying the key through to a handler
/// that later re-serializes it into a genuinely vulnerable JS context.
pub fn strip_proto_pollution(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("__proto__");
            for v in map.values_mut() {
                strip_proto_pollution(v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                strip_proto_pollution(v);
            }
        }
        _ => {}
    }
}

/// Split a possibly-prefixed `$ch` against the configured channel prefix.
/// Returns the unprefixed event name, or `None` if the prefix doesn't match
/// (including the case where a prefix is configured but the message carries
/// none).
pub fn unprefix<'a>(ch: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        Some(ch)
    } else {
        ch.strip_prefix(prefix).and_then(|rest| rest.strip_prefix(':'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_decode_round_trip_no_prefix() {
        let payload = json!("hi");
        let wire = encode("", "ping", Some(&payload)).unwrap();
        let env = decode(&wire, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        assert_eq!(env.ch, "ping");
        assert_eq!(env.payload, Some(payload));
    }

    #[test]
    fn encode_decode_round_trip_with_prefix() {
        let wire = encode("ns", "ping", Some(&json!(1))).unwrap();
        let env = decode(&wire, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        assert_eq!(env.ch, "ns:ping");
        assert_eq!(unprefix(&env.ch, "ns"), Some("ping"));
        assert_eq!(unprefix(&env.ch, ""), Some("ns:ping"));
    }

    #[test]
    fn void_payload_omits_p() {
        let wire = encode("", "randomize", None).unwrap();
        assert!(!wire.contains("\"p\""));
        let env = decode(&wire, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        assert_eq!(env.payload, None);
    }

    #[test]
    fn rejects_oversized_message() {
        let huge = format!("{{\"$ch\":\"x\",\"p\":\"{}\"}}", "a".repeat(2_000_000));
        assert!(decode(&huge, DEFAULT_MAX_MESSAGE_SIZE).is_none());
    }

    #[test]
    fn rejects_missing_or_non_string_ch() {
        assert!(decode(r#"{"p":1}"#, DEFAULT_MAX_MESSAGE_SIZE).is_none());
        assert!(decode(r#"{"$ch":1,"p":1}"#, DEFAULT_MAX_MESSAGE_SIZE).is_none());
        assert!(decode("not json", DEFAULT_MAX_MESSAGE_SIZE).is_none());
        assert!(decode(r#""just a string""#, DEFAULT_MAX_MESSAGE_SIZE).is_none());
    }

    #[test]
    fn strips_proto_pollution_and_preserves_siblings() {
        let raw = r#"{"$ch":"ping","p":{"x":1,"__proto__":{"polluted":true}}}"#;
        let env = decode(raw, DEFAULT_MAX_MESSAGE_SIZE).unwrap();
        let p = env.payload.unwrap();
        assert_eq!(p.get("x"), Some(&json!(1)));
        assert!(p.get("__proto__").is_none());
    }

    #[test]
    fn namespace_mismatch_rejected() {
        assert_eq!(unprefix("ping", "ns"), None);
        assert_eq!(unprefix("ns:ping", "ns"), Some("ping"));
    }
}
