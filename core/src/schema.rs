//! The one-method schema capability. Deliberately thin: any validation
//! library can be adapted to this trait without the channel knowing or
//! caring which one, the same way `auroraview_core::bom` exposes single-
//! method traits (`NavigationApi`, `ZoomApi`, ...) instead of a class
//! hierarchy.

use std::sync::Arc;

use serde_json::Value;

/// Outcome of validating (and possibly transforming) an incoming payload.
pub enum ParseOutcome {
    Success(Value),
    Failure(Option<String>),
}

pub trait Schema: Send + Sync {
    /// Validate `data`. On success, returns the (possibly transformed) value
    /// that handlers will receive - never the raw input, so schemas that
    /// coerce types are applied before dispatch.
    fn safe_parse(&self, data: Option<&Value>) -> ParseOutcome;
}

pub type SchemaMap = std::collections::HashMap<String, Arc<dyn Schema>>;

/// A schema that accepts any JSON value unchanged, including an absent
/// payload (void events). Useful as a default or for events whose payload
/// shape doesn't need validation beyond "parses as JSON".
pub struct AnySchema;

impl Schema for AnySchema {
    fn safe_parse(&self, data: Option<&Value>) -> ParseOutcome {
        ParseOutcome::Success(data.cloned().unwrap_or(Value::Null))
    }
}

/// A schema requiring the payload to already be exactly one JSON type
/// (string, number, bool, array, object), with no further structural checks.
/// Enough to enforce a type-level contract on each event without pulling in
/// a full validation crate this stack never otherwise depends on.
pub struct KindSchema {
    kind: ValueKind,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Array,
    Object,
    Void,
}

impl KindSchema {
    pub fn new(kind: ValueKind) -> Arc<dyn Schema> {
        Arc::new(Self { kind })
    }
}

impl Schema for KindSchema {
    fn safe_parse(&self, data: Option<&Value>) -> ParseOutcome {
        match (self.kind, data) {
            (ValueKind::Void, None) => ParseOutcome::Success(Value::Null),
            (ValueKind::Void, Some(Value::Null)) => ParseOutcome::Success(Value::Null),
            (ValueKind::String, Some(v @ Value::String(_))) => ParseOutcome::Success(v.clone()),
            (ValueKind::Number, Some(v @ Value::Number(_))) => ParseOutcome::Success(v.clone()),
            (ValueKind::Bool, Some(v @ Value::Bool(_))) => ParseOutcome::Success(v.clone()),
            (ValueKind::Array, Some(v @ Value::Array(_))) => ParseOutcome::Success(v.clone()),
            (ValueKind::Object, Some(v @ Value::Object(_))) => ParseOutcome::Success(v.clone()),
            _ => ParseOutcome::Failure(Some(format!(
                "expected {:?}, got {:?}",
                self.kind, data
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn any_schema_accepts_everything() {
        let s = AnySchema;
        assert!(matches!(s.safe_parse(Some(&json!(42))), ParseOutcome::Success(_)));
        assert!(matches!(s.safe_parse(None), ParseOutcome::Success(_)));
    }

    #[test]
    fn kind_schema_rejects_mismatched_type() {
        let s = KindSchema::new(ValueKind::String);
        assert!(matches!(s.safe_parse(Some(&json!(1))), ParseOutcome::Failure(_)));
        assert!(matches!(
            s.safe_parse(Some(&json!("hi"))),
            ParseOutcome::Success(_)
        ));
    }

    #[test]
    fn void_schema_accepts_absent_payload() {
        let s = KindSchema::new(ValueKind::Void);
        assert!(matches!(s.safe_parse(None), ParseOutcome::Success(_)));
    }
}
