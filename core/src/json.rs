//! JSON helpers shared by the envelope codec and the generated client script.
//!
//! `to_js_literal` is the one function every call site must go through when a
//! [`serde_json::Value`] needs to be embedded inside generated JavaScript source.
//! Hand-rolled `.replace('\\', ...)` escaping is how injection bugs get written;
//! serializing through `serde_json` and checking the result can't terminate the
//! surrounding `<script>` or string literal is the only safe path.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, Result};

pub fn from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T> {
    serde_json::from_str(s).map_err(CoreError::Json)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(CoreError::Json)
}

pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(CoreError::Json)
}

/// Render a JSON value as a JavaScript expression literal safe to splice into
/// a `<script>` body. Delegates escaping entirely to `serde_json`'s string
/// encoder, then additionally escapes `</` so the literal cannot close an
/// enclosing `<script>` tag when embedded in HTML.
pub fn to_js_literal(value: &Value) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    json.replace("</", "<\\/")
}

pub fn serialize_to_js_literal<T: Serialize>(value: &T) -> Result<String> {
    let v = to_value(value)?;
    Ok(to_js_literal(&v))
}
