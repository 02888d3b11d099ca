//! Crate-wide error type for the platform-agnostic channel core.

use thiserror::Error;

/// Errors raised by the envelope codec, schema dispatch, and channel setup.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("message exceeds configured size cap ({actual} > {limit} bytes)")]
    MessageTooLarge { actual: usize, limit: usize },

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("schema validation failed for \"{event}\": {reason}")]
    ValidationFailed { event: String, reason: String },

    #[error("unknown event type \"{0}\"")]
    UnknownEvent(String),

    #[error("channel host window is closed")]
    HostClosed,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
