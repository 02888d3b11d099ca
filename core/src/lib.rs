//! Platform-agnostic half of a native-window + typed-webview-channel stack:
//! the wire envelope, origin/rate/size policy, the injected client bridge
//! source, and the schema-validated dispatch channel itself.
//!
//! Nothing here depends on a windowing toolkit. The `desktop` crate supplies
//! the concrete [`channel::ChannelHost`] implementation backed by wry/tao.

pub mod channel;
pub mod client_script;
pub mod envelope;
pub mod error;
pub mod events;
pub mod json;
pub mod origin;
pub mod rate_limit;
pub mod schema;
pub mod utils;

pub use channel::{Channel, ChannelHost, ChannelId, ChannelOptions, Handler};
pub use error::{CoreError, Result};
pub use events::{CookieInfo, PageLoadPhase, RuntimeStatus, SameSite};
pub use schema::{AnySchema, KindSchema, Schema, SchemaMap, ValueKind};
