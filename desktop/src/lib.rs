//! Native window manager and `wry`/`tao` platform adapter.
//!
//! ```rust,ignore
//! use webviewhost_desktop::{config::WindowOptions, window::NativeWindow, window_manager::WindowManager};
//!
//! let manager = WindowManager::new();
//! let window = NativeWindow::new(manager.clone(), WindowOptions::new().url("https://example.com"));
//! window.show().unwrap();
//! webviewhost_desktop::event_loop::run(manager).unwrap();
//! ```
//!
//! Attaching a typed channel:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webviewhost_core::{Channel, ChannelOptions, KindSchema, ValueKind};
//!
//! let window = Arc::new(window);
//! let mut schemas = webviewhost_core::SchemaMap::new();
//! schemas.insert("ping".into(), KindSchema::new(ValueKind::String));
//! let channel = Channel::new(window.clone(), ChannelOptions { schemas, ..Default::default() });
//! channel.on_fn("ping", |payload| println!("got {payload:?}"));
//! ```

pub mod adapter;
pub mod command;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod window;
pub mod window_manager;

pub use config::WindowOptions;
pub use error::{DesktopError, Result};
pub use window::NativeWindow;
pub use window_manager::{WindowId, WindowManager};

/// Initializes the global tracing subscriber. Thin re-export so desktop
/// consumers don't need a direct dependency on `webviewhost_core` just to
/// turn on logging.
pub fn init_logging() {
    webviewhost_core::utils::init_logging();
}
