//! Errors raised by the window manager and platform adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("failed to create window: {0}")]
    WindowCreation(String),

    #[error("failed to create webview: {0}")]
    WebViewCreation(String),

    #[error("window {0} not found")]
    WindowNotFound(u64),

    #[error("window {0} is closed")]
    Closed(u64),

    #[error("event loop error: {0}")]
    EventLoop(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DesktopError>;
