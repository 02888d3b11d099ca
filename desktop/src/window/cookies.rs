//! `getCookies()`'s future-like return value. There is no async runtime in
//! this stack's dependency set, so the "future" is a blocking handle over a
//! one-shot channel the pump completes when the paired `GetCookies` command
//! drains - `wait`/`wait_timeout` are the only ways to observe the result,
//! matching the documented "resolves on the next onCookies delivery"
//! contract without inventing an executor this library doesn't otherwise need.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use webviewhost_core::events::CookieInfo;

use crate::error::{DesktopError, Result};

pub struct CookiesFuture {
    rx: Receiver<String>,
}

impl CookiesFuture {
    pub(crate) fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }

    /// Block until the window closes or the cookie list arrives.
    pub fn wait(self, timeout: Duration) -> Result<Vec<CookieInfo>> {
        match self.rx.recv_timeout(timeout) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| DesktopError::WebViewCreation(format!("malformed cookie payload: {e}"))),
            Err(RecvTimeoutError::Timeout) => {
                Err(DesktopError::EventLoop("getCookies timed out".to_string()))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(DesktopError::EventLoop("window closed before cookies arrived".to_string()))
            }
        }
    }
}
