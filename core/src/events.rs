//! Wire-shape records shared between the desktop adapter and the host API:
//! cookies, page-load phases, and the navigation-blocked notice.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    None,
    Lax,
    Strict,
}

/// One cookie as reported by the platform engine's cookie store.
/// `expires == -1` denotes a session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieInfo {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub expires: f64,
}

/// Phase reported by the platform adapter's page-load handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoadPhase {
    Started,
    Finished,
}

/// Result of a `checkRuntime()`/`ensureRuntime()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeStatus {
    pub available: bool,
    pub version: Option<String>,
    pub platform: String,
}
