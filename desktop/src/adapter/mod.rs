//! The platform webview adapter. `wry` already multiplexes macOS WebKit and
//! Windows WebView2 behind one API, so the capability boundary the window
//! manager needs is expressed here as a trait with a single production
//! implementation ([`WryAdapter`]) rather than one impl per OS.

mod wry_adapter;

pub use wry_adapter::WryAdapter;

use webviewhost_core::events::CookieInfo;

use crate::error::Result;

/// UI-thread-only capability set a built window exposes to the manager.
/// Every method here is expected to run inside the pump's drain step; none
/// of it is safe to call off the UI thread.
pub trait PlatformAdapter: Send {
    /// The native window id, used by the pump to route OS `WindowEvent`s
    /// (which carry only this id) back to the owning window.
    fn tao_window_id(&self) -> tao::window::WindowId;

    fn load_url(&self, url: &str) -> Result<()>;
    fn load_html(&self, html: &str) -> Result<()>;
    fn evaluate_script(&self, source: &str) -> Result<()>;
    fn post_message(&self, text: &str) -> Result<()>;

    fn set_title(&self, title: &str);
    fn set_size(&self, width: u32, height: u32);
    fn set_min_size(&self, width: u32, height: u32);
    fn set_max_size(&self, width: u32, height: u32);
    fn set_position(&self, x: i32, y: i32);
    fn set_resizable(&self, resizable: bool);
    fn set_decorations(&self, decorations: bool);
    fn set_always_on_top(&self, always_on_top: bool);

    fn show(&self);
    fn hide(&self);
    fn focus(&self);
    fn maximize(&self);
    fn minimize(&self);
    fn unmaximize(&self);
    fn reload(&self) -> Result<()>;

    /// Collect cookies from the engine's store, optionally scoped to `url`.
    /// On engines whose API is not URL-scoped, the adapter filters the full
    /// set by domain/path itself.
    fn get_cookies(&self, url: Option<&str>) -> Vec<CookieInfo>;
}
