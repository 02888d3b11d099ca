//! `wry`-backed [`PlatformAdapter`]. Holds the live `tao::window::Window`
//! and `wry::WebView`; all methods assume they run on the UI thread inside
//! the pump's drain step.

use tao::window::Window;
use webviewhost_core::events::{CookieInfo, SameSite};

use crate::adapter::PlatformAdapter;
use crate::error::{DesktopError, Result};

pub struct WryAdapter {
    pub window: Window,
    pub webview: wry::WebView,
}

impl WryAdapter {
    pub fn new(window: Window, webview: wry::WebView) -> Self {
        Self { window, webview }
    }
}

fn same_site_from(raw: wry::cookie::SameSite) -> SameSite {
    match raw {
        wry::cookie::SameSite::Strict => SameSite::Strict,
        wry::cookie::SameSite::Lax => SameSite::Lax,
        wry::cookie::SameSite::None => SameSite::None,
    }
}

fn cookie_info_from(cookie: &wry::cookie::Cookie<'_>) -> CookieInfo {
    let expires = match cookie.expires() {
        Some(wry::cookie::Expiration::DateTime(dt)) => dt.unix_timestamp() as f64,
        _ => -1.0,
    };
    CookieInfo {
        name: cookie.name().to_string(),
        value: cookie.value().to_string(),
        domain: cookie.domain().unwrap_or_default().to_string(),
        path: cookie.path().unwrap_or("/").to_string(),
        http_only: cookie.http_only().unwrap_or(false),
        secure: cookie.secure().unwrap_or(false),
        same_site: cookie
            .same_site()
            .map(same_site_from)
            .unwrap_or(SameSite::Lax),
        expires,
    }
}

impl PlatformAdapter for WryAdapter {
    fn tao_window_id(&self) -> tao::window::WindowId {
        self.window.id()
    }

    fn load_url(&self, url: &str) -> Result<()> {
        self.webview
            .load_url(url)
            .map_err(|e| DesktopError::WebViewCreation(e.to_string()))
    }

    fn load_html(&self, html: &str) -> Result<()> {
        self.webview
            .load_html(html)
            .map_err(|e| DesktopError::WebViewCreation(e.to_string()))
    }

    fn evaluate_script(&self, source: &str) -> Result<()> {
        self.webview
            .evaluate_script(source)
            .map_err(|e| DesktopError::WebViewCreation(e.to_string()))
    }

    fn post_message(&self, text: &str) -> Result<()> {
        let bundle = webviewhost_core::json::to_js_literal(&serde_json::Value::String(
            text.to_string(),
        ));
        let script = format!("window.__native_message__ && window.__native_message__({bundle});");
        self.evaluate_script(&script)
    }

    fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    fn set_size(&self, width: u32, height: u32) {
        self.window
            .set_inner_size(tao::dpi::LogicalSize::new(width, height));
    }

    fn set_min_size(&self, width: u32, height: u32) {
        self.window
            .set_min_inner_size(Some(tao::dpi::LogicalSize::new(width, height)));
    }

    fn set_max_size(&self, width: u32, height: u32) {
        self.window
            .set_max_inner_size(Some(tao::dpi::LogicalSize::new(width, height)));
    }

    fn set_position(&self, x: i32, y: i32) {
        self.window.set_outer_position(tao::dpi::LogicalPosition::new(x, y));
    }

    fn set_resizable(&self, resizable: bool) {
        self.window.set_resizable(resizable);
    }

    fn set_decorations(&self, decorations: bool) {
        self.window.set_decorations(decorations);
    }

    fn set_always_on_top(&self, always_on_top: bool) {
        self.window.set_always_on_top(always_on_top);
    }

    fn show(&self) {
        self.window.set_visible(true);
    }

    fn hide(&self) {
        self.window.set_visible(false);
    }

    fn focus(&self) {
        self.window.set_focus();
    }

    fn maximize(&self) {
        self.window.set_maximized(true);
    }

    fn minimize(&self) {
        self.window.set_minimized(true);
    }

    fn unmaximize(&self) {
        self.window.set_maximized(false);
    }

    fn reload(&self) -> Result<()> {
        self.evaluate_script("window.location.reload();")
    }

    fn get_cookies(&self, url: Option<&str>) -> Vec<CookieInfo> {
        let raw = match url {
            Some(u) => {
                let parsed = match url::Url::parse(u) {
                    Ok(p) => p,
                    Err(_) => return Vec::new(),
                };
                self.webview.cookies_for_url(parsed).unwrap_or_default()
            }
            None => self.webview.cookies().unwrap_or_default(),
        };

        let mut cookies: Vec<CookieInfo> = raw.iter().map(cookie_info_from).collect();

        // `cookies_for_url` isn't guaranteed URL-scoped on every engine.
        if let Some(u) = url {
            if let Ok(parsed) = url::Url::parse(u) {
                if let Some(host) = parsed.host_str() {
                    let host = host.to_lowercase();
                    cookies.retain(|c| {
                        let domain = c.domain.trim_start_matches('.').to_lowercase();
                        domain.is_empty() || host == domain || host.ends_with(&format!(".{domain}"))
                    });
                }
            }
        }

        cookies
    }
}
