//! Constructs the `tao::window::Window` + `wry::WebView` pair for one
//! window id and wires the platform adapter's callbacks back into the
//! window manager's per-window `EventHandlers`.

use std::sync::Arc;

use tao::event_loop::EventLoopWindowTarget;
use tao::window::WindowBuilder;
use wry::WebViewBuilder;

use webviewhost_core::client_script::document_start_bundle;
use webviewhost_core::events::PageLoadPhase;

use crate::adapter::WryAdapter;
use crate::config::WindowOptions;
use crate::error::{DesktopError, Result};
use crate::event_loop::UserEvent;
use crate::window_manager::{WindowId, WindowManager};

pub fn build_window(
    id: WindowId,
    manager: Arc<WindowManager>,
    options: &WindowOptions,
    event_loop: &EventLoopWindowTarget<UserEvent>,
) -> Result<WryAdapter> {
    let mut window_builder = WindowBuilder::new()
        .with_title(options.title.clone())
        .with_resizable(options.resizable)
        .with_decorations(options.decorations)
        .with_transparent(options.transparent)
        .with_always_on_top(options.always_on_top)
        .with_inner_size(tao::dpi::LogicalSize::new(options.width, options.height))
        .with_visible(false);

    if let (Some(x), Some(y)) = (options.x, options.y) {
        window_builder = window_builder.with_position(tao::dpi::LogicalPosition::new(x, y));
    }
    if let (Some(w), Some(h)) = (options.min_width, options.min_height) {
        window_builder = window_builder.with_min_inner_size(tao::dpi::LogicalSize::new(w, h));
    }
    if let (Some(w), Some(h)) = (options.max_width, options.max_height) {
        window_builder = window_builder.with_max_inner_size(tao::dpi::LogicalSize::new(w, h));
    }

    let window = window_builder
        .build(event_loop)
        .map_err(|e| DesktopError::WindowCreation(e.to_string()))?;

    let current_url = Arc::new(parking_lot::Mutex::new(
        options.url.clone().unwrap_or_default(),
    ));
    let allowed_hosts = options.allowed_hosts.clone();

    let bundle = document_start_bundle(
        options.csp.as_deref(),
        options.allow_geolocation,
        options.allow_camera || options.allow_microphone,
        None,
    );

    let nav_manager = Arc::clone(&manager);
    let nav_url = Arc::clone(&current_url);
    let navigation_handler = move |target: String| -> bool {
        if is_internal_navigation(&target, &nav_url.lock()) {
            return true;
        }
        let Ok(parsed) = url::Url::parse(&target) else {
            return false;
        };
        if matches!(parsed.scheme(), "data" | "file" | "blob") {
            notify_navigation_blocked(&nav_manager, id, &target);
            return false;
        }
        let allowed = match parsed.host_str() {
            Some(host) => webviewhost_core::origin::host_allowed(&allowed_hosts, host),
            None => allowed_hosts.is_empty(),
        };
        if !allowed {
            notify_navigation_blocked(&nav_manager, id, &target);
        }
        allowed
    };

    let load_manager = Arc::clone(&manager);
    let load_url = Arc::clone(&current_url);
    let on_page_load_handler = move |event: wry::PageLoadEvent, url: String| {
        *load_url.lock() = url.clone();
        let phase = match event {
            wry::PageLoadEvent::Started => PageLoadPhase::Started,
            wry::PageLoadEvent::Finished => PageLoadPhase::Finished,
        };
        if let Some(entry) = load_manager.entry(id) {
            if let Some(cb) = entry.handlers.lock().on_page_load.as_ref() {
                cb(phase, url);
            }
        }
    };

    let title_manager = Arc::clone(&manager);
    let title_changed_handler = move |title: String| {
        if let Some(entry) = title_manager.entry(id) {
            if let Some(cb) = entry.handlers.lock().on_title_changed.as_ref() {
                cb(title);
            }
        }
    };

    let ipc_manager = Arc::clone(&manager);
    let ipc_url = Arc::clone(&current_url);
    let ipc_handler = move |request: http::Request<String>| {
        let source_url = request.uri().to_string();
        let source_url = if source_url.is_empty() {
            ipc_url.lock().clone()
        } else {
            source_url
        };
        let body = request.into_body();
        if let Some(entry) = ipc_manager.entry(id) {
            if let Some(cb) = entry.handlers.lock().on_message.as_ref() {
                cb(body, source_url);
            }
        }
    };

    let webview = WebViewBuilder::new()
        .with_transparent(options.transparent)
        .with_devtools(options.devtools)
        .with_initialization_script(&bundle)
        .with_navigation_handler(navigation_handler)
        .with_on_page_load_handler(on_page_load_handler)
        .with_document_title_changed_handler(title_changed_handler)
        .with_ipc_handler(ipc_handler)
        .with_focused(false);

    let webview = if let Some(url) = &options.url {
        webview.with_url(url)
    } else if let Some(html) = &options.html {
        webview.with_html(html)
    } else {
        webview
    };

    let webview = webview
        .build(&window)
        .map_err(|e| DesktopError::WebViewCreation(e.to_string()))?;

    if options.visible {
        window.set_visible(true);
    }

    Ok(WryAdapter::new(window, webview))
}

fn is_internal_navigation(target: &str, current: &str) -> bool {
    target == "about:blank" || (!current.is_empty() && target == current)
}

fn notify_navigation_blocked(manager: &WindowManager, id: WindowId, url: &str) {
    if let Some(entry) = manager.entry(id) {
        if let Some(cb) = entry.handlers.lock().on_navigation_blocked.as_ref() {
            cb(url.to_string());
        }
    }
}
