pub mod builder;
pub mod cookies;

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use webviewhost_core::events::PageLoadPhase;
use webviewhost_core::ChannelHost;

use crate::command::Command;
use crate::config::WindowOptions;
use crate::error::{DesktopError, Result};
use crate::window::cookies::CookiesFuture;
use crate::window_manager::{WindowId, WindowManager};

/// Host-facing handle to one window. Every mutating method checks the
/// window's closed flag before enqueueing; once closed, every method here
/// fails fast with [`DesktopError::Closed`].
pub struct NativeWindow {
    id: WindowId,
    manager: Arc<WindowManager>,
}

impl NativeWindow {
    /// Allocates an id and enqueues window creation. Returns immediately -
    /// the platform window is built on the UI thread's next pump drain (or
    /// immediately, if the pump performs a lazy first tick at startup).
    pub fn new(manager: Arc<WindowManager>, options: WindowOptions) -> Self {
        let id = manager.allocate(options.clone());
        manager.enqueue(id, Command::Create(options));
        Self { id, manager }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    fn check_open(&self) -> Result<()> {
        if self.manager.is_closed(self.id) {
            Err(DesktopError::Closed(self.id))
        } else {
            Ok(())
        }
    }

    fn enqueue(&self, command: Command) -> Result<()> {
        self.check_open()?;
        self.manager.enqueue(self.id, command);
        Ok(())
    }

    pub fn load_url(&self, url: impl Into<String>) -> Result<()> {
        self.enqueue(Command::LoadUrl(url.into()))
    }

    pub fn load_html(&self, html: impl Into<String>) -> Result<()> {
        self.enqueue(Command::LoadHtml(html.into()))
    }

    pub fn post_message_raw(&self, text: impl Into<String>) -> Result<()> {
        self.enqueue(Command::PostMessage(text.into()))
    }

    pub fn set_title(&self, title: impl Into<String>) -> Result<()> {
        self.enqueue(Command::SetTitle(title.into()))
    }

    pub fn set_size(&self, width: u32, height: u32) -> Result<()> {
        self.enqueue(Command::SetSize(width, height))
    }

    pub fn set_min_size(&self, width: u32, height: u32) -> Result<()> {
        self.enqueue(Command::SetMinSize(width, height))
    }

    pub fn set_max_size(&self, width: u32, height: u32) -> Result<()> {
        self.enqueue(Command::SetMaxSize(width, height))
    }

    pub fn set_position(&self, x: i32, y: i32) -> Result<()> {
        self.enqueue(Command::SetPosition(x, y))
    }

    pub fn set_resizable(&self, resizable: bool) -> Result<()> {
        self.enqueue(Command::SetResizable(resizable))
    }

    pub fn set_decorations(&self, decorations: bool) -> Result<()> {
        self.enqueue(Command::SetDecorations(decorations))
    }

    pub fn set_always_on_top(&self, always_on_top: bool) -> Result<()> {
        self.enqueue(Command::SetAlwaysOnTop(always_on_top))
    }

    pub fn show(&self) -> Result<()> {
        self.enqueue(Command::Show)
    }

    pub fn hide(&self) -> Result<()> {
        self.enqueue(Command::Hide)
    }

    pub fn focus(&self) -> Result<()> {
        self.enqueue(Command::Focus)
    }

    pub fn maximize(&self) -> Result<()> {
        self.enqueue(Command::Maximize)
    }

    pub fn minimize(&self) -> Result<()> {
        self.enqueue(Command::Minimize)
    }

    pub fn unmaximize(&self) -> Result<()> {
        self.enqueue(Command::Unmaximize)
    }

    pub fn reload(&self) -> Result<()> {
        self.enqueue(Command::Reload)
    }

    /// Sets the local closed flag before enqueueing the close command, so
    /// any call racing against this one already observes the window as
    /// closed rather than momentarily succeeding.
    pub fn close(&self) -> Result<()> {
        self.manager.mark_closed(self.id);
        self.manager.enqueue(self.id, Command::Close);
        Ok(())
    }

    pub fn get_cookies(&self, url: Option<String>, timeout: Duration) -> Result<CookiesFuture> {
        self.check_open()?;
        let (tx, rx) = std::sync::mpsc::channel();
        if let Some(entry) = self.manager.entry(self.id) {
            entry.cookie_waiters.lock().push(tx);
        }
        self.manager.enqueue(self.id, Command::GetCookies(url));
        let _ = timeout; // consumed by CookiesFuture::wait
        Ok(CookiesFuture::new(rx))
    }

    /// Reaches into the unsafe, unchecked-execution namespace. The returned
    /// accessor re-checks the closed flag on every call, so holding onto it
    /// across a `close()` does not resurrect a dead window.
    pub fn unsafe_accessor(&self) -> UnsafeAccessor<'_> {
        UnsafeAccessor { window: self }
    }

    pub fn on_close<F: Fn() + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            let mut h = entry.handlers.lock();
            if h.on_close.is_some() {
                warn!(id = self.id, "overwriting existing onClose handler");
            }
            h.on_close = Some(Box::new(handler));
        }
    }

    pub fn on_resize<F: Fn(u32, u32) + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_resize = Some(Box::new(handler));
        }
    }

    pub fn on_move<F: Fn(i32, i32) + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_move = Some(Box::new(handler));
        }
    }

    pub fn on_focus<F: Fn() + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_focus = Some(Box::new(handler));
        }
    }

    pub fn on_blur<F: Fn() + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_blur = Some(Box::new(handler));
        }
    }

    pub fn on_title_changed<F: Fn(String) + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_title_changed = Some(Box::new(handler));
        }
    }

    pub fn on_reload<F: Fn() + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_reload = Some(Box::new(handler));
        }
    }

    pub fn on_navigation_blocked<F: Fn(String) + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_navigation_blocked = Some(Box::new(handler));
        }
    }

    pub fn on_cookies<F: Fn(String) + Send + Sync + 'static>(&self, handler: F) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_cookies = Some(Box::new(handler));
        }
    }
}

/// Unsafe, unchecked script-execution namespace. Reached only through
/// [`NativeWindow::unsafe_accessor`].
pub struct UnsafeAccessor<'a> {
    window: &'a NativeWindow,
}

impl UnsafeAccessor<'_> {
    /// # Safety
    /// Executes `source` verbatim in the page with no sandboxing beyond what
    /// the platform engine itself provides. Callers are responsible for the
    /// content they pass here.
    pub unsafe fn evaluate_script(&self, source: impl Into<String>) -> Result<()> {
        self.window.enqueue(Command::EvaluateScript(source.into()))
    }
}

impl ChannelHost for NativeWindow {
    fn post_message(&self, text: &str) {
        if self.manager.is_closed(self.id) {
            return;
        }
        self.manager
            .enqueue(self.id, Command::PostMessage(text.to_string()));
    }

    fn evaluate_script(&self, source: &str) {
        if self.manager.is_closed(self.id) {
            return;
        }
        self.manager
            .enqueue(self.id, Command::EvaluateScript(source.to_string()));
    }

    fn set_message_handler(&self, handler: Box<dyn Fn(String, String) + Send + Sync>) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_message = Some(handler);
        }
    }

    fn set_page_load_finished_handler(&self, handler: Box<dyn Fn(String) + Send + Sync>) {
        if let Some(entry) = self.manager.entry(self.id) {
            entry.handlers.lock().on_page_load = Some(Box::new(move |phase, url| {
                if phase == PageLoadPhase::Finished {
                    handler(url);
                }
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_window_rejects_mutating_calls() {
        let manager = WindowManager::new();
        let window = NativeWindow::new(Arc::clone(&manager), WindowOptions::default());
        window.close().unwrap();
        assert!(window.load_url("https://example.com").is_err());
        assert!(window.show().is_err());
        assert!(window.set_title("x").is_err());
    }

    #[test]
    fn ordering_of_enqueued_commands_is_preserved() {
        let manager = WindowManager::new();
        let window = NativeWindow::new(Arc::clone(&manager), WindowOptions::default());
        window.load_url("https://example.com").unwrap();
        window.set_title("hello").unwrap();
        let rx = manager.take_receiver();
        let (_, first) = rx.try_recv().unwrap();
        assert!(matches!(first, Command::Create(_)));
        let (_, second) = rx.try_recv().unwrap();
        assert!(matches!(second, Command::LoadUrl(ref u) if u == "https://example.com"));
        let (_, third) = rx.try_recv().unwrap();
        assert!(matches!(third, Command::SetTitle(ref t) if t == "hello"));
    }
}
