//! Process-wide window registry and the command queue every mutating
//! operation flows through. The queue is the only cross-thread
//! synchronization point: any thread may enqueue, but only the event pump
//! (running on the UI thread) ever drains it or touches a platform adapter.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use parking_lot::Mutex;
use tao::event_loop::EventLoopProxy;

use crate::adapter::PlatformAdapter;
use crate::command::Command;
use crate::config::WindowOptions;
use crate::event_loop::UserEvent;
use webviewhost_core::events::PageLoadPhase;

pub type WindowId = u64;

/// Per-window event-handler slots. Each registration method on
/// [`crate::window::NativeWindow`] overwrites the corresponding field; there
/// is exactly one active handler per event at a time.
#[derive(Default)]
pub struct EventHandlers {
    pub on_message: Option<Box<dyn Fn(String, String) + Send + Sync>>,
    pub on_close: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_resize: Option<Box<dyn Fn(u32, u32) + Send + Sync>>,
    pub on_move: Option<Box<dyn Fn(i32, i32) + Send + Sync>>,
    pub on_focus: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_blur: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_page_load: Option<Box<dyn Fn(PageLoadPhase, String) + Send + Sync>>,
    pub on_title_changed: Option<Box<dyn Fn(String) + Send + Sync>>,
    pub on_reload: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_navigation_blocked: Option<Box<dyn Fn(String) + Send + Sync>>,
    pub on_cookies: Option<Box<dyn Fn(String) + Send + Sync>>,
}

pub struct WindowEntry {
    pub options: WindowOptions,
    pub handlers: Mutex<EventHandlers>,
    pub closed: AtomicBool,
    pub adapter: Mutex<Option<Box<dyn PlatformAdapter>>>,
    /// One-shot senders registered by in-flight `getCookies()` calls.
    /// Drained (and cleared) every time a `GetCookies` command completes,
    /// in addition to the standing `on_cookies` handler.
    pub cookie_waiters: Mutex<Vec<std::sync::mpsc::Sender<String>>>,
}

impl WindowEntry {
    fn new(options: WindowOptions) -> Self {
        Self {
            options,
            handlers: Mutex::new(EventHandlers::default()),
            closed: AtomicBool::new(false),
            adapter: Mutex::new(None),
            cookie_waiters: Mutex::new(Vec::new()),
        }
    }
}

/// Owns the registry of live windows and the FIFO command queue. There is
/// one `WindowManager` per process; it is cheap to clone behind an `Arc` and
/// shared between every `NativeWindow` handle.
pub struct WindowManager {
    windows: DashMap<WindowId, Arc<WindowEntry>>,
    next_id: AtomicU64,
    queue_tx: Sender<(WindowId, Command)>,
    queue_rx: Mutex<Option<Receiver<(WindowId, Command)>>>,
    proxy: Mutex<Option<EventLoopProxy<UserEvent>>>,
    /// Maps the OS-level `tao::window::WindowId` back to ours, so the pump
    /// can route `WindowEvent`s (which only carry the native id) to the
    /// right entry.
    native_ids: DashMap<tao::window::WindowId, WindowId>,
}

impl WindowManager {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        Arc::new(Self {
            windows: DashMap::new(),
            next_id: AtomicU64::new(1),
            queue_tx: tx,
            queue_rx: Mutex::new(Some(rx)),
            proxy: Mutex::new(None),
            native_ids: DashMap::new(),
        })
    }

    pub fn register_native_id(&self, native: tao::window::WindowId, id: WindowId) {
        self.native_ids.insert(native, id);
    }

    pub fn resolve_native_id(&self, native: tao::window::WindowId) -> Option<WindowId> {
        self.native_ids.get(&native).map(|r| *r.value())
    }

    pub fn remove_native_id(&self, native: tao::window::WindowId) {
        self.native_ids.remove(&native);
    }

    /// Allocate the next window id and register a (not-yet-built) entry for
    /// it. The id is valid immediately; the underlying platform window is
    /// created asynchronously when the pump drains the paired `Create`
    /// command.
    pub fn allocate(&self, options: WindowOptions) -> WindowId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.windows.insert(id, Arc::new(WindowEntry::new(options)));
        id
    }

    pub fn entry(&self, id: WindowId) -> Option<Arc<WindowEntry>> {
        self.windows.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn is_closed(&self, id: WindowId) -> bool {
        match self.entry(id) {
            Some(e) => e.closed.load(Ordering::SeqCst),
            None => true,
        }
    }

    pub fn mark_closed(&self, id: WindowId) {
        if let Some(e) = self.entry(id) {
            e.closed.store(true, Ordering::SeqCst);
        }
    }

    pub fn remove(&self, id: WindowId) {
        self.windows.remove(&id);
    }

    pub fn count(&self) -> usize {
        self.windows.len()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|r| *r.key()).collect()
    }

    /// Enqueue `command` for `id` and nudge the pump so it doesn't wait a
    /// full tick. Safe to call from any thread, including before the pump
    /// has started (the command is simply drained on first tick).
    pub fn enqueue(&self, id: WindowId, command: Command) {
        let _ = self.queue_tx.send((id, command));
        if let Some(proxy) = self.proxy.lock().as_ref() {
            let _ = proxy.send_event(UserEvent::WakeUp);
        }
    }

    /// Taken once by the pump at startup. Panics on a second call - there is
    /// exactly one pump per manager.
    pub fn take_receiver(&self) -> Receiver<(WindowId, Command)> {
        self.queue_rx
            .lock()
            .take()
            .expect("command queue receiver already taken")
    }

    pub fn set_proxy(&self, proxy: EventLoopProxy<UserEvent>) {
        *self.proxy.lock() = Some(proxy);
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        // `new` returns an `Arc<Self>`; this constructs an unwrapped value
        // for callers that want to own it directly (e.g. tests).
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            windows: DashMap::new(),
            next_id: AtomicU64::new(1),
            queue_tx: tx,
            queue_rx: Mutex::new(Some(rx)),
            proxy: Mutex::new(None),
            native_ids: DashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_assigns_increasing_ids() {
        let mgr = WindowManager::new();
        let a = mgr.allocate(WindowOptions::default());
        let b = mgr.allocate(WindowOptions::default());
        assert!(b > a);
        assert_eq!(mgr.count(), 2);
    }

    #[test]
    fn closed_window_reports_closed_and_drops_after_remove() {
        let mgr = WindowManager::new();
        let id = mgr.allocate(WindowOptions::default());
        assert!(!mgr.is_closed(id));
        mgr.mark_closed(id);
        assert!(mgr.is_closed(id));
        mgr.remove(id);
        assert!(mgr.is_closed(id));
        assert_eq!(mgr.entry(id).is_none(), true);
    }

    #[test]
    fn enqueue_without_proxy_does_not_panic() {
        let mgr = WindowManager::new();
        let id = mgr.allocate(WindowOptions::default());
        mgr.enqueue(id, Command::Show);
        let rx = mgr.take_receiver();
        let (got_id, _cmd) = rx.try_recv().unwrap();
        assert_eq!(got_id, id);
    }
}
