//! Applies one drained [`Command`] to its window's platform adapter. Runs
//! exclusively on the UI thread, inside the pump's drain step.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tao::event_loop::EventLoopWindowTarget;
use tracing::{debug, error, warn};

use crate::command::Command;
use crate::event_loop::UserEvent;
use crate::window::builder::build_window;
use crate::window_manager::{WindowId, WindowManager};

pub fn dispatch_command(
    manager: &Arc<WindowManager>,
    id: WindowId,
    command: Command,
    target: &EventLoopWindowTarget<UserEvent>,
) {
    let Some(entry) = manager.entry(id) else {
        debug!(id, "dropping command for unknown window");
        return;
    };

    if let Command::Create(options) = command {
        match build_window(id, Arc::clone(manager), &options, target) {
            Ok(adapter) => {
                manager.register_native_id(adapter.window.id(), id);
                *entry.adapter.lock() = Some(Box::new(adapter));
            }
            Err(e) => {
                error!(id, error = %e, "fatal error creating window");
                entry.closed.store(true, Ordering::SeqCst);
            }
        }
        return;
    }

    if entry.closed.load(Ordering::SeqCst) {
        debug!(id, "dropping command for closed window");
        return;
    }

    if matches!(command, Command::Close) {
        close_window(manager, id);
        return;
    }

    if matches!(command, Command::GetCookies(_)) {
        let Command::GetCookies(url) = command else { unreachable!() };
        let cookies = {
            let guard = entry.adapter.lock();
            guard
                .as_ref()
                .map(|a| a.get_cookies(url.as_deref()))
                .unwrap_or_default()
        };
        let json = serde_json::to_string(&cookies).unwrap_or_else(|_| "[]".to_string());
        if let Some(cb) = entry.handlers.lock().on_cookies.as_ref() {
            cb(json.clone());
        }
        let waiters = std::mem::take(&mut *entry.cookie_waiters.lock());
        for tx in waiters {
            let _ = tx.send(json.clone());
        }
        return;
    }

    let guard = entry.adapter.lock();
    let Some(adapter) = guard.as_ref() else {
        debug!(id, "dropping command: window not yet built");
        return;
    };

    let result = catch_unwind(AssertUnwindSafe(|| apply(adapter.as_ref(), &command)));
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(id, error = %e, "recoverable adapter error"),
        Err(_) => error!(id, "adapter command panicked; pump continues"),
    }
}

fn apply(adapter: &dyn crate::adapter::PlatformAdapter, command: &Command) -> crate::error::Result<()> {
    match command {
        Command::Create(_) | Command::Close | Command::GetCookies(_) => Ok(()),
        Command::LoadUrl(url) => adapter.load_url(url),
        Command::LoadHtml(html) => adapter.load_html(html),
        Command::EvaluateScript(src) => adapter.evaluate_script(src),
        Command::PostMessage(text) => adapter.post_message(text),
        Command::SetTitle(title) => {
            adapter.set_title(title);
            Ok(())
        }
        Command::SetSize(w, h) => {
            adapter.set_size(*w, *h);
            Ok(())
        }
        Command::SetMinSize(w, h) => {
            adapter.set_min_size(*w, *h);
            Ok(())
        }
        Command::SetMaxSize(w, h) => {
            adapter.set_max_size(*w, *h);
            Ok(())
        }
        Command::SetPosition(x, y) => {
            adapter.set_position(*x, *y);
            Ok(())
        }
        Command::SetResizable(v) => {
            adapter.set_resizable(*v);
            Ok(())
        }
        Command::SetDecorations(v) => {
            adapter.set_decorations(*v);
            Ok(())
        }
        Command::SetAlwaysOnTop(v) => {
            adapter.set_always_on_top(*v);
            Ok(())
        }
        Command::Show => {
            adapter.show();
            Ok(())
        }
        Command::Hide => {
            adapter.hide();
            Ok(())
        }
        Command::Focus => {
            adapter.focus();
            Ok(())
        }
        Command::Maximize => {
            adapter.maximize();
            Ok(())
        }
        Command::Minimize => {
            adapter.minimize();
            Ok(())
        }
        Command::Unmaximize => {
            adapter.unmaximize();
            Ok(())
        }
        Command::Reload => adapter.reload(),
    }
}

/// Shared close path for both an explicit `Close` command and an OS
/// `CloseRequested` event: fire `onClose` exactly once, then drop the
/// entry (and with it, the platform adapter and native window).
pub fn close_window(manager: &Arc<WindowManager>, id: WindowId) {
    let Some(entry) = manager.entry(id) else {
        return;
    };
    let already_closed = entry.closed.swap(true, Ordering::SeqCst);
    if !already_closed {
        if let Some(cb) = entry.handlers.lock().on_close.as_ref() {
            cb();
        }
    }
    if let Some(adapter) = entry.adapter.lock().as_ref() {
        manager.remove_native_id(adapter.tao_window_id());
    }
    manager.remove(id);
}
