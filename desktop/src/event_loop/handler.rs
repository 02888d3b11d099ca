//! The pump: a `tao` event loop run at a ~16ms cadence, draining the
//! command queue once per tick and letting the native event loop dispatch
//! whatever engine callbacks are pending.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tao::platform::run_return::EventLoopExtRunReturn;
use tracing::info;

use crate::error::Result;
use crate::event_loop::dispatch::{close_window, dispatch_command};
use crate::event_loop::UserEvent;
use crate::window_manager::WindowManager;

const TICK: Duration = Duration::from_millis(16);

/// Runs the pump until every window has closed. Blocking; intended to be
/// called once, from the process's main thread.
pub fn run(manager: Arc<WindowManager>) -> Result<()> {
    #[cfg(target_os = "windows")]
    let mut event_loop = {
        use tao::platform::windows::EventLoopBuilderExtWindows;
        EventLoopBuilder::<UserEvent>::with_user_event()
            .with_any_thread(true)
            .build()
    };

    #[cfg(not(target_os = "windows"))]
    let mut event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    manager.set_proxy(event_loop.create_proxy());
    let receiver = manager.take_receiver();

    info!("starting event pump");

    event_loop.run_return(move |event, target, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + TICK);

        match event {
            Event::WindowEvent {
                window_id,
                event: window_event,
                ..
            } => {
                if let Some(id) = manager.resolve_native_id(window_id) {
                    handle_window_event(&manager, id, window_event);
                }
            }
            Event::UserEvent(UserEvent::WakeUp) => {}
            _ => {}
        }

        while let Ok((id, command)) = receiver.try_recv() {
            dispatch_command(&manager, id, command, target);
        }

        if manager.count() == 0 {
            *control_flow = ControlFlow::Exit;
        }
    });

    info!("event pump exited");
    Ok(())
}

fn handle_window_event(manager: &Arc<WindowManager>, id: crate::window_manager::WindowId, event: WindowEvent) {
    let Some(entry) = manager.entry(id) else {
        return;
    };
    match event {
        WindowEvent::CloseRequested => close_window(manager, id),
        WindowEvent::Resized(size) => {
            if let Some(cb) = entry.handlers.lock().on_resize.as_ref() {
                cb(size.width, size.height);
            }
        }
        WindowEvent::Moved(pos) => {
            if let Some(cb) = entry.handlers.lock().on_move.as_ref() {
                cb(pos.x, pos.y);
            }
        }
        WindowEvent::Focused(focused) => {
            let handlers = entry.handlers.lock();
            if focused {
                if let Some(cb) = handlers.on_focus.as_ref() {
                    cb();
                }
            } else if let Some(cb) = handlers.on_blur.as_ref() {
                cb();
            }
        }
        _ => {}
    }
}
