//! The `tao` user event used solely to wake the pump early when a command is
//! enqueued from a non-UI thread. All actual command data travels through
//! the window manager's command queue, never through this event.

#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
    WakeUp,
}
