//! The cooperative event pump: drains the command queue and runs the native
//! event loop at a fixed cadence.

mod dispatch;
mod handler;
mod user_event;

pub use handler::run;
pub use user_event::UserEvent;
