//! Commands enqueued against one window and drained on the UI thread by the
//! event pump. Carries only value data - never a host callback reference.

use crate::config::WindowOptions;

#[derive(Debug, Clone)]
pub enum Command {
    Create(WindowOptions),
    LoadUrl(String),
    LoadHtml(String),
    EvaluateScript(String),
    PostMessage(String),
    SetTitle(String),
    SetSize(u32, u32),
    SetMinSize(u32, u32),
    SetMaxSize(u32, u32),
    SetPosition(i32, i32),
    SetResizable(bool),
    SetDecorations(bool),
    SetAlwaysOnTop(bool),
    Show,
    Hide,
    Close,
    Focus,
    Maximize,
    Minimize,
    Unmaximize,
    Reload,
    GetCookies(Option<String>),
}
