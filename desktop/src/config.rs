//! `WindowOptions`: the builder-style configuration struct every new window
//! is constructed from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub resizable: bool,
    pub decorations: bool,
    pub transparent: bool,
    pub always_on_top: bool,
    pub visible: bool,
    pub devtools: bool,
    pub csp: Option<String>,
    pub trusted_origins: Vec<String>,
    pub allowed_hosts: Vec<String>,
    pub allow_camera: bool,
    pub allow_microphone: bool,
    pub allow_file_system: bool,
    pub allow_geolocation: bool,
    /// Initial content: exactly one of `url`/`html` is normally set.
    pub url: Option<String>,
    pub html: Option<String>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 800,
            height: 600,
            x: None,
            y: None,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            resizable: true,
            decorations: true,
            transparent: false,
            always_on_top: false,
            visible: true,
            devtools: false,
            csp: None,
            trusted_origins: Vec::new(),
            allowed_hosts: Vec::new(),
            allow_camera: false,
            allow_microphone: false,
            allow_file_system: false,
            allow_geolocation: false,
            url: None,
            html: None,
        }
    }
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = Some(width);
        self.min_height = Some(height);
        self
    }

    pub fn max_size(mut self, width: u32, height: u32) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn decorations(mut self, decorations: bool) -> Self {
        self.decorations = decorations;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn always_on_top(mut self, always_on_top: bool) -> Self {
        self.always_on_top = always_on_top;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn devtools(mut self, devtools: bool) -> Self {
        self.devtools = devtools;
        self
    }

    pub fn csp(mut self, csp: impl Into<String>) -> Self {
        self.csp = Some(csp.into());
        self
    }

    pub fn trusted_origins(mut self, origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.trusted_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_hosts(mut self, hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_camera(mut self, allow: bool) -> Self {
        self.allow_camera = allow;
        self
    }

    pub fn allow_microphone(mut self, allow: bool) -> Self {
        self.allow_microphone = allow;
        self
    }

    pub fn allow_file_system(mut self, allow: bool) -> Self {
        self.allow_file_system = allow;
        self
    }

    pub fn allow_geolocation(mut self, allow: bool) -> Self {
        self.allow_geolocation = allow;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.html = None;
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self.url = None;
        self
    }
}
