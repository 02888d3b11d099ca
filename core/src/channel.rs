//! The typed channel: schema-validated, origin-filtered, rate-limited
//! dispatch over one window's raw IPC bridge.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client_script::{document_start_bundle, ClientScriptOptions};
use crate::envelope::{self, DEFAULT_MAX_MESSAGE_SIZE};
use crate::origin::{self, normalize_origin_set};
use crate::rate_limit::RateLimiter;
use crate::schema::{ParseOutcome, Schema, SchemaMap};
use crate::utils::random_channel_id;

/// Capability a [`Channel`] needs from its window: posting text into the
/// page and re-running script. Desktop provides the implementation backed by
/// wry/tao; core stays free of any platform dependency.
///
/// A `Channel` registers itself as the window's `onMessage` and
/// `onPageLoad` callbacks at construction time - it owns the window's single
/// message/page-load slot for as long as it's attached. Other event kinds
/// (`onClose`, `onResize`, ...) remain free for the host to use directly.
pub trait ChannelHost: Send + Sync {
    /// Post `text` into the page via the injected `__native_message__`
    /// dispatcher. No-op on a closed window.
    fn post_message(&self, text: &str);

    /// Evaluate `source` in the page. No-op on a closed window.
    fn evaluate_script(&self, source: &str);

    /// Register the handler invoked for every inbound page message, with
    /// the reporting frame's source URL. Overwrites any previously
    /// registered message handler on this host.
    fn set_message_handler(&self, handler: Box<dyn Fn(String, String) + Send + Sync>);

    /// Register the handler invoked when a navigation finishes loading,
    /// receiving the new URL. Overwrites any previous handler.
    fn set_page_load_finished_handler(&self, handler: Box<dyn Fn(String) + Send + Sync>);
}

pub struct ChannelOptions {
    pub schemas: SchemaMap,
    pub inject_client: bool,
    pub trusted_origins: Vec<String>,
    pub max_message_size: usize,
    pub rate_limit: Option<u32>,
    pub max_listeners_per_event: Option<usize>,
    pub channel_id: ChannelId,
    pub on_validation_error: Option<Box<dyn Fn(&str, Option<&Value>) + Send + Sync>>,
}

pub enum ChannelId {
    Literal(String),
    Auto,
    None,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            schemas: SchemaMap::new(),
            inject_client: true,
            trusted_origins: Vec::new(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            rate_limit: None,
            max_listeners_per_event: None,
            channel_id: ChannelId::None,
            on_validation_error: None,
        }
    }
}

pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

struct State {
    listeners: std::collections::HashMap<String, Vec<Handler>>,
    rate_limiter: RateLimiter,
}

/// A typed channel bound to one window. Generic over the host's channel
/// capability so desktop's `NativeWindow` can be used without `core`
/// depending on wry/tao.
pub struct Channel<H: ChannelHost> {
    host: Arc<H>,
    schemas: SchemaMap,
    prefix: String,
    trusted_origins: HashSet<String>,
    max_message_size: usize,
    max_listeners_per_event: Option<usize>,
    on_validation_error: Option<Box<dyn Fn(&str, Option<&Value>) + Send + Sync>>,
    state: Mutex<State>,
}

impl<H: ChannelHost + 'static> Channel<H> {
    pub fn new(host: Arc<H>, options: ChannelOptions) -> Arc<Self> {
        let prefix = match options.channel_id {
            ChannelId::Literal(s) => s,
            ChannelId::Auto => random_channel_id(),
            ChannelId::None => String::new(),
        };
        let trusted_origins = normalize_origin_set(options.trusted_origins);

        let this = Arc::new(Self {
            host,
            schemas: options.schemas,
            prefix,
            trusted_origins,
            max_message_size: options.max_message_size,
            max_listeners_per_event: options.max_listeners_per_event,
            on_validation_error: options.on_validation_error,
            state: Mutex::new(State {
                listeners: std::collections::HashMap::new(),
                rate_limiter: RateLimiter::new(options.rate_limit),
            }),
        });

        let dispatch_target = Arc::clone(&this);
        this.host.set_message_handler(Box::new(move |raw, source_url| {
            dispatch_target.handle_incoming(&raw, &source_url, Instant::now());
        }));

        let reinject_target = Arc::clone(&this);
        this.host
            .set_page_load_finished_handler(Box::new(move |url| {
                reinject_target.maybe_inject(&url);
            }));

        if options.inject_client && this.trusted_origins.is_empty() {
            this.inject_client_script();
        }

        this
    }

    fn client_script_options(&self) -> ClientScriptOptions<'_> {
        ClientScriptOptions {
            prefix: &self.prefix,
            max_message_size: self.max_message_size,
        }
    }

    fn inject_client_script(&self) {
        let bundle = document_start_bundle(None, true, true, Some(&self.client_script_options()));
        self.host.evaluate_script(&bundle);
    }

    fn maybe_inject(&self, url: &str) {
        if self.trusted_origins.is_empty() {
            self.inject_client_script();
            return;
        }
        if origin::is_trusted(&self.trusted_origins, url) {
            self.inject_client_script();
        } else {
            debug!(url, "skipping client re-injection for untrusted origin");
        }
    }

    /// Resolved channel id prefix, empty string if none.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Encode and post `type_`/`payload` through the window. Silently
    /// dropped if `type_` isn't a known schema key - outgoing payloads are
    /// not validated, matching the documented defense-in-depth gap.
    pub fn send(&self, type_: &str, payload: Option<&Value>) {
        if !self.schemas.contains_key(type_) {
            warn!(event = type_, "send: unknown event type, dropping");
            return;
        }
        match envelope::encode(&self.prefix, type_, payload) {
            Ok(wire) => self.host.post_message(&wire),
            Err(e) => warn!(error = %e, "failed to encode outgoing envelope"),
        }
    }

    /// Wrap a plain closure for registration. `on`/`off` compare handlers by
    /// `Arc` pointer identity (Rust closures have no other stable identity),
    /// so callers that want `off` to find a handler again must keep the
    /// `Handler` this returns and pass the same `Arc` back in, rather than
    /// constructing a second closure with the same body.
    pub fn wrap<F>(handler: F) -> Handler
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        Arc::new(handler)
    }

    /// Register `handler` for `type_`. Dropped silently if `type_` is
    /// unknown or the per-event listener cap is already reached.
    /// Registering the same `Arc` twice is a no-op (set semantics).
    pub fn on(&self, type_: &str, handler: Handler) {
        if !self.schemas.contains_key(type_) {
            return;
        }
        let mut state = self.state.lock();
        let set = state.listeners.entry(type_.to_string()).or_default();
        if set.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            return;
        }
        if let Some(cap) = self.max_listeners_per_event {
            if set.len() >= cap {
                return;
            }
        }
        set.push(handler);
    }

    /// Convenience wrapper over `on` for call sites that don't need to
    /// remove the handler later.
    pub fn on_fn<F>(&self, type_: &str, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.on(type_, Self::wrap(handler));
    }

    /// Remove `handler` from `type_`'s listener set by pointer identity.
    pub fn off(&self, type_: &str, handler: &Handler) {
        if let Some(set) = self.state.lock().listeners.get_mut(type_) {
            set.retain(|h| !Arc::ptr_eq(h, handler));
        }
    }

    /// Remove every listener on `type_` in one call.
    pub fn off_all(&self, type_: &str) {
        self.state.lock().listeners.remove(type_);
    }

    pub fn listener_count(&self, type_: &str) -> usize {
        self.state
            .lock()
            .listeners
            .get(type_)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    fn handle_incoming(&self, raw: &str, source_url: &str, now: Instant) {
        {
            let mut state = self.state.lock();
            if !state.rate_limiter.allow(now) {
                debug!("dropping message: rate limit exceeded");
                return;
            }
        }

        let Some(env) = envelope::decode(raw, self.max_message_size) else {
            debug!("dropping malformed or oversized envelope");
            return;
        };

        let Some(type_) = envelope::unprefix(&env.ch, &self.prefix) else {
            debug!(ch = %env.ch, "dropping envelope: channel prefix mismatch");
            return;
        };

        if !self.trusted_origins.is_empty() && !origin::is_trusted(&self.trusted_origins, source_url) {
            debug!(source_url, "dropping message: untrusted origin");
            return;
        }

        let handlers = {
            let state = self.state.lock();
            match state.listeners.get(type_) {
                Some(h) if !h.is_empty() => h.clone(),
                _ => return,
            }
        };

        let Some(schema) = self.schemas.get(type_) else {
            debug!(event = type_, "dropping message: not a registered schema key");
            return;
        };

        match schema.safe_parse(env.payload.as_ref()) {
            ParseOutcome::Success(data) => {
                for handler in handlers {
                    let data = data.clone();
                    let result = catch_unwind(AssertUnwindSafe(|| handler(data)));
                    if result.is_err() {
                        warn!(event = type_, "handler panicked; isolated from siblings");
                    }
                }
            }
            ParseOutcome::Failure(reason) => {
                if let Some(cb) = &self.on_validation_error {
                    cb(type_, env.payload.as_ref());
                } else {
                    debug!(event = type_, ?reason, "validation failed, no error callback registered");
                }
            }
        }
    }
}
