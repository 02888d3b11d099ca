//! Ambient helpers: logging init and a handful of string utilities reused by
//! both the codec and the generated client script.

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initialize the global `tracing` subscriber once per process. Safe to call
/// from multiple crates (desktop init, test setup) - later calls are no-ops.
pub fn init_logging() {
    LOGGING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,webviewhost=info"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    });
}

/// Generate an 8-character alphanumeric nonce for `channelId: "auto"`.
pub fn random_channel_id() -> String {
    use rand::Rng;
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..CHARS.len());
            CHARS[idx] as char
        })
        .collect()
}
