use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use webviewhost_core::{Channel, ChannelHost, ChannelId, ChannelOptions, KindSchema, SchemaMap, ValueKind};

struct RecordingHost {
    posted: Mutex<Vec<String>>,
    evaluated: Mutex<Vec<String>>,
    message_handler: Mutex<Option<Box<dyn Fn(String, String) + Send + Sync>>>,
    page_load_handler: Mutex<Option<Box<dyn Fn(String) + Send + Sync>>>,
}

impl RecordingHost {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            posted: Mutex::new(Vec::new()),
            evaluated: Mutex::new(Vec::new()),
            message_handler: Mutex::new(None),
            page_load_handler: Mutex::new(None),
        })
    }

    fn deliver(&self, raw: &str, source_url: &str) {
        if let Some(h) = self.message_handler.lock().as_ref() {
            h(raw.to_string(), source_url.to_string());
        }
    }

    fn finish_navigation(&self, url: &str) {
        if let Some(h) = self.page_load_handler.lock().as_ref() {
            h(url.to_string());
        }
    }
}

impl ChannelHost for RecordingHost {
    fn post_message(&self, text: &str) {
        self.posted.lock().push(text.to_string());
    }
    fn evaluate_script(&self, source: &str) {
        self.evaluated.lock().push(source.to_string());
    }
    fn set_message_handler(&self, handler: Box<dyn Fn(String, String) + Send + Sync>) {
        *self.message_handler.lock() = Some(handler);
    }
    fn set_page_load_finished_handler(&self, handler: Box<dyn Fn(String) + Send + Sync>) {
        *self.page_load_handler.lock() = Some(handler);
    }
}

fn ping_schemas() -> SchemaMap {
    let mut m = SchemaMap::new();
    m.insert("ping".to_string(), KindSchema::new(ValueKind::String));
    m
}

#[test]
fn scenario_basic_send_and_receive() {
    let host = RecordingHost::new();
    let channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas: ping_schemas(),
            ..Default::default()
        },
    );

    let received = Arc::new(Mutex::new(None));
    let r = received.clone();
    channel.on_fn("ping", move |p| *r.lock() = Some(p));

    channel.send("ping", Some(&json!("hi")));
    let wire = host.posted.lock()[0].clone();
    host.deliver(&wire, "https://app.local/a");

    assert_eq!(*received.lock(), Some(json!("hi")));
}

#[test]
fn scenario_namespace_rejection() {
    let host = RecordingHost::new();
    let channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas: ping_schemas(),
            channel_id: ChannelId::Literal("ns".to_string()),
            ..Default::default()
        },
    );
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    channel.on_fn("ping", move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    host.deliver(r#"{"$ch":"ping","p":"x"}"#, "https://app.local/");
    assert_eq!(count.load(Ordering::SeqCst), 0);
    host.deliver(r#"{"$ch":"ns:ping","p":"x"}"#, "https://app.local/");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn scenario_origin_rejection_is_case_insensitive() {
    let host = RecordingHost::new();
    let channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas: ping_schemas(),
            trusted_origins: vec!["HTTPS://APP.LOCAL".to_string()],
            ..Default::default()
        },
    );
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    channel.on_fn("ping", move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    host.deliver(r#"{"$ch":"ping","p":"x"}"#, "https://evil.com/");
    assert_eq!(count.load(Ordering::SeqCst), 0);
    host.deliver(r#"{"$ch":"ping","p":"x"}"#, "https://app.local/page");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn scenario_rate_limit_drops_overflow_then_recovers() {
    let host = RecordingHost::new();
    let channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas: ping_schemas(),
            rate_limit: Some(3),
            ..Default::default()
        },
    );
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    channel.on_fn("ping", move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..5 {
        host.deliver(r#"{"$ch":"ping","p":"x"}"#, "https://app.local/");
    }
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn scenario_prototype_pollution_payload_is_sanitized() {
    let host = RecordingHost::new();
    let mut schemas = SchemaMap::new();
    schemas.insert("ping".to_string(), KindSchema::new(ValueKind::Object));
    let channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas,
            ..Default::default()
        },
    );
    let received = Arc::new(Mutex::new(None));
    let r = received.clone();
    channel.on_fn("ping", move |p| *r.lock() = Some(p));

    host.deliver(
        r#"{"$ch":"ping","p":{"x":1,"__proto__":{"polluted":true}}}"#,
        "https://app.local/",
    );
    let v = received.lock().clone().unwrap();
    assert_eq!(v.get("x"), Some(&json!(1)));
    assert!(v.get("__proto__").is_none());
}

#[test]
fn scenario_void_payload_send_omits_p_field() {
    let host = RecordingHost::new();
    let mut schemas = SchemaMap::new();
    schemas.insert("randomize".to_string(), KindSchema::new(ValueKind::Void));
    let channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas,
            ..Default::default()
        },
    );
    channel.send("randomize", None);
    let wire = host.posted.lock()[0].clone();
    assert!(!wire.contains("\"p\""));
}

#[test]
fn reinjection_on_page_load_is_gated_by_trusted_origin() {
    let host = RecordingHost::new();
    let _channel = Channel::new(
        host.clone(),
        ChannelOptions {
            schemas: ping_schemas(),
            trusted_origins: vec!["https://app.local".to_string()],
            ..Default::default()
        },
    );
    // Construction defers injection because trusted_origins is non-empty.
    assert!(host.evaluated.lock().is_empty());

    host.finish_navigation("https://evil.com/");
    assert!(host.evaluated.lock().is_empty());

    host.finish_navigation("https://app.local/next");
    assert_eq!(host.evaluated.lock().len(), 1);
}
