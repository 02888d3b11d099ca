//! Generates the document-start client bridge: `window.ipc`,
//! `window.__native_message__`, `window.__channel__`,
//! `window.__native_message_listeners__`, and the internal
//! `window.__native_bridge_installed__` install marker.
//!
//! The template below is an external interface in its own right - tests in
//! this module assert on literal substrings (the `writable:false` descriptor,
//! the captured-prototype locals, the size constant, the `__proto__` strip)
//! because host code and documentation may depend on the exact shape.

use crate::envelope::DEFAULT_MAX_MESSAGE_SIZE;
use crate::json::to_js_literal;

/// Parameters controlling the generated typed-channel portion of the bridge.
/// `prefix` is the resolved channel id (empty string for none).
pub struct ClientScriptOptions<'a> {
    pub prefix: &'a str,
    pub max_message_size: usize,
}

impl Default for ClientScriptOptions<'_> {
    fn default() -> Self {
        Self {
            prefix: "",
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// The base bridge: frozen `ipc.postMessage`, the `__native_message__`
/// dispatcher with its captured-prototype hardening, and the listener
/// registry. Installed once per document, before any page script, regardless
/// of whether a typed channel is attached.
pub fn base_bridge_script() -> String {
    r#"(function () {
  if (window.__native_bridge_installed__) { return; }

  // Capture prototype methods before any page script can tamper with them.
  var _slice = Array.prototype.slice;
  var _filter = Array.prototype.filter;
  var _push = Array.prototype.push;
  var _indexOf = Array.prototype.indexOf;
  var _splice = Array.prototype.splice;
  var _stringify = JSON.stringify;
  var _parse = JSON.parse;
  var _defineProperty = Object.defineProperty;
  var _freeze = Object.freeze;

  var _orig = window.__native_message__ || null;
  var _el = [];

  function _notifyExternal(raw) {
    for (var i = 0; i < _el.length; i++) {
      var claimed;
      try { claimed = _el[i](raw); } catch (e) { claimed = false; }
      if (claimed === true) { return; }
    }
    if (_orig) {
      try { _orig(raw); } catch (e) { /* isolate */ }
    }
  }

  _defineProperty(window, '__native_message__', {
    value: function (raw) { _notifyExternal(raw); },
    writable: false,
    configurable: false,
  });

  var listeners = _freeze({
    add: function (fn) {
      if (typeof fn === 'function') { _push.call(_el, fn); }
    },
    remove: function (fn) {
      var idx = _indexOf.call(_el, fn);
      if (idx !== -1) { _splice.call(_el, idx, 1); }
    },
  });

  _defineProperty(window, '__native_message_listeners__', {
    value: listeners,
    writable: false,
    configurable: false,
  });

  function _post(text) {
    if (window.chrome && window.chrome.webview) {
      window.chrome.webview.postMessage(text);
    } else if (window.webkit && window.webkit.messageHandlers && window.webkit.messageHandlers.ipc) {
      window.webkit.messageHandlers.ipc.postMessage(text);
    }
  }

  var ipc = _freeze({
    postMessage: function (text) { _post(text); },
  });
  _defineProperty(window, 'ipc', { value: ipc, writable: false, configurable: false });

  window.open = function () { return null; };

  _defineProperty(window, '__native_bridge_installed__', {
    value: true,
    writable: false,
    configurable: false,
  });
})();"#
        .to_string()
}

/// Permission shim fragment: removed/guarded navigator entries for flags the
/// window configuration denies.
pub fn permission_shim_script(allow_geolocation: bool, allow_camera_or_mic: bool) -> String {
    let mut out = String::new();
    if !allow_geolocation {
        out.push_str("try { delete navigator.geolocation; } catch (e) {}\n");
    }
    if !allow_camera_or_mic {
        out.push_str(
            "if (navigator.mediaDevices) { navigator.mediaDevices.getUserMedia = function () { return Promise.reject(new Error('permission denied')); }; }\n",
        );
    }
    out
}

/// CSP meta-tag injection fragment, run at the earliest DOM-ready moment.
pub fn csp_script(csp: &str) -> String {
    let literal = to_js_literal(&serde_json::Value::String(csp.to_string()));
    format!(
        r#"(function () {{
  function inject() {{
    var meta = document.createElement('meta');
    meta.setAttribute('http-equiv', 'Content-Security-Policy');
    meta.setAttribute('content', {literal});
    document.head && document.head.appendChild(meta);
  }}
  if (document.head) {{ inject(); }} else {{
    document.addEventListener('DOMContentLoaded', inject, {{ once: true }});
  }}
}})();"#
    )
}

/// The typed-channel client: `__channel__` with `send`/`on`/`off`, wired
/// through `__native_message__`/`__native_message_listeners__` installed by
/// [`base_bridge_script`].
pub fn channel_script(opts: &ClientScriptOptions<'_>) -> String {
    let prefix_literal = to_js_literal(&serde_json::Value::String(opts.prefix.to_string()));
    let max_size = opts.max_message_size;
    format!(
        r#"(function () {{
  if (window.__channel__) {{ return; }}

  var _slice = Array.prototype.slice;
  var _stringify = JSON.stringify;
  var _parse = JSON.parse;
  var _defineProperty = Object.defineProperty;
  var _freeze = Object.freeze;

  var MAX_MESSAGE_SIZE = {max_size};
  var _pfx = {prefix_literal};
  var _l = Object.create(null);

  function _e(t, p) {{
    var ch = _pfx ? (_pfx + ':' + t) : t;
    var env = {{ '$ch': ch }};
    if (typeof p !== 'undefined') {{ env.p = p; }}
    return _stringify(env);
  }}

  function _d(raw) {{
    if (typeof raw !== 'string' || raw.length > MAX_MESSAGE_SIZE) {{ return null; }}
    var value;
    try {{ value = _parse(raw); }} catch (e) {{ return null; }}
    if (value && typeof value === 'object' && Object.prototype.hasOwnProperty.call(value, '__proto__')) {{
      delete value['__proto__'];
    }}
    if (!value || typeof value !== 'object' || typeof value['$ch'] !== 'string') {{ return null; }}
    return value;
  }}

  function _unprefix(ch) {{
    if (!_pfx) {{ return ch; }}
    var want = _pfx + ':';
    if (ch.indexOf(want) !== 0) {{ return null; }}
    return ch.slice(want.length);
  }}

  function dispatch(raw) {{
    var env = _d(raw);
    if (!env) {{ return false; }}
    var name = _unprefix(env['$ch']);
    if (name === null) {{ return false; }}
    var handlers = _l[name];
    if (!handlers || handlers.length === 0) {{ return false; }}
    var snapshot = _slice.call(handlers);
    for (var i = 0; i < snapshot.length; i++) {{
      try {{ snapshot[i](env.p); }} catch (e) {{ /* isolate faulting handler */ }}
    }}
    return true;
  }}

  window.__native_message_listeners__.add(dispatch);

  var channel = {{
    send: function (type, payload) {{
      window.ipc.postMessage(_e(type, payload));
    }},
    on: function (type, handler) {{
      if (!_l[type]) {{ _l[type] = []; }}
      if (_l[type].indexOf(handler) === -1) {{ _l[type].push(handler); }}
    }},
    off: function (type, handler) {{
      if (!_l[type]) {{ return; }}
      var idx = _l[type].indexOf(handler);
      if (idx !== -1) {{ _l[type].splice(idx, 1); }}
    }},
  }};

  _defineProperty(window, '__channel__', {{
    value: _freeze(channel),
    writable: false,
    configurable: false,
  }});
}})();"#
    )
}

/// The full document-start bundle for one window: base bridge, optional CSP
/// and permission shims, and the typed channel client if requested.
pub fn document_start_bundle(
    csp: Option<&str>,
    allow_geolocation: bool,
    allow_camera_or_mic: bool,
    channel: Option<&ClientScriptOptions<'_>>,
) -> String {
    let mut parts = vec![base_bridge_script()];
    if let Some(csp) = csp {
        parts.push(csp_script(csp));
    }
    parts.push(permission_shim_script(allow_geolocation, allow_camera_or_mic));
    if let Some(opts) = channel {
        parts.push(channel_script(opts));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_bridge_freezes_with_nonwritable_descriptor() {
        let s = base_bridge_script();
        assert!(s.contains("writable: false"));
        assert!(s.contains("configurable: false"));
        assert!(s.contains("_defineProperty(window, '__native_message__'"));
        assert!(s.contains("_defineProperty(window, '__native_message_listeners__'"));
    }

    #[test]
    fn base_bridge_captures_prototypes_before_use() {
        let s = base_bridge_script();
        for name in ["_slice", "_push", "_indexOf", "_splice", "_stringify", "_parse"] {
            assert!(s.contains(name), "missing captured prototype local {name}");
        }
    }

    #[test]
    fn base_bridge_overrides_window_open() {
        assert!(base_bridge_script().contains("window.open = function"));
    }

    #[test]
    fn base_bridge_defines_ipc_exactly_once_with_transport_baked_in() {
        let s = base_bridge_script();
        assert_eq!(s.matches("_defineProperty(window, 'ipc'").count(), 1);
        assert!(!s.contains("window.ipc._post"));
        assert!(!s.contains("ipc._post ="));
    }

    #[test]
    fn base_bridge_idempotence_guard_is_independent_of_native_message() {
        // The early-return guard must not key off `window.__native_message__`
        // directly, or `_orig` (captured from that same property) is always
        // null and the fallback-dispatch path is dead.
        let s = base_bridge_script();
        assert!(s.contains("if (window.__native_bridge_installed__) { return; }"));
        assert!(s.contains("var _orig = window.__native_message__ || null;"));
    }

    #[test]
    fn notify_external_stops_at_first_claiming_listener() {
        let s = base_bridge_script();
        assert!(s.contains("if (claimed === true) { return; }"));
    }

    #[test]
    fn channel_script_embeds_size_cap_and_strips_proto() {
        let opts = ClientScriptOptions::default();
        let s = channel_script(&opts);
        assert!(s.contains(&DEFAULT_MAX_MESSAGE_SIZE.to_string()));
        assert!(s.contains("__proto__"));
        assert!(s.contains("writable: false"));
    }

    #[test]
    fn channel_script_dispatch_reports_claim_for_suppression() {
        let opts = ClientScriptOptions::default();
        let s = channel_script(&opts);
        assert!(s.contains("if (!handlers || handlers.length === 0) { return false; }"));
        assert!(s.contains("return true;"));
    }

    #[test]
    fn channel_script_embeds_prefix_literal() {
        let opts = ClientScriptOptions {
            prefix: "ns",
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        };
        let s = channel_script(&opts);
        assert!(s.contains("\"ns\""));
    }

    #[test]
    fn csp_script_embeds_policy_as_safe_literal() {
        let s = csp_script("default-src 'self'");
        assert!(s.contains("Content-Security-Policy"));
        assert!(s.contains("default-src"));
    }

    #[test]
    fn permission_shim_denies_by_default() {
        let s = permission_shim_script(false, false);
        assert!(s.contains("delete navigator.geolocation"));
        assert!(s.contains("getUserMedia"));
    }

    #[test]
    fn permission_shim_omits_when_allowed() {
        let s = permission_shim_script(true, true);
        assert!(!s.contains("delete navigator.geolocation"));
        assert!(!s.contains("getUserMedia"));
    }
}
