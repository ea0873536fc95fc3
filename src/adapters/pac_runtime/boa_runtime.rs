use crate::domain::uri::Uri;
use crate::ports::PacRuntime;
use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction, Source};
use std::net::ToSocketAddrs;

const PAC_UTILS: &str = include_str!("../../../pac_utils.js");

/// Evaluates PAC scripts with `boa_engine`, a pure-Rust JS interpreter.
/// Grounded on `adapters/pac_resolver/pac_evaluator.rs`'s `evaluate_pac`,
/// which builds a fresh `Context::default()` per call and never persists
/// it on struct state — the same shape is used here so the runtime stays
/// trivially `Send` (it owns only the PAC source text, never a live
/// `Context`).
#[derive(Debug, Default)]
pub struct BoaPacRuntime {
    pac_source: Option<String>,
}

impl BoaPacRuntime {
    pub fn new() -> BoaPacRuntime {
        BoaPacRuntime::default()
    }
}

fn build_context() -> Context {
    let mut context = Context::default();
    let _ = context.register_global_builtin_callable(js_string!("dnsResolve"), 1, NativeFunction::from_fn_ptr(dns_resolve));
    let _ = context.register_global_builtin_callable(js_string!("myIpAddress"), 0, NativeFunction::from_fn_ptr(my_ip_address));
    let _ = context.register_global_builtin_callable(js_string!("alert"), 1, NativeFunction::from_fn_ptr(alert));
    context
}

fn install(context: &mut Context, pac_source: &str) -> bool {
    context.eval(Source::from_bytes(PAC_UTILS)).is_ok() && context.eval(Source::from_bytes(pac_source)).is_ok()
}

fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n").replace('\r', "\\r").replace('\t', "\\t")
}

/// `getaddrinfo`-style lookup: resolve `host`, return the first address as
/// text, or `null` on failure.
fn resolve_host(host: &str) -> Option<String> {
    (host, 0).to_socket_addrs().ok().and_then(|mut addrs| addrs.next()).map(|addr| addr.ip().to_string())
}

fn dns_resolve(_this: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    let host = match args.first().and_then(|v| v.as_string()) {
        Some(s) => s.to_std_string_escaped(),
        None => return Ok(JsValue::null()),
    };

    match resolve_host(&host) {
        Some(addr) => Ok(JsValue::from(js_string!(addr))),
        None => Ok(JsValue::null()),
    }
}

fn my_ip_address(_this: &JsValue, _args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    let hostname = gethostname::gethostname().to_string_lossy().to_string();
    match resolve_host(&hostname) {
        Some(addr) => Ok(JsValue::from(js_string!(addr))),
        None => Ok(JsValue::null()),
    }
}

fn alert(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if std::env::var_os("PX_DEBUG_PACALERT").is_some() {
        if let Some(msg) = args.first() {
            if let Ok(text) = msg.to_string(context) {
                eprintln!("pac alert: {}", text.to_std_string_escaped());
            }
        }
    }
    Ok(JsValue::undefined())
}

impl PacRuntime for BoaPacRuntime {
    fn set_pac(&mut self, pac_bytes: &[u8]) -> bool {
        let source = match std::str::from_utf8(pac_bytes) {
            Ok(s) => s.to_string(),
            Err(e) => {
                log::warn!("PAC script is not valid UTF-8: {}", e);
                return false;
            }
        };

        let mut context = build_context();
        if !install(&mut context, &source) {
            log::warn!("PAC script failed to compile");
            return false;
        }

        self.pac_source = Some(source);
        true
    }

    fn run(&mut self, dest: &Uri) -> String {
        let source = match &self.pac_source {
            Some(s) => s,
            None => return String::new(),
        };

        let mut context = build_context();
        if !install(&mut context, source) {
            log::warn!("PAC script failed to re-install before evaluation");
            return String::new();
        }

        let call = format!(
            "FindProxyForURL('{}', '{}')",
            escape_js_string(&dest.to_string()),
            escape_js_string(dest.host())
        );

        let result = match context.eval(Source::from_bytes(&call)) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("FindProxyForURL evaluation failed for {}: {}", dest, e);
                return String::new();
            }
        };

        match result.as_string() {
            Some(s) => {
                let text = s.to_std_string_escaped();
                if text == "undefined" {
                    String::new()
                } else {
                    text
                }
            }
            None => String::new(),
        }
    }
}
