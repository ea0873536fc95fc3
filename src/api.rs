//! The synchronous, C-style library API: `new_factory` / `get_proxies` /
//! `free_proxies` / `free_factory`. Each call is blocking so the library
//! can be embedded in callers that have no async runtime of their own.

use crate::domain::{Engine, EngineOptions};

/// Opaque handle returned by `new_factory`. Owns both the resolution
/// engine and the Tokio runtime it's driven on.
pub struct Factory {
    engine: Engine,
    runtime: tokio::runtime::Runtime,
}

pub type Handle = Box<Factory>;

/// Builds a resolution engine and the runtime used to drive it
/// synchronously. Panics only if the OS refuses to hand out the threads a
/// `tokio::runtime::Runtime` needs — the same failure mode `main.rs` treats
/// as fatal at startup.
pub fn new_factory(options: EngineOptions) -> Handle {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start proxy resolution runtime");
    // `Engine::new` spawns the background network poller; it needs a runtime
    // context to hand `tokio::spawn` to even though we aren't inside
    // `block_on` yet.
    let _guard = runtime.enter();
    let engine = Engine::new(options);
    drop(_guard);
    Box::new(Factory { engine, runtime })
}

/// Resolves the proxies to use for `url`. Always returns at least one
/// entry; never panics on malformed input.
pub fn get_proxies(handle: &Handle, url: &str) -> Vec<String> {
    handle.runtime.block_on(handle.engine.get_proxies(url))
}

/// Present for parity with the C-style factory/proxies/free trio; a
/// `Vec<String>` already frees itself on drop.
pub fn free_proxies(_proxies: Vec<String>) {}

/// Present for parity with the C-style API; dropping the handle tears down
/// the engine and its runtime.
pub fn free_factory(_handle: Handle) {}
