pub mod adapters;
pub mod api;
pub mod dbus;
pub mod domain;
pub mod ports;

pub use domain::{Engine, EngineOptions, IgnorePattern, ProxyError, ProxyUri, Uri};
