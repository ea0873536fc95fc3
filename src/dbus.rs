//! The D-Bus service surface. The original `libproxy` ships this as a
//! GDBus service (`src/libproxy/proxy-dbus.c`); `zbus` is the idiomatic
//! Rust equivalent for exposing a GDBus-compatible bus name/object/
//! interface (see DESIGN.md for the dependency rationale).

use crate::domain::Engine;
use std::sync::Arc;
use zbus::fdo::RequestNameFlags;
use zbus::{connection, interface};

pub const BUS_NAME: &str = "org.libproxy.proxy";
pub const OBJECT_PATH: &str = "/org/libproxy/proxy";
const API_VERSION: &str = "1.0";

pub struct ProxyDbusService {
    engine: Arc<Engine>,
}

impl ProxyDbusService {
    pub fn new(engine: Arc<Engine>) -> ProxyDbusService {
        ProxyDbusService { engine }
    }
}

#[interface(name = "org.libproxy.proxy")]
impl ProxyDbusService {
    /// Returns the same list `Engine::get_proxies` would; unknown methods
    /// are rejected by `zbus`'s own dispatch with `UnknownMethod`, so no
    /// extra handling is needed here.
    async fn query(&self, url: String) -> Vec<String> {
        let proxies = self.engine.get_proxies(&url).await;
        if proxies.is_empty() {
            vec!["direct://".to_string()]
        } else {
            proxies
        }
    }

    #[zbus(property)]
    async fn api_version(&self) -> String {
        API_VERSION.to_string()
    }
}

/// Starts the D-Bus service and blocks for the lifetime of the connection.
/// Returns an error if the bus name cannot be acquired (the caller maps
/// this to exit code 1).
pub async fn run(engine: Arc<Engine>, system_bus: bool, replace: bool) -> Result<(), zbus::Error> {
    let service = ProxyDbusService::new(engine);

    let builder = if system_bus { connection::Builder::system()? } else { connection::Builder::session()? };

    let connection = builder.serve_at(OBJECT_PATH, service)?.build().await?;

    let mut flags = RequestNameFlags::AllowReplacement.into();
    if replace {
        flags |= RequestNameFlags::ReplaceExisting;
    }

    connection.request_name_with_flags(BUS_NAME, flags).await?;

    log::info!("pxresolved listening on {} ({})", BUS_NAME, if system_bus { "system bus" } else { "session bus" });

    std::future::pending::<()>().await;
    Ok(())
}
