use clap::Parser;
use log::error;
use pxresolve::domain::EngineOptions;
use pxresolve::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
struct ProxyConfig {
    #[serde(default)]
    system_bus: bool,
    #[serde(default)]
    config_plugin: Option<String>,
    #[serde(default)]
    config_option: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { system_bus: false, config_plugin: None, config_option: None }
    }
}

#[derive(Parser, Debug)]
#[clap(version = env!("PXRESOLVE_VERSION"), author = env!("CARGO_PKG_AUTHORS"))]
struct Opts {
    /// Take ownership of the D-Bus name from any existing owner.
    #[clap(long)]
    replace: bool,
    /// Attach to the system bus instead of the session bus.
    #[clap(long)]
    system: bool,
    /// Restrict config enumeration to a single named source.
    #[clap(long)]
    config_plugin: Option<String>,
    /// Opaque per-source parameter, e.g. a path for a file-backed source.
    #[clap(long)]
    config_option: Option<String>,
    /// Resolve a single URL and print the proxies to stdout, instead of
    /// starting the D-Bus service.
    #[clap(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = confy::load::<ProxyConfig>("pxresolve", "pxresolve")?;
    env_logger::init();

    if std::env::var_os("PX_DEBUG").is_some() {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let args = Opts::parse();

    let options = EngineOptions {
        config_plugin: args.config_plugin.or(cfg.config_plugin),
        config_option: args.config_option.or(cfg.config_option),
        force_online: false,
    };

    let engine = Arc::new(Engine::new(options));

    if let Some(url) = args.query {
        for proxy in engine.get_proxies(&url).await {
            println!("{}", proxy);
        }
        return Ok(());
    }

    let system_bus = args.system || cfg.system_bus;

    if let Err(err) = pxresolve::dbus::run(engine, system_bus, args.replace).await {
        error!("failed to acquire {}: {}", pxresolve::dbus::BUS_NAME, err);
        std::process::exit(1);
    }

    Ok(())
}
