use super::models::ConfigCandidate;
use super::pac_response::parse_pac_response;
use super::uri::Uri;
use crate::ports::{ConfigSource, NetworkMonitor, PacDownloader, PacRuntime};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Construction-time options for [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Restrict config enumeration to a single named source. Falls back to
    /// `PX_FORCE_CONFIG` when unset, else all sources are consulted.
    pub config_plugin: Option<String>,
    /// Opaque per-source parameter (e.g. a path for a file-backed source).
    pub config_option: Option<String>,
    /// Skip the network monitor and treat the network as always available.
    pub force_online: bool,
}

/// The PAC cache, guarded by the engine mutex alongside the runtime and
/// config sources.
#[derive(Debug, Default)]
struct PacState {
    wpad_active: bool,
    pac_source_uri: Option<String>,
    pac_bytes: Option<Vec<u8>>,
}

impl PacState {
    fn clear(&mut self) {
        self.wpad_active = false;
        self.pac_source_uri = None;
        self.pac_bytes = None;
    }
}

struct EngineState {
    sources: Vec<Box<dyn ConfigSource>>,
    runtime: Box<dyn PacRuntime>,
    pac_state: PacState,
}

/// The thread-safe resolution engine: the core orchestrator. One mutex
/// guards the PAC cache, the PAC runtime, and the config source instances
/// for the full duration of a `get_proxies` call.
pub struct Engine {
    state: Mutex<EngineState>,
    downloader: Arc<dyn PacDownloader>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    config_plugin: Option<String>,
    force_online: bool,
}

impl Engine {
    /// Production constructor: wires the real adapters (env config source,
    /// reqwest downloader, boa PAC runtime, polling network monitor).
    pub fn new(options: EngineOptions) -> Engine {
        let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(crate::adapters::config::env::EnvConfigSource::new())];
        if let Some(option) = &options.config_option {
            sources.push(Box::new(crate::adapters::config::static_list::StaticConfigSource::from_config_option(option)));
        }
        let downloader = Arc::new(crate::adapters::downloader::reqwest_downloader::ReqwestPacDownloader::new());
        let runtime: Box<dyn PacRuntime> = Box::new(crate::adapters::pac_runtime::boa_runtime::BoaPacRuntime::new());
        let network_monitor: Option<Arc<dyn NetworkMonitor>> =
            if options.force_online { None } else { Some(Arc::new(crate::adapters::network::polling::PollingNetworkMonitor::start())) };

        Engine::from_parts(options, sources, downloader, runtime, network_monitor)
    }

    /// Dependency-injected constructor, used by tests and by callers that
    /// want to supply mock `ConfigSource`/`PacDownloader`/`PacRuntime`
    /// implementations.
    pub fn from_parts(
        options: EngineOptions,
        sources: Vec<Box<dyn ConfigSource>>,
        downloader: Arc<dyn PacDownloader>,
        runtime: Box<dyn PacRuntime>,
        network_monitor: Option<Arc<dyn NetworkMonitor>>,
    ) -> Engine {
        let config_plugin = options.config_plugin.or_else(|| std::env::var("PX_FORCE_CONFIG").ok());

        // Stable sort: ties keep registration order.
        let mut sources = sources;
        sources.sort_by_key(|s| s.priority());

        Engine {
            state: Mutex::new(EngineState {
                sources,
                runtime,
                pac_state: PacState::default(),
            }),
            downloader,
            network_monitor,
            config_plugin,
            force_online: options.force_online,
        }
    }

    /// Returns the ordered list of proxy URIs to use for `url`. Always
    /// returns at least one entry; never panics.
    pub async fn get_proxies(&self, url: &str) -> Vec<String> {
        let dest = match Uri::parse(url) {
            Ok(u) => u,
            Err(_) => return vec!["direct://".to_string()],
        };

        let online = self.is_online();
        // Edge-triggered: true once per down-then-up cycle, even if no
        // call happened to land while the network was actually down.
        let recovered = self.network_monitor.as_ref().map(|m| m.take_recovered()).unwrap_or(false);

        let mut state = self.state.lock().await;

        if !online {
            state.pac_state.clear();
            return vec!["direct://".to_string()];
        }

        if recovered {
            state.pac_state.clear();
        }

        self.resolve_locked(&dest, &mut state).await
    }

    /// Raw candidates before PAC/WPAD expansion — used by tests and by the
    /// D-Bus/CLI debug surface.
    pub async fn get_configuration(&self, url: &str) -> Vec<String> {
        let dest = match Uri::parse(url) {
            Ok(u) => u,
            Err(_) => return Vec::new(),
        };

        let state = self.state.lock().await;
        self.collect_candidates(&dest, &state).await
    }

    fn is_online(&self) -> bool {
        if self.force_online {
            return true;
        }
        match &self.network_monitor {
            Some(monitor) => monitor.is_online(),
            None => true,
        }
    }

    fn source_enabled(&self, source: &dyn ConfigSource) -> bool {
        match &self.config_plugin {
            Some(name) => name == source.name(),
            None => true,
        }
    }

    async fn collect_candidates(&self, dest: &Uri, state: &EngineState) -> Vec<ConfigCandidate> {
        let mut candidates = Vec::new();
        for source in &state.sources {
            if !self.source_enabled(source.as_ref()) || !source.is_available() {
                continue;
            }
            candidates.extend(source.get_config(dest).await);
        }
        candidates
    }

    async fn resolve_locked(&self, dest: &Uri, state: &mut EngineState) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        let candidates = self.collect_candidates(dest, state).await;

        for candidate in candidates {
            if candidate == "wpad://" {
                self.apply_wpad(dest, state, &mut result).await;
            } else if candidate.starts_with("pac+") {
                self.apply_pac(dest, &candidate, state, &mut result).await;
            } else if let Some(proxy) = super::models::ProxyUri::parse(&candidate) {
                push_unique(&mut result, proxy.as_str().to_string());
            }
            // Any other scheme is unrecognized and skipped.
        }

        if result.is_empty() {
            result.push("direct://".to_string());
        }
        result
    }

    async fn apply_wpad(&self, dest: &Uri, state: &mut EngineState, result: &mut Vec<String>) {
        const WPAD_URI: &str = "http://wpad/wpad.dat";

        if !state.pac_state.wpad_active {
            state.pac_state.clear();
            state.pac_state.wpad_active = true;
        }

        if state.pac_state.pac_bytes.is_none() {
            match self.downloader.download(WPAD_URI).await {
                Ok(bytes) => {
                    state.pac_state.pac_source_uri = Some(WPAD_URI.to_string());
                    state.pac_state.pac_bytes = Some(bytes);
                }
                Err(e) => {
                    log::debug!("WPAD discovery at {} failed: {}", WPAD_URI, e);
                    state.pac_state.clear();
                    return;
                }
            }
        }

        self.run_cached_pac(dest, state, result);
    }

    async fn apply_pac(&self, dest: &Uri, candidate: &str, state: &mut EngineState, result: &mut Vec<String>) {
        state.pac_state.wpad_active = false;

        if state.pac_state.pac_source_uri.as_deref() != Some(candidate) {
            state.pac_state.pac_bytes = None;
            state.pac_state.pac_source_uri = None;
        }

        if state.pac_state.pac_bytes.is_none() {
            match self.downloader.download(candidate).await {
                Ok(bytes) => {
                    state.pac_state.pac_source_uri = Some(candidate.to_string());
                    state.pac_state.pac_bytes = Some(bytes);
                }
                Err(e) => {
                    log::debug!("PAC download {} failed: {}", candidate, e);
                    state.pac_state.clear();
                    return;
                }
            }
        }

        self.run_cached_pac(dest, state, result);
    }

    fn run_cached_pac(&self, dest: &Uri, state: &mut EngineState, result: &mut Vec<String>) {
        let bytes = match &state.pac_state.pac_bytes {
            Some(b) => b.clone(),
            None => return,
        };

        if !state.runtime.set_pac(&bytes) {
            state.pac_state.clear();
            return;
        }

        let response = state.runtime.run(dest);
        for proxy in parse_pac_response(&response) {
            if let Some(proxy) = super::models::ProxyUri::parse(&proxy) {
                push_unique(result, proxy.as_str().to_string());
            }
        }
    }
}

fn push_unique(result: &mut Vec<String>, value: String) {
    if !result.contains(&value) {
        result.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{ProxyError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        candidates: Vec<String>,
    }

    #[async_trait]
    impl ConfigSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn get_config(&self, _dest: &Uri) -> Vec<ConfigCandidate> {
            self.candidates.clone()
        }
    }

    struct EmptySource;

    #[async_trait]
    impl ConfigSource for EmptySource {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn get_config(&self, _dest: &Uri) -> Vec<ConfigCandidate> {
            Vec::new()
        }
    }

    struct FailingDownloader;

    #[async_trait]
    impl PacDownloader for FailingDownloader {
        async fn download(&self, uri: &str) -> Result<Vec<u8>> {
            Err(ProxyError::DownloadFailed(uri.to_string()))
        }
    }

    struct ScriptedDownloader {
        body: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PacDownloader for ScriptedDownloader {
        async fn download(&self, _uri: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    struct ScriptedRuntime {
        response: &'static str,
    }

    impl PacRuntime for ScriptedRuntime {
        fn set_pac(&mut self, _pac_bytes: &[u8]) -> bool {
            true
        }

        fn run(&mut self, _dest: &Uri) -> String {
            self.response.to_string()
        }
    }

    struct AlwaysOffline;
    impl NetworkMonitor for AlwaysOffline {
        fn is_online(&self) -> bool {
            false
        }
    }

    struct Toggle {
        online: std::sync::atomic::AtomicBool,
        recovered: std::sync::atomic::AtomicBool,
    }
    impl NetworkMonitor for Toggle {
        fn is_online(&self) -> bool {
            self.online.load(Ordering::SeqCst)
        }

        fn take_recovered(&self) -> bool {
            self.recovered.swap(false, Ordering::SeqCst)
        }
    }

    fn engine_with(sources: Vec<Box<dyn ConfigSource>>, downloader: Arc<dyn PacDownloader>, runtime: Box<dyn PacRuntime>) -> Engine {
        Engine::from_parts(EngineOptions { force_online: true, ..Default::default() }, sources, downloader, runtime, None)
    }

    #[tokio::test]
    async fn no_sources_yields_direct() {
        let engine = engine_with(vec![Box::new(EmptySource)], Arc::new(FailingDownloader), Box::new(ScriptedRuntime { response: "" }));
        assert_eq!(engine.get_proxies("https://example.com").await, vec!["direct://"]);
    }

    #[tokio::test]
    async fn new_wires_config_option_into_a_static_source() {
        let engine = Engine::new(EngineOptions {
            config_plugin: Some("static".to_string()),
            config_option: Some("http://127.0.0.1:9999".to_string()),
            force_online: true,
        });
        assert_eq!(engine.get_proxies("https://example.com").await, vec!["http://127.0.0.1:9999".to_string()]);
    }

    #[tokio::test]
    async fn manual_candidate_passes_through() {
        let engine = engine_with(
            vec![Box::new(StaticSource { candidates: vec!["http://127.0.0.1:8080".to_string()] })],
            Arc::new(FailingDownloader),
            Box::new(ScriptedRuntime { response: "" }),
        );
        assert_eq!(engine.get_proxies("http://www.example.com").await, vec!["http://127.0.0.1:8080"]);
    }

    #[tokio::test]
    async fn pac_candidate_is_downloaded_and_evaluated() {
        let downloader = Arc::new(ScriptedDownloader { body: "function FindProxyForURL(url, host) { return 'SOCKS5 127.0.0.1:1983'; }", calls: AtomicUsize::new(0) });
        let engine = engine_with(
            vec![Box::new(StaticSource { candidates: vec!["pac+http://pacserver/test.pac".to_string()] })],
            downloader,
            Box::new(ScriptedRuntime { response: "SOCKS5 127.0.0.1:1983" }),
        );
        let proxies = engine.get_proxies("https://192.168.10.7").await;
        assert_eq!(proxies, vec!["socks5://127.0.0.1:1983"]);
    }

    #[tokio::test]
    async fn pac_download_failure_skips_candidate() {
        let engine = engine_with(
            vec![Box::new(StaticSource { candidates: vec!["pac+http://pacserver/test.pac".to_string()] })],
            Arc::new(FailingDownloader),
            Box::new(ScriptedRuntime { response: "" }),
        );
        assert_eq!(engine.get_proxies("https://example.com").await, vec!["direct://"]);
    }

    #[tokio::test]
    async fn unparseable_url_is_direct() {
        let engine = engine_with(vec![Box::new(EmptySource)], Arc::new(FailingDownloader), Box::new(ScriptedRuntime { response: "" }));
        assert_eq!(engine.get_proxies("not a url").await, vec!["direct://"]);
    }

    #[tokio::test]
    async fn offline_short_circuits_to_direct() {
        let engine = Engine::from_parts(
            EngineOptions::default(),
            vec![Box::new(StaticSource { candidates: vec!["http://127.0.0.1:8080".to_string()] })],
            Arc::new(FailingDownloader),
            Box::new(ScriptedRuntime { response: "" }),
            Some(Arc::new(AlwaysOffline)),
        );
        assert_eq!(engine.get_proxies("http://example.com").await, vec!["direct://"]);
    }

    #[tokio::test]
    async fn network_up_transition_invalidates_cache_even_without_an_offline_call() {
        let downloader = Arc::new(ScriptedDownloader { body: "ignored", calls: AtomicUsize::new(0) });
        let monitor = Arc::new(Toggle {
            online: std::sync::atomic::AtomicBool::new(true),
            recovered: std::sync::atomic::AtomicBool::new(false),
        });
        let engine = Engine::from_parts(
            EngineOptions::default(),
            vec![Box::new(StaticSource { candidates: vec!["pac+http://pacserver/test.pac".to_string()] })],
            downloader.clone(),
            Box::new(ScriptedRuntime { response: "DIRECT" }),
            Some(monitor.clone()),
        );

        engine.get_proxies("https://a.example.com").await;
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);

        // Network drops and recovers between calls; no `get_proxies` call
        // observes the down state directly, only the monitor's own
        // edge-triggered "recovered" flag does.
        monitor.recovered.store(true, Ordering::SeqCst);

        engine.get_proxies("https://b.example.com").await;
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pac_candidate_is_cached_across_calls() {
        let downloader = Arc::new(ScriptedDownloader { body: "ignored", calls: AtomicUsize::new(0) });
        let engine = engine_with(
            vec![Box::new(StaticSource { candidates: vec!["pac+http://pacserver/test.pac".to_string()] })],
            downloader.clone(),
            Box::new(ScriptedRuntime { response: "DIRECT" }),
        );
        engine.get_proxies("https://a.example.com").await;
        engine.get_proxies("https://b.example.com").await;
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }
}
