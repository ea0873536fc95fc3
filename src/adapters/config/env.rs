use crate::domain::ignore::{is_ignored, IgnorePattern};
use crate::domain::models::{ConfigCandidate, Priority};
use crate::domain::uri::Uri;
use crate::ports::ConfigSource;
use async_trait::async_trait;

/// Reads `no_proxy`/`http_proxy`/`https_proxy`/`ftp_proxy` (and their
/// upper-case variants) the way `config-env.c`'s `px_config_env_get_config`
/// does: `no_proxy` is consulted first and, if it matches, the source
/// yields no candidate at all for this destination.
#[derive(Debug, Default)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    pub fn new() -> EnvConfigSource {
        EnvConfigSource
    }
}

fn env_var(name: &str, upper: &str) -> Option<String> {
    std::env::var(name).ok().or_else(|| std::env::var(upper).ok())
}

#[async_trait]
impl ConfigSource for EnvConfigSource {
    fn name(&self) -> &'static str {
        "env"
    }

    fn priority(&self) -> Priority {
        Priority::First
    }

    async fn get_config(&self, dest: &Uri) -> Vec<ConfigCandidate> {
        if let Some(no_proxy) = env_var("no_proxy", "NO_PROXY") {
            let patterns: Vec<IgnorePattern> = no_proxy.split(',').map(|p| p.trim()).filter(|p| !p.is_empty()).map(IgnorePattern::parse).collect();
            if is_ignored(dest, &patterns) {
                return Vec::new();
            }
        }

        let proxy = match dest.scheme() {
            "ftp" => env_var("ftp_proxy", "FTP_PROXY"),
            "https" => env_var("https_proxy", "HTTPS_PROXY"),
            _ => None,
        }
        .or_else(|| env_var("http_proxy", "HTTP_PROXY"));

        match proxy {
            Some(p) => vec![normalize_proxy_string(&p)],
            None => Vec::new(),
        }
    }
}

/// `http_proxy`-style env values are often bare `host:port` without a
/// scheme; default them to `http://` the way the original's consumers do.
fn normalize_proxy_string(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in ["no_proxy", "NO_PROXY", "http_proxy", "HTTP_PROXY", "https_proxy", "HTTPS_PROXY", "ftp_proxy", "FTP_PROXY"] {
            std::env::remove_var(key);
        }
    }

    #[tokio::test]
    #[serial]
    async fn no_vars_set_yields_nothing() {
        clear_env();
        let source = EnvConfigSource::new();
        let dest = Uri::parse("http://www.example.com").unwrap();
        assert!(source.get_config(&dest).await.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn http_proxy_applies_to_http() {
        clear_env();
        std::env::set_var("http_proxy", "http://127.0.0.1:8080");
        let source = EnvConfigSource::new();
        let dest = Uri::parse("http://www.example.com").unwrap();
        assert_eq!(source.get_config(&dest).await, vec!["http://127.0.0.1:8080"]);
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn no_proxy_suppresses_candidate() {
        clear_env();
        std::env::set_var("https_proxy", "http://127.0.0.1:8080");
        std::env::set_var("no_proxy", "www.example.com");
        let source = EnvConfigSource::new();
        let dest = Uri::parse("https://www.example.com").unwrap();
        assert!(source.get_config(&dest).await.is_empty());
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn no_proxy_cidr_suppresses_candidate() {
        clear_env();
        std::env::set_var("http_proxy", "http://127.0.0.1:8080");
        std::env::set_var("no_proxy", "127.0.0.0/24");
        let source = EnvConfigSource::new();
        let dest = Uri::parse("http://127.0.0.1").unwrap();
        assert!(source.get_config(&dest).await.is_empty());
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn bare_host_port_defaults_to_http_scheme() {
        clear_env();
        std::env::set_var("http_proxy", "127.0.0.1:8080");
        let source = EnvConfigSource::new();
        let dest = Uri::parse("http://www.example.com").unwrap();
        assert_eq!(source.get_config(&dest).await, vec!["http://127.0.0.1:8080"]);
        clear_env();
    }
}
