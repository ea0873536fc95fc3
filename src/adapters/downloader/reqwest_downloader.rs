use crate::domain::errors::{ProxyError, Result};
use crate::ports::PacDownloader;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::redirect::Policy;
use std::time::Duration;

/// Default maximum PAC response size.
const DEFAULT_MAX_SIZE: usize = 100 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches PAC scripts over HTTP(S), grounded on `px_manager_pac_download`
/// (`src/backend/px-manager.c`): no proxy for the fetch itself, redirects
/// followed, a connect timeout, and a hard cap on response size.
pub struct ReqwestPacDownloader {
    client: reqwest::Client,
    max_size: usize,
}

impl ReqwestPacDownloader {
    pub fn new() -> ReqwestPacDownloader {
        ReqwestPacDownloader::with_max_size(DEFAULT_MAX_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> ReqwestPacDownloader {
        let client = reqwest::Client::builder()
            .no_proxy()
            .redirect(Policy::limited(10))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("failed to build PAC downloader HTTP client");
        ReqwestPacDownloader { client, max_size }
    }
}

impl Default for ReqwestPacDownloader {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_pac_prefix(uri: &str) -> &str {
    uri.strip_prefix("pac+").unwrap_or(uri)
}

#[async_trait]
impl PacDownloader for ReqwestPacDownloader {
    async fn download(&self, uri: &str) -> Result<Vec<u8>> {
        let target = strip_pac_prefix(uri);
        debug!("Attempting to download PAC file at {}", target);

        let mut response = self
            .client
            .get(target)
            .header("Accept", "application/x-ns-proxy-autoconfig, text/plain")
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to download PAC file at {}: {}", target, e);
                ProxyError::DownloadFailed(format!("{}: {}", target, e))
            })?;

        if !response.status().is_success() {
            warn!("PAC download {} returned HTTP {}", target, response.status());
            return Err(ProxyError::DownloadFailed(format!("{}: HTTP {}", target, response.status())));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_size {
                warn!("PAC download {} declared {} bytes, over the {} byte cap", target, len, self.max_size);
                return Err(ProxyError::DownloadFailed(format!("{}: response too large ({} bytes)", target, len)));
            }
        }

        // Read chunk by chunk rather than `response.bytes()` so a
        // chunked/Content-Length-less response can't buffer past the cap
        // before we ever check its size.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| ProxyError::DownloadFailed(format!("{}: {}", target, e)))? {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_size {
                warn!("PAC download {} exceeded the {} byte cap while streaming", target, self.max_size);
                return Err(ProxyError::DownloadFailed(format!("{}: response exceeded {} bytes", target, self.max_size)));
            }
        }

        info!("Loaded PAC file from {} ({} bytes)", target, body.len());
        Ok(body)
    }
}
