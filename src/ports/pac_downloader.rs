use crate::domain::errors::Result;
use async_trait::async_trait;

/// Fetches PAC script bytes. `uri` is the candidate as emitted by a config
/// source (a `pac+` prefix, if present, is the downloader's responsibility
/// to strip before issuing the request).
#[async_trait]
pub trait PacDownloader: Send + Sync {
    async fn download(&self, uri: &str) -> Result<Vec<u8>>;
}
