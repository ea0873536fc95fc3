use std::fmt;

#[derive(Debug, Clone)]
#[allow(dead_code)] // Some variants surface only through specific adapters
pub enum ProxyError {
    InvalidUri(String),
    MissingHost,
    ConfigUnavailable(String),
    DownloadFailed(String),
    PacCompileFailed(String),
    PacRunFailed(String),
    NetworkDown,
    Unknown(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::InvalidUri(msg) => write!(f, "Invalid URI: {}", msg),
            ProxyError::MissingHost => write!(f, "Missing host in URI"),
            ProxyError::ConfigUnavailable(msg) => write!(f, "Config source unavailable: {}", msg),
            ProxyError::DownloadFailed(msg) => write!(f, "PAC download failed: {}", msg),
            ProxyError::PacCompileFailed(msg) => write!(f, "PAC compile failed: {}", msg),
            ProxyError::PacRunFailed(msg) => write!(f, "PAC evaluation failed: {}", msg),
            ProxyError::NetworkDown => write!(f, "Network is not available"),
            ProxyError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}

pub type Result<T> = std::result::Result<T, ProxyError>;
