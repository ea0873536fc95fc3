pub mod config_source;
pub mod network_monitor;
pub mod pac_downloader;
pub mod pac_runtime;

pub use config_source::ConfigSource;
pub use network_monitor::NetworkMonitor;
pub use pac_downloader::PacDownloader;
pub use pac_runtime::PacRuntime;
