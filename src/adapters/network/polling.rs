use crate::ports::NetworkMonitor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Treats the network as always up. Used when `EngineOptions::force_online`
/// is not set but no richer monitor is wired (tests, minimal deployments).
#[derive(Debug, Default)]
pub struct AlwaysOnlineMonitor;

impl NetworkMonitor for AlwaysOnlineMonitor {
    fn is_online(&self) -> bool {
        true
    }
}

/// Polls the default network interface every 5 seconds, grounded on
/// `GatewayListener` (`adapters/pac_resolver/gateway.rs`): presence of a
/// default interface with a gateway is treated as "online". Tracks
/// down-then-up transitions independently of whether any `get_proxies`
/// call happens to land while the network is down, so the engine can
/// invalidate its PAC cache on the next call regardless of timing.
pub struct PollingNetworkMonitor {
    online: Arc<AtomicBool>,
    recovered: Arc<AtomicBool>,
    handle: tokio::task::JoinHandle<()>,
}

impl PollingNetworkMonitor {
    pub fn start() -> PollingNetworkMonitor {
        let online = Arc::new(AtomicBool::new(probe_online()));
        let recovered = Arc::new(AtomicBool::new(false));
        let online_clone = online.clone();
        let recovered_clone = recovered.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(5)).await;
                let now_online = probe_online();
                let was_online = online_clone.swap(now_online, Ordering::SeqCst);
                if now_online && !was_online {
                    recovered_clone.store(true, Ordering::SeqCst);
                }
            }
        });

        PollingNetworkMonitor { online, recovered, handle }
    }
}

impl Drop for PollingNetworkMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn probe_online() -> bool {
    match netdev::get_default_interface() {
        Ok(iface) => iface.gateway.is_some(),
        Err(e) => {
            log::info!("Failed to detect default interface: {:?}", e);
            false
        }
    }
}

impl NetworkMonitor for PollingNetworkMonitor {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn take_recovered(&self) -> bool {
        self.recovered.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_online_is_always_online() {
        assert!(AlwaysOnlineMonitor.is_online());
    }

    #[test]
    fn always_online_never_reports_recovery() {
        assert!(!AlwaysOnlineMonitor.take_recovered());
    }

    #[tokio::test]
    async fn starts_with_no_pending_recovery() {
        let monitor = PollingNetworkMonitor::start();
        assert!(!monitor.take_recovered());
    }

    #[tokio::test]
    async fn drop_aborts_the_background_poll_task() {
        let monitor = PollingNetworkMonitor::start();
        let abort_handle = monitor.handle.abort_handle();
        drop(monitor);
        tokio::task::yield_now().await;
        assert!(abort_handle.is_finished());
    }

    #[test]
    fn recovery_flag_is_edge_triggered() {
        let recovered = Arc::new(AtomicBool::new(false));
        recovered.store(true, Ordering::SeqCst);
        assert!(recovered.swap(false, Ordering::SeqCst));
        assert!(!recovered.load(Ordering::SeqCst));
    }
}
