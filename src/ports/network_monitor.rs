/// Reports network-availability transitions so the engine can invalidate
/// its PAC cache. `force_online` bypasses this entirely (see `EngineOptions`).
pub trait NetworkMonitor: Send + Sync {
    fn is_online(&self) -> bool;

    /// Edge-triggered: returns true the first time this is called after a
    /// down-then-up transition was observed, then resets until the next
    /// one. Lets a background poller (run independently of `get_proxies`
    /// calls) surface a transition the engine would otherwise miss if no
    /// call happened to land while the network was down. Monitors that
    /// never go offline can leave this at its default.
    fn take_recovered(&self) -> bool {
        false
    }
}
