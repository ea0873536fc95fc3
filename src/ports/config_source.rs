use crate::domain::models::{ConfigCandidate, Priority};
use crate::domain::uri::Uri;
use async_trait::async_trait;

/// One OS/desktop proxy configuration mechanism (environment variables,
/// GSettings, `kioslaverc`, `SCDynamicStore`, the Windows registry, and so
/// on). Implementations outside this crate's core are expected; only the
/// `env` and `static_list` adapters ship here.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> Priority {
        Priority::Default
    }

    /// Whether this source should be consulted at all in the current
    /// environment (e.g. desktop-session gating via `XDG_CURRENT_DESKTOP`).
    fn is_available(&self) -> bool {
        true
    }

    /// Candidate instructions for `dest`, in the order the engine should
    /// try them. An empty vec means "no opinion, defer to lower-priority
    /// sources".
    async fn get_config(&self, dest: &Uri) -> Vec<ConfigCandidate>;
}
