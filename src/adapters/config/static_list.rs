use crate::domain::models::{ConfigCandidate, Priority};
use crate::domain::uri::Uri;
use crate::ports::ConfigSource;
use async_trait::async_trait;

/// A config source that always emits the same fixed candidate list,
/// regardless of destination. Used for tests, and for the `config_option`
/// static-override escape hatch.
#[derive(Debug, Clone)]
pub struct StaticConfigSource {
    candidates: Vec<ConfigCandidate>,
    priority: Priority,
}

impl StaticConfigSource {
    pub fn new(candidates: Vec<ConfigCandidate>) -> StaticConfigSource {
        StaticConfigSource { candidates, priority: Priority::Default }
    }

    pub fn with_priority(mut self, priority: Priority) -> StaticConfigSource {
        self.priority = priority;
        self
    }

    /// Parses a `config_option` value of comma-separated candidates into a
    /// source, e.g. `"pac+http://pacserver/test.pac"` or
    /// `"http://127.0.0.1:8080,direct://"`.
    pub fn from_config_option(option: &str) -> StaticConfigSource {
        let candidates = option.split(',').map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect();
        StaticConfigSource::new(candidates)
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    async fn get_config(&self, _dest: &Uri) -> Vec<ConfigCandidate> {
        self.candidates.clone()
    }
}
