//! Worker pool configuration.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every worker in a pool. Supplied once at pool startup
/// and never changed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Total build attempts per request, including the first one.
    pub build_attempts: usize,
    /// Fixed delay between consecutive build attempts.
    pub retry_delay: Duration,
    /// Logical package names to always skip, matched case-sensitively
    /// against each node's spec name.
    pub ignored_packages: Vec<String>,
    /// Number of concurrent workers to spawn.
    pub workers: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            build_attempts: 1,
            retry_delay: Duration::from_secs(1),
            ignored_packages: Vec::new(),
            workers: thread::available_parallelism().map(Into::into).unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = WorkerConfig::default();
        assert_eq!(config.build_attempts, 1);
        assert!(config.workers >= 1);
        assert!(config.ignored_packages.is_empty());
    }
}
