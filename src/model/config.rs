use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration from board.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds before a cached view is treated as stale
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound on live cache entries
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Samples kept per operation
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            enabled: true,
            max_samples: default_max_samples(),
        }
    }
}

/// What the batch processor does with an item whose transform failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Substitute the unprocessed input and record the failure
    #[default]
    KeepOriginal,
    /// Abort on the first failure
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub policy: BatchPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            batch_size: default_batch_size(),
            policy: BatchPolicy::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> usize {
    200
}

fn default_max_samples() -> usize {
    100
}

fn default_batch_size() -> usize {
    50
}
