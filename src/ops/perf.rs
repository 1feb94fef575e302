use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::model::config::MonitorConfig;

/// Aggregate over the retained samples of one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpSummary {
    pub op: String,
    /// Samples currently retained
    pub count: usize,
    /// Samples ever recorded, including ones rotated out
    pub total: u64,
    pub mean: Duration,
    pub max: Duration,
    pub p95: Duration,
    pub last: Duration,
}

#[derive(Debug, Default)]
struct OpSamples {
    samples: VecDeque<Duration>,
    total: u64,
}

/// Ring buffers of operation timings, for diagnostics
#[derive(Debug)]
pub struct PerformanceMonitor {
    enabled: bool,
    max_samples: usize,
    ops: HashMap<String, OpSamples>,
}

impl PerformanceMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        PerformanceMonitor {
            enabled: config.enabled,
            max_samples: config.max_samples.max(1),
            ops: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, op: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        let entry = self.ops.entry(op.to_string()).or_default();
        if entry.samples.len() == self.max_samples {
            entry.samples.pop_front();
        }
        entry.samples.push_back(elapsed);
        entry.total += 1;
    }

    /// Run `f`, recording how long it took under `op`.
    pub fn measure<T>(&mut self, op: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(op, start.elapsed());
        out
    }

    pub fn summary(&self, op: &str) -> Option<OpSummary> {
        let entry = self.ops.get(op)?;
        let last = *entry.samples.back()?;
        let count = entry.samples.len();
        let sum: Duration = entry.samples.iter().sum();

        let mut sorted: Vec<Duration> = entry.samples.iter().copied().collect();
        sorted.sort_unstable();
        // Nearest-rank percentile
        let rank = (count * 95).div_ceil(100).max(1);

        Some(OpSummary {
            op: op.to_string(),
            count,
            total: entry.total,
            mean: sum / count as u32,
            max: sorted[count - 1],
            p95: sorted[rank - 1],
            last,
        })
    }

    /// Every recorded operation, sorted by name
    pub fn summaries(&self) -> Vec<OpSummary> {
        let mut names: Vec<&String> = self.ops.keys().collect();
        names.sort();
        names.into_iter().filter_map(|op| self.summary(op)).collect()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}
