use serde::Serialize;

use crate::model::task::{Priority, TaskRecord, TaskStatus};
use crate::ops::cache::CacheStats;
use crate::ops::perf::OpSummary;
use crate::util::unicode::fit_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub status: TaskStatus,
    pub count: usize,
    pub tasks: &'a [TaskRecord],
}

#[derive(Serialize)]
pub struct BenchJson<'a> {
    pub iterations: usize,
    pub cache: CacheStats,
    pub hit_rate: f64,
    pub ops: Vec<OpSummaryJson<'a>>,
}

/// Timings as microseconds, for stable machine-readable output
#[derive(Serialize)]
pub struct OpSummaryJson<'a> {
    pub op: &'a str,
    pub count: usize,
    pub total: u64,
    pub mean_us: u128,
    pub p95_us: u128,
    pub max_us: u128,
}

impl<'a> From<&'a OpSummary> for OpSummaryJson<'a> {
    fn from(s: &'a OpSummary) -> Self {
        OpSummaryJson {
            op: &s.op,
            count: s.count,
            total: s.total,
            mean_us: s.mean.as_micros(),
            p95_us: s.p95.as_micros(),
            max_us: s.max.as_micros(),
        }
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "-",
        Priority::Medium => " ",
        Priority::High => "!",
        Priority::Urgent => "!!",
    }
}

/// One task per line: pin, priority, id, title (fitted), tags, due date.
pub fn format_task_line(task: &TaskRecord, title_width: usize) -> String {
    let pin = if task.pinned { "^" } else { " " };
    let mut line = format!(
        "{}{:<2} {:<8} {}",
        pin,
        priority_marker(task.priority),
        task.id,
        fit_to_width(&task.title, title_width)
    );
    for tag in &task.tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    if let Some(due) = task.due {
        line.push_str(&format!(" due {}", due.format("%Y-%m-%d")));
    }
    line.trim_end().to_string()
}

pub fn format_task_list(tasks: &[TaskRecord], title_width: usize) -> String {
    if tasks.is_empty() {
        return "no matching tasks\n".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        out.push_str(&format_task_line(task, title_width));
        out.push('\n');
    }
    out
}

pub fn format_column(status: TaskStatus, tasks: &[TaskRecord], title_width: usize) -> String {
    let mut out = format!("== {} ({}) ==\n", status.label(), tasks.len());
    for task in tasks {
        out.push_str(&format_task_line(task, title_width));
        out.push('\n');
    }
    out
}

pub fn format_bench(iterations: usize, stats: &CacheStats, ops: &[OpSummary]) -> String {
    let mut out = format!("{} iterations\n", iterations);
    for s in ops {
        out.push_str(&format!(
            "{:<12} n={:<6} mean={:?} p95={:?} max={:?}\n",
            s.op, s.total, s.mean, s.p95, s.max
        ));
    }
    out.push_str(&format!(
        "cache: hits={} misses={} evictions={} expirations={} hit rate {:.1}%\n",
        stats.hits,
        stats.misses,
        stats.evictions,
        stats.expirations,
        stats.hit_rate() * 100.0
    ));
    out
}
