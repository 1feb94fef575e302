use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::model::config::{BatchConfig, BoardConfig};
use crate::model::filter::FilterCriteria;
use crate::model::task::{TaskRecord, TaskStatus};
use crate::ops::batch::{self, BatchError, BatchOutcome};
use crate::ops::cache::{CacheStats, Clock, ResultCache, SystemClock};
use crate::ops::list_state::ListManager;
use crate::ops::perf::PerformanceMonitor;
use crate::ops::sort::board_order;

/// Error type for board repository operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("duplicate task id: {0}")]
    DuplicateId(String),
}

/// Operation names recorded in the performance monitor
pub mod op {
    pub const VIEW_HIT: &str = "view.hit";
    pub const VIEW_MISS: &str = "view.miss";
    pub const SORT: &str = "column.sort";
    pub const BATCH: &str = "batch";
}

/// The board's live task list plus the cached, ordered views rendered from it.
///
/// Every mutation invalidates the whole result cache; views are recomputed
/// lazily on the next read.
pub struct Board<C: Clock = SystemClock> {
    tasks: Vec<TaskRecord>,
    cache: ResultCache<C>,
    lists: ListManager,
    perf: PerformanceMonitor,
    batch: BatchConfig,
}

impl Board<SystemClock> {
    pub fn new(config: &BoardConfig, tasks: Vec<TaskRecord>) -> Self {
        Self::with_clock(config, tasks, SystemClock)
    }
}

impl<C: Clock> Board<C> {
    pub fn with_clock(config: &BoardConfig, tasks: Vec<TaskRecord>, clock: C) -> Self {
        Board {
            tasks,
            cache: ResultCache::with_clock(&config.cache, clock),
            lists: ListManager::new(),
            perf: PerformanceMonitor::new(&config.monitor),
            batch: config.batch.clone(),
        }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cached_views(&self) -> usize {
        self.cache.len()
    }

    pub fn perf(&self) -> &PerformanceMonitor {
        &self.perf
    }

    pub fn lists(&self) -> &ListManager {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut ListManager {
        &mut self.lists
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Filtered view in input order, served from the cache when fresh.
    ///
    /// List state is kept only for views the cache still holds, plus this one.
    pub fn view(&mut self, criteria: &FilterCriteria) -> Arc<[TaskRecord]> {
        let key = criteria.cache_key();
        let hits_before = self.cache.stats().hits;
        let start = Instant::now();
        let view = self.cache.get_or_compute(&self.tasks, criteria);
        let elapsed = start.elapsed();
        let name = if self.cache.stats().hits > hits_before {
            op::VIEW_HIT
        } else {
            op::VIEW_MISS
        };
        self.perf.record(name, elapsed);

        let cache = &self.cache;
        self.lists.retain(|k| k == key || cache.has_entry(k));
        self.lists.update(&key, view.len());
        view
    }

    /// One column in board order. `status` overrides any status in `criteria`.
    pub fn column(&mut self, status: TaskStatus, criteria: &FilterCriteria) -> Vec<TaskRecord> {
        let mut scoped = criteria.clone();
        scoped.status = Some(status);
        let mut column = self.view(&scoped).to_vec();
        self.perf.measure(op::SORT, || board_order(&mut column));
        column
    }

    /// All columns in status order
    pub fn columns(&mut self, criteria: &FilterCriteria) -> Vec<(TaskStatus, Vec<TaskRecord>)> {
        TaskStatus::ALL
            .iter()
            .map(|&status| (status, self.column(status, criteria)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Repository operations
    // -----------------------------------------------------------------------

    fn changed(&mut self, what: &str, id: &str) {
        let dropped = self.cache.invalidate_all();
        info!(op = what, id, dropped, "board changed");
    }

    fn position(&self, id: &str) -> Result<usize, BoardError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
    }

    pub fn create(&mut self, task: TaskRecord) -> Result<(), BoardError> {
        if self.get(&task.id).is_some() {
            return Err(BoardError::DuplicateId(task.id));
        }
        let id = task.id.clone();
        self.tasks.push(task);
        self.changed("create", &id);
        Ok(())
    }

    pub fn update(&mut self, task: TaskRecord) -> Result<(), BoardError> {
        let index = self.position(&task.id)?;
        let id = task.id.clone();
        self.tasks[index] = task;
        self.changed("update", &id);
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<TaskRecord, BoardError> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        self.changed("delete", id);
        Ok(removed)
    }

    /// Move a task to another column
    pub fn move_task(&mut self, id: &str, status: TaskStatus) -> Result<(), BoardError> {
        let index = self.position(id)?;
        self.tasks[index].status = status;
        self.changed("move", id);
        Ok(())
    }

    /// Swap in a fresh list from the data provider
    pub fn replace_all(&mut self, tasks: Vec<TaskRecord>) {
        self.tasks = tasks;
        self.changed("replace", "*");
    }

    /// Run `transform` over every task in background batches, then adopt the results.
    pub fn apply_batch<E, F>(&mut self, transform: F) -> Result<BatchOutcome<TaskRecord>, BatchError>
    where
        E: Display + Send,
        F: Fn(&TaskRecord) -> Result<TaskRecord, E> + Sync,
    {
        let BatchConfig { batch_size, policy } = self.batch;
        let tasks = &self.tasks;
        let outcome = self.perf.measure(op::BATCH, || {
            batch::process_in_batches(tasks, batch_size, policy, transform)
        })?;
        self.tasks = outcome.items.clone();
        self.changed("batch", "*");
        Ok(outcome)
    }
}
