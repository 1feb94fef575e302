use std::fmt::Display;
use std::thread;

use tracing::{debug, warn};

use crate::model::config::BatchPolicy;

/// Error type for batch processing under `BatchPolicy::FailFast`
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("item {index} failed: {message}")]
    ItemFailed { index: usize, message: String },
    #[error("worker for batch {batch} panicked")]
    WorkerPanicked { batch: usize },
}

/// An item whose transform failed and was replaced by its input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position in the input
    pub index: usize,
    pub message: String,
}

#[derive(Debug)]
pub struct BatchOutcome<T> {
    /// One output per input, in submission order
    pub items: Vec<T>,
    pub failures: Vec<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply `transform` to every item, one batch at a time on a worker thread.
///
/// Each batch is handed to a scoped thread and awaited before the next one
/// starts, so outputs keep submission order. No retries, no timeouts.
/// `batch_size == 0` is treated as 1.
pub fn process_in_batches<T, E, F>(
    items: &[T],
    batch_size: usize,
    policy: BatchPolicy,
    transform: F,
) -> Result<BatchOutcome<T>, BatchError>
where
    T: Clone + Send + Sync,
    E: Display + Send,
    F: Fn(&T) -> Result<T, E> + Sync,
{
    let batch_size = batch_size.max(1);
    let mut outcome = BatchOutcome {
        items: Vec::with_capacity(items.len()),
        failures: Vec::new(),
    };

    for (batch_index, batch) in items.chunks(batch_size).enumerate() {
        let base = batch_index * batch_size;
        debug!(batch = batch_index, len = batch.len(), "processing batch");

        let joined = thread::scope(|scope| {
            scope
                .spawn(|| batch.iter().map(&transform).collect::<Vec<_>>())
                .join()
        });

        let results = match joined {
            Ok(results) => results,
            Err(_) => {
                warn!(batch = batch_index, "batch worker panicked");
                if policy == BatchPolicy::FailFast {
                    return Err(BatchError::WorkerPanicked { batch: batch_index });
                }
                for (offset, item) in batch.iter().enumerate() {
                    outcome.items.push(item.clone());
                    outcome.failures.push(BatchFailure {
                        index: base + offset,
                        message: "worker panicked".to_string(),
                    });
                }
                continue;
            }
        };

        for (offset, (original, result)) in batch.iter().zip(results).enumerate() {
            match result {
                Ok(processed) => outcome.items.push(processed),
                Err(e) => {
                    let index = base + offset;
                    let message = e.to_string();
                    if policy == BatchPolicy::FailFast {
                        return Err(BatchError::ItemFailed { index, message });
                    }
                    warn!(index, error = message.as_str(), "item failed, keeping original");
                    outcome.items.push(original.clone());
                    outcome.failures.push(BatchFailure { index, message });
                }
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tasks(n: usize) -> Vec<TaskRecord> {
        (0..n)
            .map(|i| TaskRecord::new(format!("t{}", i), format!("task {}", i)))
            .collect()
    }

    fn shout(task: &TaskRecord) -> Result<TaskRecord, String> {
        if task.id == "t3" {
            return Err("cannot process t3".to_string());
        }
        let mut out = task.clone();
        out.title = out.title.to_uppercase();
        Ok(out)
    }

    #[test]
    fn test_results_in_submission_order() {
        let input = tasks(7);
        let outcome = process_in_batches(&input, 3, BatchPolicy::KeepOriginal, |t| {
            let mut out = t.clone();
            out.pinned = true;
            Ok::<_, String>(out)
        })
        .unwrap();
        let ids: Vec<&str> = outcome.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t0", "t1", "t2", "t3", "t4", "t5", "t6"]);
        assert!(outcome.items.iter().all(|t| t.pinned));
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_keep_original_reports_failure() {
        let input = tasks(5);
        let outcome = process_in_batches(&input, 2, BatchPolicy::KeepOriginal, shout).unwrap();
        assert_eq!(outcome.items.len(), 5);
        assert_eq!(outcome.items[2].title, "TASK 2");
        assert_eq!(outcome.items[3], input[3]);
        assert_eq!(
            outcome.failures,
            vec![BatchFailure {
                index: 3,
                message: "cannot process t3".to_string()
            }]
        );
    }

    #[test]
    fn test_fail_fast_stops() {
        let input = tasks(5);
        let err = process_in_batches(&input, 2, BatchPolicy::FailFast, shout).unwrap_err();
        assert_eq!(err.to_string(), "item 3 failed: cannot process t3");
    }

    #[test]
    fn test_zero_batch_size_runs_one_at_a_time() {
        let calls = AtomicUsize::new(0);
        let input = tasks(3);
        let outcome = process_in_batches(&input, 0, BatchPolicy::KeepOriginal, |t| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(t.clone())
        })
        .unwrap();
        assert_eq!(outcome.items.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_input() {
        let outcome =
            process_in_batches(&[] as &[TaskRecord], 10, BatchPolicy::FailFast, shout).unwrap();
        assert!(outcome.items.is_empty());
    }
}
