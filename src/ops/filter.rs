use crate::model::filter::FilterCriteria;
use crate::model::task::TaskRecord;

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Case-insensitive substring match on title, then description.
/// `needle` must already be lowercased.
fn matches_search(task: &TaskRecord, needle: &str) -> bool {
    if task.title.to_lowercase().contains(needle) {
        return true;
    }
    match &task.description {
        Some(desc) => desc.to_lowercase().contains(needle),
        None => false,
    }
}

/// Any-of tag match
fn matches_tags(task: &TaskRecord, criteria: &FilterCriteria) -> bool {
    criteria.tags.iter().any(|tag| task.tags.contains(tag))
}

/// Inclusive date range. A missing due date fails any active bound.
fn matches_due(task: &TaskRecord, criteria: &FilterCriteria) -> bool {
    if !criteria.has_date_range() {
        return true;
    }
    let Some(due) = task.due else {
        return false;
    };
    if let Some(from) = criteria.due_from {
        if due < from {
            return false;
        }
    }
    if let Some(to) = criteria.due_to {
        if due > to {
            return false;
        }
    }
    true
}

/// Whether a single task satisfies every active criterion.
pub fn matches(task: &TaskRecord, criteria: &FilterCriteria) -> bool {
    matches_with_needle(task, criteria, criteria.search_needle().as_deref())
}

fn matches_with_needle(task: &TaskRecord, criteria: &FilterCriteria, needle: Option<&str>) -> bool {
    if let Some(status) = criteria.status {
        if task.status != status {
            return false;
        }
    }
    if let Some(priority) = criteria.priority {
        if task.priority != priority {
            return false;
        }
    }
    if !criteria.tags.is_empty() && !matches_tags(task, criteria) {
        return false;
    }
    if let Some(needle) = needle {
        if !matches_search(task, needle) {
            return false;
        }
    }
    matches_due(task, criteria)
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Narrow `tasks` to those matching `criteria`, preserving input order.
pub fn filter_tasks(tasks: &[TaskRecord], criteria: &FilterCriteria) -> Vec<TaskRecord> {
    if criteria.is_empty() {
        return tasks.to_vec();
    }
    // Lowercase the needle once rather than per task
    let needle = criteria.search_needle();
    tasks
        .iter()
        .filter(|task| matches_with_needle(task, criteria, needle.as_deref()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
