use std::cmp::Ordering;

use crate::model::task::TaskRecord;

/// Column ordering: pinned first, then priority descending, then due date
/// ascending with undated tasks last.
pub fn board_cmp(a: &TaskRecord, b: &TaskRecord) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| match (a.due, b.due) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Stable sort into board order. Ties keep their input order.
pub fn board_order(tasks: &mut [TaskRecord]) {
    tasks.sort_by(board_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use chrono::{TimeZone, Utc};

    fn ids(tasks: &[TaskRecord]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_pinned_first() {
        let mut tasks = vec![
            TaskRecord::new("a", "A").with_priority(Priority::Urgent),
            TaskRecord::new("b", "B").with_priority(Priority::Low).pinned(),
        ];
        board_order(&mut tasks);
        assert_eq!(ids(&tasks), vec!["b", "a"]);
    }

    #[test]
    fn test_priority_then_due_nulls_last() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let mut tasks = vec![
            TaskRecord::new("undated", "U").with_priority(Priority::High),
            TaskRecord::new("late", "L").with_priority(Priority::High).with_due(late),
            TaskRecord::new("low", "Lo").with_priority(Priority::Low).with_due(early),
            TaskRecord::new("early", "E").with_priority(Priority::High).with_due(early),
        ];
        board_order(&mut tasks);
        assert_eq!(ids(&tasks), vec!["early", "late", "undated", "low"]);
    }

    #[test]
    fn test_ties_are_stable() {
        let mut tasks = vec![
            TaskRecord::new("1", "first"),
            TaskRecord::new("2", "second"),
            TaskRecord::new("3", "third"),
        ];
        board_order(&mut tasks);
        assert_eq!(ids(&tasks), vec!["1", "2", "3"]);
    }
}
