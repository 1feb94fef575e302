use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexSet;

use crate::model::task::{Priority, TaskStatus};

/// Separator between fields in a cache key
pub const KEY_DELIMITER: &str = "|";

/// Optional predicates narrowing a task list. Built per query, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against title or description.
    /// Surrounding whitespace is trimmed, so `" bank"` also matches "Bigbank".
    pub search: Option<String>,
    pub priority: Option<Priority>,
    /// Record matches if it carries any of these
    pub tags: IndexSet<String>,
    pub status: Option<TaskStatus>,
    /// Inclusive lower bound on the due date
    pub due_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the due date
    pub due_to: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text. Leading and trailing whitespace is ignored.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn due_from(mut self, from: DateTime<Utc>) -> Self {
        self.due_from = Some(from);
        self
    }

    pub fn due_to(mut self, to: DateTime<Utc>) -> Self {
        self.due_to = Some(to);
        self
    }

    /// The lowercased search needle, or None when the search is blank
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn has_date_range(&self) -> bool {
        self.due_from.is_some() || self.due_to.is_some()
    }

    /// True when no predicate is active
    pub fn is_empty(&self) -> bool {
        self.search_needle().is_none()
            && self.priority.is_none()
            && self.tags.is_empty()
            && self.status.is_none()
            && !self.has_date_range()
    }

    /// Derive the cache key: every field joined by `|`, unset fields empty.
    ///
    /// Field order is search, priority, tags (sorted, comma-joined), status,
    /// due_from, due_to. Dates are RFC 3339 in UTC.
    pub fn cache_key(&self) -> String {
        let mut tags: Vec<String> = self.tags.iter().map(|t| escape_key_part(t)).collect();
        tags.sort_unstable();
        let fields = [
            self.search_needle()
                .map(|s| escape_key_part(&s))
                .unwrap_or_default(),
            self.priority.map(|p| p.key().to_string()).unwrap_or_default(),
            tags.join(","),
            self.status.map(|s| s.key().to_string()).unwrap_or_default(),
            self.due_from.map(format_bound).unwrap_or_default(),
            self.due_to.map(format_bound).unwrap_or_default(),
        ];
        fields.join(KEY_DELIMITER)
    }
}

/// Backslash-escape the key's own separators so user text cannot forge a key
fn escape_key_part(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '|' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn format_bound(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_criteria() {
        assert!(FilterCriteria::new().is_empty());
        assert!(FilterCriteria::new().search("   ").is_empty());
        assert!(!FilterCriteria::new().tag("x").is_empty());
        assert_eq!(FilterCriteria::new().cache_key(), "|||||");
    }

    #[test]
    fn test_cache_key_field_order() {
        let from = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let criteria = FilterCriteria::new()
            .search("  Bank ")
            .priority(Priority::High)
            .tag("finance")
            .tag("home")
            .status(TaskStatus::InProgress)
            .due_from(from);
        assert_eq!(
            criteria.cache_key(),
            "bank|high|finance,home|in_progress|2025-05-01T00:00:00Z|"
        );
    }

    #[test]
    fn test_cache_key_ignores_search_case() {
        let a = FilterCriteria::new().search("Milk");
        let b = FilterCriteria::new().search("milk");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_tag_order_irrelevant() {
        let a = FilterCriteria::new().tag("b").tag("a");
        let b = FilterCriteria::new().tag("a").tag("b");
        assert_eq!(a, b);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_escapes_separators() {
        let one_tag = FilterCriteria::new().tag("a,b");
        let two_tags = FilterCriteria::new().tag("a").tag("b");
        assert_ne!(one_tag.cache_key(), two_tags.cache_key());
        assert_eq!(FilterCriteria::new().search("x|y").cache_key(), "x\\|y|||||");
    }

    #[test]
    fn test_cache_key_distinguishes_fields() {
        let by_status = FilterCriteria::new().status(TaskStatus::Pending);
        let by_search = FilterCriteria::new().search("pending");
        assert_ne!(by_status.cache_key(), by_search.cache_key());
    }
}
