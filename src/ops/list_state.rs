use std::collections::HashMap;
use std::time::Instant;

/// Bookkeeping for one rendered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub len: usize,
    /// Bumped on every update
    pub version: u64,
    pub scroll_offset: usize,
    pub updated_at: Instant,
}

/// Per-key list state for board columns and views
#[derive(Debug, Default)]
pub struct ListManager {
    lists: HashMap<String, ListState>,
}

impl ListManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the list under `key` now holds `len` items.
    /// The scroll offset is clamped to the new length.
    pub fn update(&mut self, key: &str, len: usize) -> &ListState {
        let now = Instant::now();
        self.lists
            .entry(key.to_string())
            .and_modify(|s| {
                s.len = len;
                s.version += 1;
                s.scroll_offset = s.scroll_offset.min(len);
                s.updated_at = now;
            })
            .or_insert(ListState {
                len,
                version: 1,
                scroll_offset: 0,
                updated_at: now,
            })
    }

    pub fn get(&self, key: &str) -> Option<&ListState> {
        self.lists.get(key)
    }

    /// Set the scroll offset, clamped to the list length. Unknown keys are ignored.
    pub fn set_scroll(&mut self, key: &str, offset: usize) -> Option<usize> {
        let state = self.lists.get_mut(key)?;
        state.scroll_offset = offset.min(state.len);
        Some(state.scroll_offset)
    }

    pub fn remove(&mut self, key: &str) -> Option<ListState> {
        self.lists.remove(key)
    }

    /// Keep only the keys for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.lists.retain(|key, _| keep(key));
    }

    pub fn clear(&mut self) {
        self.lists.clear();
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Tracked keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.lists.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_bumps_version() {
        let mut lists = ListManager::new();
        assert_eq!(lists.update("pending", 4).version, 1);
        let state = lists.update("pending", 2);
        assert_eq!(state.version, 2);
        assert_eq!(state.len, 2);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut lists = ListManager::new();
        lists.update("col", 10);
        assert_eq!(lists.set_scroll("col", 7), Some(7));
        assert_eq!(lists.set_scroll("col", 50), Some(10));
        // Shrinking the list pulls the offset back in
        lists.update("col", 3);
        assert_eq!(lists.get("col").map(|s| s.scroll_offset), Some(3));
        assert_eq!(lists.set_scroll("missing", 1), None);
    }

    #[test]
    fn test_keys_remove_clear() {
        let mut lists = ListManager::new();
        lists.update("b", 1);
        lists.update("a", 1);
        assert_eq!(lists.keys(), vec!["a", "b"]);
        assert!(lists.remove("a").is_some());
        assert_eq!(lists.len(), 1);
        lists.clear();
        assert!(lists.is_empty());
    }

    #[test]
    fn test_retain() {
        let mut lists = ListManager::new();
        for key in ["a", "b", "c"] {
            lists.update(key, 1);
        }
        lists.set_scroll("b", 1);
        lists.retain(|key| key != "a");
        assert_eq!(lists.keys(), vec!["b", "c"]);
        assert_eq!(lists.get("b").map(|s| s.scroll_offset), Some(1));
    }
}
