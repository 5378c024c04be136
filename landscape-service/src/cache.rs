//! Write-once result cache keyed by the normalized query filter

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Entries are immutable once written; only invalidation removes them.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: RwLock<HashMap<String, Arc<V>>>,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> ResultCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.read().get(key).cloned()
    }

    /// Store `value` unless `key` is already present. Returns the entry that
    /// ends up cached, so concurrent writers of one key agree on a result.
    pub fn insert(&self, key: String, value: Arc<V>) -> Arc<V> {
        Arc::clone(self.entries.write().entry(key).or_insert(value))
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Drop every entry. Returns how many were dropped.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
