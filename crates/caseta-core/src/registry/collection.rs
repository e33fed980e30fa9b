// ── Generic reactive collection ──
//
// Concurrent storage keyed by a primary id, with any number of alias keys
// pointing at each entry and push-based change notification via `watch`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection for a single record type.
///
/// Uses `DashMap` for O(1) lookups by primary key or alias, and `watch`
/// channels so subscribers see a fresh snapshot after every mutation.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: key -> record.
    by_key: DashMap<String, Arc<T>>,

    /// Secondary index: alias -> key.
    alias_to_key: DashMap<String, String>,

    /// Reverse of `alias_to_key` for efficient removal.
    key_to_aliases: DashMap<String, Vec<String>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            alias_to_key: DashMap::new(),
            key_to_aliases: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or update a record. Returns `true` if the key was new.
    ///
    /// Aliases previously attached to the key but absent from `aliases`
    /// are dropped.
    pub(crate) fn upsert(&self, key: String, aliases: Vec<String>, record: T) -> bool {
        if let Some((_, old)) = self.key_to_aliases.remove(&key) {
            for alias in old.iter().filter(|a| !aliases.contains(a)) {
                self.alias_to_key.remove(alias);
            }
        }

        let is_new = !self.by_key.contains_key(&key);
        self.by_key.insert(key.clone(), Arc::new(record));
        for alias in &aliases {
            self.alias_to_key.insert(alias.clone(), key.clone());
        }
        self.key_to_aliases.insert(key, aliases);

        self.rebuild_snapshot();
        self.bump_version();

        is_new
    }

    /// Remove a record by key. Returns the removed record if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            if let Some((_, aliases)) = self.key_to_aliases.remove(key) {
                for alias in &aliases {
                    self.alias_to_key.remove(alias);
                }
            }
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Look up a record by its primary key.
    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Resolve an alias to its primary key.
    pub(crate) fn key_for_alias(&self, alias: &str) -> Option<String> {
        self.alias_to_key.get(alias).map(|r| r.value().clone())
    }

    /// Look up a record through one of its aliases.
    pub(crate) fn get_by_alias(&self, alias: &str) -> Option<Arc<T>> {
        let key = self.key_for_alias(alias)?;
        self.get_by_key(&key)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert("key1".into(), vec!["a".into()], "hello".into()));
        assert!(!col.upsert("key1".into(), vec!["a".into()], "world".into()));
        assert_eq!(col.len(), 1);
        assert_eq!(col.version(), 2);
    }

    #[test]
    fn lookup_by_key_and_alias() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert("key1".into(), vec!["a".into(), "b".into()], "hello".into());

        assert_eq!(*col.get_by_key("key1").unwrap(), "hello");
        assert_eq!(*col.get_by_alias("b").unwrap(), "hello");
        assert_eq!(col.key_for_alias("a").as_deref(), Some("key1"));
        assert!(col.get_by_alias("c").is_none());
    }

    #[test]
    fn remove_cleans_up_aliases() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert("key1".into(), vec!["a".into()], "hello".into());

        let removed = col.remove("key1");
        assert_eq!(*removed.unwrap(), "hello");
        assert!(col.get_by_alias("a").is_none());
        assert!(col.snapshot().is_empty());
    }

    #[test]
    fn upsert_drops_stale_aliases() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert("key1".into(), vec!["old".into()], "v1".into());
        col.upsert("key1".into(), vec!["new".into()], "v2".into());

        assert!(col.get_by_alias("old").is_none());
        assert_eq!(*col.get_by_alias("new").unwrap(), "v2");
    }
}
