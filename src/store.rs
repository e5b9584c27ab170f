//! Record store
//!
//! One record per region, keyed by a fixed namespace prefix plus the region
//! id. No transactions and no eviction: the last write wins and write
//! failures are returned to the caller.

use std::collections::BTreeMap;

use crate::error::{EditorError, EditorResult};

/// Default namespace for records sharing the page origin's storage
pub const DEFAULT_PREFIX: &str = "siridhamma_";

/// Synchronous string key/value storage (LocalStorage on web)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> EditorResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> EditorResult<()>;
    fn remove_item(&mut self, key: &str) -> EditorResult<()>;
}

/// In-memory storage used by the native build and tests.
///
/// An optional quota (in bytes of keys plus values, like browsers count it)
/// makes writes fail the way a full LocalStorage does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw view of every stored item, prefix included
    pub fn items(&self) -> &BTreeMap<String, String> {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> EditorResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> EditorResult<()> {
        if let Some(quota) = self.quota {
            let replaced = self.items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(EditorError::storage_write(
                    key,
                    format!("quota of {quota} bytes exceeded ({needed} needed)"),
                ));
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> EditorResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Namespaced view over a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct RecordStore<S> {
    backend: S,
    prefix: String,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Storage key for a region id
    pub fn key_for(&self, region_id: &str) -> String {
        format!("{}{}", self.prefix, region_id)
    }

    pub fn get(&self, region_id: &str) -> EditorResult<Option<String>> {
        self.backend.get_item(&self.key_for(region_id))
    }

    pub fn set(&mut self, region_id: &str, content: &str) -> EditorResult<()> {
        let key = self.key_for(region_id);
        self.backend.set_item(&key, content)?;
        log::debug!("Saved {} ({} bytes)", key, content.len());
        Ok(())
    }

    pub fn remove(&mut self, region_id: &str) -> EditorResult<()> {
        self.backend.remove_item(&self.key_for(region_id))
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        let mut store = RecordStore::new(MemoryStorage::new(), DEFAULT_PREFIX);
        store.set("prefect-list-body", "<tr></tr>").unwrap();

        assert_eq!(store.key_for("prefect-list-body"), "siridhamma_prefect-list-body");
        assert!(store.backend().items().contains_key("siridhamma_prefect-list-body"));
        assert_eq!(store.get("prefect-list-body").unwrap().as_deref(), Some("<tr></tr>"));
        assert_eq!(store.get("teacher-list-body").unwrap(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = RecordStore::new(MemoryStorage::new(), DEFAULT_PREFIX);
        store.set("prefect-duties", "a").unwrap();
        store.set("prefect-duties", "b").unwrap();
        assert_eq!(store.get("prefect-duties").unwrap().as_deref(), Some("b"));

        store.remove("prefect-duties").unwrap();
        assert_eq!(store.get("prefect-duties").unwrap(), None);
    }

    #[test]
    fn test_quota_exceeded_is_reported() {
        let mut storage = MemoryStorage::with_quota(20);
        storage.set_item("k", "0123456789").unwrap();

        let err = storage.set_item("other", "0123456789").unwrap_err();
        assert!(matches!(err, EditorError::StorageWrite { ref key, .. } if key == "other"));
        assert_eq!(storage.len(), 1);

        // Replacing an existing value only counts the difference
        storage.set_item("k", "0123456789abcdef").unwrap();
    }
}
