//! Cached "last used group" with write-through persistence.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use tabgroup_host::{GroupId, HostResult, KeyValueStore};
use tabgroup_shared::diagnostics;

/// Storage key of the persisted group id.
pub const LAST_USED_GROUP_KEY: &str = "lastUsedGroupId";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CacheState {
    #[default]
    Unloaded,
    Loaded(Option<GroupId>),
}

/// The most recently used group id, loaded lazily from the store.
pub struct LastUsedGroup {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<CacheState>,
}

impl LastUsedGroup {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(CacheState::Unloaded),
        }
    }

    pub fn is_loaded(&self) -> bool {
        *self.state.lock() != CacheState::Unloaded
    }

    /// Cached value, `None` when unset or not loaded yet.
    pub fn cached(&self) -> Option<GroupId> {
        match *self.state.lock() {
            CacheState::Loaded(id) => id,
            CacheState::Unloaded => None,
        }
    }

    /// Loads from the store on first use. A failed load is logged and reads
    /// as "no group"; the cache stays unloaded so the next caller retries.
    pub async fn ensure_loaded(&self) -> Option<GroupId> {
        if let CacheState::Loaded(id) = *self.state.lock() {
            return id;
        }
        match self.load().await {
            Ok(id) => id,
            Err(err) => {
                diagnostics::error(format!("last_used_group_load_failed error={}", err));
                None
            }
        }
    }

    /// Reads the persisted id into the cache.
    pub async fn load(&self) -> HostResult<Option<GroupId>> {
        let stored = self.storage.get(LAST_USED_GROUP_KEY).await?;
        let id = decode(stored);
        let mut state = self.state.lock();
        // A save that landed while the read was in flight is newer.
        if let CacheState::Loaded(current) = *state {
            return Ok(current);
        }
        *state = CacheState::Loaded(id);
        diagnostics::log(format!("last_used_group_loaded id={:?}", id));
        Ok(id)
    }

    /// Persists the id, then updates the cache once the store accepted it.
    pub async fn save(&self, group_id: GroupId) -> HostResult<()> {
        self.storage
            .set(LAST_USED_GROUP_KEY, json!(group_id))
            .await?;
        *self.state.lock() = CacheState::Loaded(Some(group_id));
        diagnostics::log(format!("last_used_group_saved id={}", group_id));
        Ok(())
    }
}

/// Zero and negative ids read as unset; hosts never hand them out.
fn decode(value: Option<Value>) -> Option<GroupId> {
    value.and_then(|v| v.as_i64()).filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabgroup_host::MemoryBrowser;

    #[tokio::test]
    async fn test_ensure_loaded_reads_store_once() {
        let browser = Arc::new(MemoryBrowser::new());
        browser.seed_value(LAST_USED_GROUP_KEY, json!(9));
        let cache = LastUsedGroup::new(browser.clone());
        assert!(!cache.is_loaded());
        assert_eq!(cache.cached(), None);

        assert_eq!(cache.ensure_loaded().await, Some(9));
        browser.seed_value(LAST_USED_GROUP_KEY, json!(3));
        assert_eq!(cache.ensure_loaded().await, Some(9));
    }

    #[tokio::test]
    async fn test_failed_load_stays_unloaded() {
        let browser = Arc::new(MemoryBrowser::new());
        browser.seed_value(LAST_USED_GROUP_KEY, json!(4));
        browser.update_faults(|faults| faults.fail_storage = true);
        let cache = LastUsedGroup::new(browser.clone());

        assert_eq!(cache.ensure_loaded().await, None);
        assert!(!cache.is_loaded());

        browser.update_faults(|faults| faults.fail_storage = false);
        assert_eq!(cache.ensure_loaded().await, Some(4));
    }

    #[tokio::test]
    async fn test_save_writes_through() {
        let browser = Arc::new(MemoryBrowser::new());
        let cache = LastUsedGroup::new(browser.clone());
        cache.save(12).await.unwrap();
        assert_eq!(cache.cached(), Some(12));
        assert_eq!(browser.stored(LAST_USED_GROUP_KEY), Some(json!(12)));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_untouched() {
        let browser = Arc::new(MemoryBrowser::new());
        let cache = LastUsedGroup::new(browser.clone());
        cache.save(1).await.unwrap();
        browser.update_faults(|faults| faults.fail_storage = true);
        assert!(cache.save(2).await.is_err());
        assert_eq!(cache.cached(), Some(1));
    }

    #[test]
    fn test_decode_ignores_garbage() {
        assert_eq!(decode(None), None);
        assert_eq!(decode(Some(json!("7"))), None);
        assert_eq!(decode(Some(json!(-1))), None);
        assert_eq!(decode(Some(json!(0))), None);
        assert_eq!(decode(Some(json!(7))), Some(7));
    }
}
