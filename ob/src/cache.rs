//! Warm-start cache for recent deliveries
//!
//! One key in a local key-value store holds the JSON array of delivered
//! orders. The cache is advisory: writes are best effort and a read that
//! finds nothing usable yields an empty list.

use kvstore::{KeyValueStore, MemoryStore, SqliteStore, get_json, set_json};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::domain::{DeliveryOrder, DeliveryStatus};

/// Key under which the recent deliveries are stored
pub const RECENT_DELIVERIES_KEY: &str = "motoboy.recentDeliveries";

/// Best-effort cache of the recent-deliveries bucket
pub struct RecentDeliveriesCache {
    store: Box<dyn KeyValueStore>,
}

impl RecentDeliveriesCache {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Open the SQLite cache at `path`, falling back to memory if that fails
    pub fn open(path: &Path) -> Self {
        debug!(path = %path.display(), "RecentDeliveriesCache::open: called");
        match SqliteStore::open(path) {
            Ok(store) => Self::new(Box::new(store)),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "cache unavailable, using in-memory store");
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Write the recent deliveries; failures are logged and swallowed
    pub fn save(&mut self, orders: &[DeliveryOrder]) {
        debug!(count = orders.len(), "save: called");
        if let Err(e) = set_json(self.store.as_mut(), RECENT_DELIVERIES_KEY, orders) {
            warn!(error = %e, "failed to persist recent deliveries");
        }
    }

    /// Read the recent deliveries; missing or malformed data is an empty list
    pub fn load(&self) -> Vec<DeliveryOrder> {
        debug!("load: called");
        match get_json::<Vec<DeliveryOrder>>(self.store.as_ref(), RECENT_DELIVERIES_KEY) {
            Ok(Some(orders)) => {
                info!(count = orders.len(), "loaded recent deliveries from cache");
                orders
                    .into_iter()
                    .filter(|o| o.status == DeliveryStatus::Delivered)
                    .collect()
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable recent deliveries cache");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvstore::{KvError, KvResult};
    use tempfile::tempdir;

    /// A store whose every operation fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> KvResult<Option<String>> {
            Err(KvError::Unavailable("broken".to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> KvResult<()> {
            Err(KvError::Unavailable("quota exceeded".to_string()))
        }
        fn remove(&mut self, _key: &str) -> KvResult<bool> {
            Err(KvError::Unavailable("broken".to_string()))
        }
        fn keys(&self) -> KvResult<Vec<String>> {
            Err(KvError::Unavailable("broken".to_string()))
        }
    }

    fn delivered(id: &str) -> DeliveryOrder {
        DeliveryOrder::new(id, DeliveryStatus::Delivered).with_address("Rua A, 10")
    }

    #[test]
    fn test_save_then_load() {
        let mut cache = RecentDeliveriesCache::in_memory();
        cache.save(&[delivered("1"), delivered("2")]);

        let loaded = cache.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "1");
        assert_eq!(loaded[0].address, "Rua A, 10");
    }

    #[test]
    fn test_missing_key_is_empty() {
        let cache = RecentDeliveriesCache::in_memory();
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_malformed_json_is_empty() {
        let mut store = MemoryStore::new();
        store.set(RECENT_DELIVERIES_KEY, "{not json").unwrap();
        let cache = RecentDeliveriesCache::new(Box::new(store));
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_broken_store_is_swallowed() {
        let mut cache = RecentDeliveriesCache::new(Box::new(BrokenStore));
        cache.save(&[delivered("1")]);
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_highlight_flag_not_persisted() {
        let mut cache = RecentDeliveriesCache::in_memory();
        let mut order = delivered("1");
        order.just_updated = true;
        cache.save(&[order]);
        assert!(!cache.load()[0].just_updated);
    }

    #[test]
    fn test_sqlite_cache_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db");
        {
            let mut cache = RecentDeliveriesCache::open(&path);
            cache.save(&[delivered("7")]);
        }
        let cache = RecentDeliveriesCache::open(&path);
        assert_eq!(cache.load()[0].id, "7");
    }
}
