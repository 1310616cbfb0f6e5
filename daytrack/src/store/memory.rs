use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::TrackStore;
use crate::error::TrackerError;

/// A `TrackStore` implementation over a HashMap. Used by tests and as the
/// dry-run store when no remote store is configured.
#[derive(Default, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.records.read().unwrap().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

#[async_trait]
impl TrackStore for MemoryStore {
    async fn write(&self, path: &str, value: &str) -> Result<(), TrackerError> {
        self.records
            .write()
            .unwrap()
            .insert(path.to_string(), value.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_memory_store_overwrites_same_path() {
    let store = MemoryStore::new();
    store.write("U1/07-08-2026/10:15", "first").await.unwrap();
    store.write("U1/07-08-2026/10:15", "second").await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("U1/07-08-2026/10:15").unwrap(), "second");
}
