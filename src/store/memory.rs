use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection, lost when the process exits.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let collection = self.inner.lock().await;
        let value = collection.get(key).cloned();
        debug!(
            "Memory collection {} for key: {}",
            if value.is_some() { "HIT" } else { "MISS" },
            String::from_utf8_lossy(key)
        );
        value
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        let mut collection = self.inner.lock().await;
        debug!("Memory collection PUT for key: {}", String::from_utf8_lossy(key));
        collection.insert(key.to_vec(), value.to_vec());
    }

    async fn clear(&self) {
        let mut collection = self.inner.lock().await;
        collection.clear();
        debug!("Memory collection CLEAR");
    }
}
