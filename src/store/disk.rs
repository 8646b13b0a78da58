use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::{debug, warn};

/// Collection backed by a fjall partition. Every write is synced to disk.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.partition.insert(key, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn clear_partition(&self) -> Result<()> {
        for key in self.partition.keys() {
            self.partition.remove(key?)?;
        }
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => {
                debug!("Disk collection HIT for key: {}", String::from_utf8_lossy(key));
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Disk collection MISS for key: {}", String::from_utf8_lossy(key));
                None
            }
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        match self.write(key, value) {
            Ok(()) => debug!("Disk collection PUT for key: {}", String::from_utf8_lossy(key)),
            Err(e) => warn!(
                "Failed to store record {}: {:#}",
                String::from_utf8_lossy(key),
                e
            ),
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.clear_partition() {
            warn!("Failed to clear collection: {:#}", e)
        }
    }
}
