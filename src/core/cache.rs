use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

struct CacheState<K, V> {
    live: HashMap<K, CacheEntry<V>>,
    // Last value of keys evicted on read, only visible through `get_stale`.
    evicted: HashMap<K, V>,
}

/// Time-to-live cache with lazy eviction on read.
///
/// Entries older than the TTL are never returned by [`Cache::get`]. Callers that
/// failed to refresh a key can still reach its last value with [`Cache::get_stale`].
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    ttl: Duration,
    inner: Arc<Mutex<CacheState<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(CacheState {
                live: HashMap::new(),
                evicted: HashMap::new(),
            })),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let is_fresh = match cache.live.get(key) {
            Some(entry) => entry.stored_at.elapsed() <= self.ttl,
            None => {
                debug!("Cache MISS for key: {:?}", key);
                return None;
            }
        };

        if is_fresh {
            debug!("Cache HIT for key: {:?}", key);
            return cache.live.get(key).map(|entry| entry.value.clone());
        }

        debug!("Cache entry expired for key: {:?}", key);
        if let Some(entry) = cache.live.remove(key) {
            cache.evicted.insert(key.clone(), entry.value);
        }
        None
    }

    /// Returns the last value stored for `key`, regardless of its age.
    pub async fn get_stale(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        cache
            .live
            .get(key)
            .map(|entry| entry.value.clone())
            .or_else(|| cache.evicted.get(key).cloned())
    }

    pub async fn set(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.evicted.remove(&key);
        cache.live.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

/// A named collection of raw key-value records.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]);
    async fn clear(&self);
}

pub trait Store {
    fn get_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>>;
}
