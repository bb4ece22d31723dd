use super::{BackendError, CacheBackend};
use crate::{CacheKey, CacheStats, CacheValue, LruCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use std::sync::Mutex;

/// The in-memory LRU backend. A single exclusive lock guards the ordered
/// map, as §5 allows; hold it only around the map mutation, never across I/O.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<LruCache>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl MemoryBackend {
    pub fn new(capacity: usize, default_ttl: u32) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity, default_ttl)),
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, BackendError> {
        Ok(self
            .inner
            .lock()
            .expect("cache lock poisoned")
            .get(key))
    }

    async fn put(&self, key: CacheKey, value: CacheValue) -> Result<(), BackendError> {
        self.inner.lock().expect("cache lock poisoned").put(key, value);
        Ok(())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.inner.lock().expect("cache lock poisoned").clear();
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, BackendError> {
        Ok(self.inner.lock().expect("cache lock poisoned").stats())
    }

    async fn entries(&self) -> Result<Vec<(CacheKey, CacheValue)>, BackendError> {
        Ok(self.inner.lock().expect("cache lock poisoned").entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvd_proto::{DnsPacket, QueryType};

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let backend = MemoryBackend::new(10, 300);
        let key = CacheKey::new("example.com", QueryType::A);
        backend
            .put(key.clone(), CacheValue::new(DnsPacket::default()))
            .await
            .unwrap();
        assert!(backend.get(&key).await.unwrap().is_some());
        assert_eq!(backend.stats().await.unwrap().size, 1);
    }
}
