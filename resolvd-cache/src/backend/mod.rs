pub mod document;
pub mod memory;
pub mod relational;

use crate::{CacheKey, CacheStats, CacheValue};
use std::fmt;

#[derive(Debug)]
pub enum BackendError {
    Unavailable(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "cache backend unavailable: {reason}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The five operations every storage backend must provide (§4.4, §4.5). The
/// in-memory backend enforces LRU eviction itself; durable backends enforce
/// only the read-side TTL check and a simple oldest-first eviction once over
/// capacity, since the spec does not require them to replicate LRU recency.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, BackendError>;
    async fn put(&self, key: CacheKey, value: CacheValue) -> Result<(), BackendError>;
    async fn clear(&self) -> Result<(), BackendError>;
    async fn stats(&self) -> Result<CacheStats, BackendError>;
    async fn entries(&self) -> Result<Vec<(CacheKey, CacheValue)>, BackendError>;
}
