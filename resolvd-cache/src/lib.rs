pub mod backend;
pub mod lru;

pub use backend::memory::MemoryBackend;
pub use backend::{BackendError, CacheBackend};
pub use lru::{CacheKey, CacheStats, LruCache};

use resolvd_proto::{DnsPacket, QueryType};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}

/// Default fallback capacity and negative-TTL (§4.4, §6).
pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TTL: u32 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheValue {
    pub message: DnsPacket,
    pub inserted_at: u64,
}

impl CacheValue {
    pub fn new(message: DnsPacket) -> Self {
        Self {
            message,
            inserted_at: now_secs(),
        }
    }

    pub fn effective_ttl(&self, default_ttl: u32) -> u32 {
        self.message.effective_ttl(default_ttl)
    }

    pub fn is_expired(&self, now: u64, default_ttl: u32) -> bool {
        now.saturating_sub(self.inserted_at) >= self.effective_ttl(default_ttl) as u64
    }
}

/// Whether a response is eligible for caching at all: a non-NOERROR rcode or
/// an empty answer/authority section is never cached (§3, §9 open question,
/// resolved in favor of not caching negative responses).
pub fn is_cacheable(message: &DnsPacket) -> bool {
    message.header.rcode.is_success() && !(message.answers.is_empty() && message.authorities.is_empty())
}

pub fn cache_key(name: &str, qtype: QueryType) -> CacheKey {
    CacheKey::new(name, qtype)
}
