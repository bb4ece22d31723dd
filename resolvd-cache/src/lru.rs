use crate::{now_secs, CacheValue};
use resolvd_proto::QueryType;
use std::collections::HashMap;
use std::fmt;

/// `(lowercased_name, rrtype)`, formatted as `name:type` using the rightmost
/// colon as the separator so colons inside a name never get misparsed (§6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    pub qtype: QueryType,
}

impl CacheKey {
    pub fn new(name: &str, qtype: QueryType) -> Self {
        Self {
            name: name.trim_end_matches('.').to_lowercase(),
            qtype,
        }
    }

    pub fn to_storage_string(&self) -> String {
        format!("{}:{}", self.name, self.qtype.into_num())
    }

    /// Splits on the rightmost colon, matching the original Python store's
    /// `rsplit(":", 1)`.
    pub fn from_storage_string(raw: &str) -> Option<Self> {
        let (name, qtype) = raw.rsplit_once(':')?;
        let qtype: u16 = qtype.parse().ok()?;
        Some(Self {
            name: name.to_string(),
            qtype: QueryType::from_num(qtype),
        })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_storage_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

/// A capacity-bounded, insertion/access-ordered map with per-entry TTL
/// expiry. `order` holds keys from least- to most-recently-used; both `get`
/// and `put` move their key to the back.
#[derive(Debug)]
pub struct LruCache {
    capacity: usize,
    default_ttl: u32,
    entries: HashMap<CacheKey, CacheValue>,
    order: Vec<CacheKey>,
    hits: u64,
    misses: u64,
}

impl LruCache {
    pub fn new(capacity: usize, default_ttl: u32) -> Self {
        Self {
            capacity: capacity.max(1),
            default_ttl,
            entries: HashMap::new(),
            order: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(pos);
            self.order.push(key);
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<CacheValue> {
        let now = now_secs();
        let expired = match self.entries.get(key) {
            Some(value) => value.is_expired(now, self.default_ttl),
            None => {
                self.misses += 1;
                return None;
            }
        };

        if expired {
            tracing::debug!(%key, "cache entry expired, evicting");
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            self.misses += 1;
            return None;
        }

        self.touch(key);
        self.hits += 1;
        self.entries.get(key).cloned()
    }

    pub fn put(&mut self, key: CacheKey, value: CacheValue) {
        tracing::debug!(%key, "caching record");
        self.entries.insert(key.clone(), value);
        self.touch(&key);
        if !self.order.contains(&key) {
            self.order.push(key);
        }

        if self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.first().cloned() {
                tracing::debug!(evicted = %oldest, "capacity exceeded, evicting lru entry");
                self.order.remove(0);
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            capacity: self.capacity,
        }
    }

    pub fn entries(&self) -> Vec<(CacheKey, CacheValue)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|v| (key.clone(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvd_proto::DnsPacket;

    fn value() -> CacheValue {
        CacheValue::new(DnsPacket::default())
    }

    #[test]
    fn put_past_capacity_evicts_exactly_the_lru_entry() {
        let mut cache = LruCache::new(2, 300);
        cache.put(CacheKey::new("a.com", QueryType::A), value());
        cache.put(CacheKey::new("b.com", QueryType::A), value());
        cache.put(CacheKey::new("c.com", QueryType::A), value());

        assert!(cache.get(&CacheKey::new("a.com", QueryType::A)).is_none());
        assert!(cache.get(&CacheKey::new("b.com", QueryType::A)).is_some());
        assert!(cache.get(&CacheKey::new("c.com", QueryType::A)).is_some());
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn get_promotes_to_most_recently_used() {
        let mut cache = LruCache::new(2, 300);
        let a = CacheKey::new("a.com", QueryType::A);
        let b = CacheKey::new("b.com", QueryType::A);
        let c = CacheKey::new("c.com", QueryType::A);

        cache.put(a.clone(), value());
        cache.put(b.clone(), value());
        // touching `a` makes `b` the least-recently-used entry
        assert!(cache.get(&a).is_some());
        cache.put(c.clone(), value());

        assert!(cache.get(&b).is_none());
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn overwrite_does_not_change_size_or_trigger_eviction() {
        let mut cache = LruCache::new(2, 300);
        let a = CacheKey::new("a.com", QueryType::A);
        cache.put(a.clone(), value());
        cache.put(a.clone(), value());
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn expired_get_counts_as_miss_and_removes_entry() {
        let mut cache = LruCache::new(2, 0);
        let a = CacheKey::new("a.com", QueryType::A);
        cache.put(a.clone(), value());
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(cache.get(&a).is_none());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn clear_resets_counters_and_entries() {
        let mut cache = LruCache::new(2, 300);
        cache.put(CacheKey::new("a.com", QueryType::A), value());
        let _ = cache.get(&CacheKey::new("a.com", QueryType::A));
        let _ = cache.get(&CacheKey::new("missing.com", QueryType::A));
        cache.clear();
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 0, size: 0, capacity: 2 });
    }

    #[test]
    fn storage_key_splits_on_rightmost_colon() {
        let key = CacheKey::new("weird:name.com", QueryType::A);
        let raw = key.to_storage_string();
        let parsed = CacheKey::from_storage_string(&raw).unwrap();
        assert_eq!(parsed, key);
    }
}
