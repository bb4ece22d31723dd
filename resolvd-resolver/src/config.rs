use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

/// The configuration values the core honors (§6). Loaded by the root crate
/// via the `config` crate's layered file+environment source, the way the
/// teacher's top-level `Config` aggregates each collaborator's own config.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub timeout_seconds: f64,
    pub max_retries: u32,
    pub cache_size: usize,
    pub default_ttl: u32,
    pub cache_backend: CacheBackendKind,
    pub default_forwarder: Ipv4Addr,
    pub doh_providers: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut doh_providers = BTreeMap::new();
        doh_providers.insert(
            "cloudflare".to_string(),
            "https://cloudflare-dns.com/dns-query".to_string(),
        );
        doh_providers.insert(
            "google".to_string(),
            "https://dns.google/dns-query".to_string(),
        );

        Self {
            timeout_seconds: 3.0,
            max_retries: 3,
            cache_size: resolvd_cache::DEFAULT_CAPACITY,
            default_ttl: resolvd_cache::DEFAULT_TTL,
            cache_backend: CacheBackendKind::Memory,
            default_forwarder: Ipv4Addr::new(8, 8, 8, 8),
            doh_providers,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Memory,
    Document,
    Relational,
}
