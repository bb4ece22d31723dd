use crate::error::ResolverError;
use crate::forward::ForwardResolver;
use crate::iterative::IterativeResolver;
use crate::metrics::{MetricEntry, Metrics, Status};
use crate::transport::DohTransport;
use resolvd_cache::{cache_key, CacheBackend, CacheValue};
use resolvd_proto::{DnsPacket, QueryType};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnssecSummary {
    pub has_rrsig: bool,
    pub has_ds: bool,
    pub has_dnskey: bool,
}

impl From<(bool, bool, bool)> for DnssecSummary {
    fn from((has_rrsig, has_ds, has_dnskey): (bool, bool, bool)) -> Self {
        Self {
            has_rrsig,
            has_ds,
            has_dnskey,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Recursive,
    Forward,
    Doh,
    Auto,
}

impl ResolveMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Forward => "forward",
            Self::Doh => "doh",
            Self::Auto => "auto",
        }
    }
}

impl Default for ResolveMode {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Debug)]
pub struct UnknownMode;

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resolution mode")
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for ResolveMode {
    type Err = UnknownMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "recursive" => Ok(Self::Recursive),
            "forward" => Ok(Self::Forward),
            "doh" => Ok(Self::Doh),
            "auto" => Ok(Self::Auto),
            _ => Err(UnknownMode),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub source: Source,
    pub data: Option<DnsPacket>,
    pub dnssec: Option<DnssecSummary>,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub mode: String,
}

/// The public entry point (§4.6): consults the cache, dispatches to a
/// resolution strategy, caches what comes back, and records a metric either
/// way.
pub struct ResolverFacade {
    cache: Arc<dyn CacheBackend>,
    iterative: IterativeResolver,
    forward: ForwardResolver,
    doh: DohTransport,
    metrics: Metrics,
    default_ttl: u32,
}

impl ResolverFacade {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        iterative: IterativeResolver,
        forward: ForwardResolver,
        doh: DohTransport,
        default_ttl: u32,
    ) -> Self {
        Self {
            cache,
            iterative,
            forward,
            doh,
            metrics: Metrics::default(),
            default_ttl,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn cache(&self) -> &Arc<dyn CacheBackend> {
        &self.cache
    }

    pub async fn resolve(&self, name: &str, qtype: QueryType, mode: ResolveMode) -> ResolveOutcome {
        let start = Instant::now();
        let key = cache_key(name, qtype);

        if let Ok(Some(value)) = self.cache.get(&key).await {
            let dnssec = value.message.dnssec_summary();
            return ResolveOutcome {
                source: Source::Cache,
                data: Some(value.message),
                dnssec: Some(dnssec.into()),
                error: None,
                duration_ms: start.elapsed().as_millis() as u64,
                mode: mode.as_str().to_string(),
            };
        }

        let (resolved_mode, result) = self.dispatch(name, qtype, mode).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(message) => {
                if resolvd_cache::is_cacheable(&message) {
                    let value = CacheValue::new(message.clone());
                    let _ = self.cache.put(key, value).await;
                }
                self.metrics.record(MetricEntry {
                    timestamp: now_secs(),
                    name: name.to_string(),
                    mode: resolved_mode.clone(),
                    duration_ms,
                    status: Status::Success,
                });
                let dnssec = message.dnssec_summary();
                ResolveOutcome {
                    source: Source::Network,
                    data: Some(message),
                    dnssec: Some(dnssec.into()),
                    error: None,
                    duration_ms,
                    mode: resolved_mode,
                }
            }
            Err(err) => {
                self.metrics.record(MetricEntry {
                    timestamp: now_secs(),
                    name: name.to_string(),
                    mode: resolved_mode.clone(),
                    duration_ms,
                    status: Status::Failure,
                });
                ResolveOutcome {
                    source: Source::Network,
                    data: None,
                    dnssec: None,
                    error: Some(err.to_string()),
                    duration_ms,
                    mode: resolved_mode,
                }
            }
        }
    }

    async fn doh_resolve(&self, name: &str, qtype: QueryType) -> Result<DnsPacket, ResolverError> {
        let query = DnsPacket::build_query(name, qtype, true);
        let payload = query.encode()?;
        let response = self.doh.query(payload).await?;
        Ok(DnsPacket::decode(&response)?)
    }

    /// `"auto"` tries recursive, then forward, then DoH, returning whichever
    /// strategy first produces a parsed response; any other mode is tried
    /// alone and its error (if any) is returned to the caller (§4.6, §7).
    async fn dispatch(
        &self,
        name: &str,
        qtype: QueryType,
        mode: ResolveMode,
    ) -> (String, Result<DnsPacket, ResolverError>) {
        match mode {
            ResolveMode::Recursive => (
                "recursive".to_string(),
                self.iterative.resolve(name, qtype).await,
            ),
            ResolveMode::Forward => (
                "forward".to_string(),
                self.forward.resolve(name, qtype).await,
            ),
            ResolveMode::Doh => ("doh".to_string(), self.doh_resolve(name, qtype).await),
            ResolveMode::Auto => {
                if let Ok(message) = self.iterative.resolve(name, qtype).await {
                    return ("recursive".to_string(), Ok(message));
                }
                if let Ok(message) = self.forward.resolve(name, qtype).await {
                    return ("forward".to_string(), Ok(message));
                }
                ("doh".to_string(), self.doh_resolve(name, qtype).await)
            }
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}
