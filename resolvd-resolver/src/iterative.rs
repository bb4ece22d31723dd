use crate::error::ResolverError;
use crate::roots::random_root_server;
use crate::transport::UdpTransport;
use futures::future::BoxFuture;
use resolvd_proto::{DnsPacket, QueryType, RData};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

const DEFAULT_HOP_LIMIT: usize = 16;
const DEFAULT_QUERY_LIMIT: usize = 32;

/// Per-resolution state threaded through the walk and every NS
/// sub-resolution it spawns: a shared hop/query budget plus the set of names
/// currently being resolved on this stack, so a referral cycle
/// (`ns1.example.` needing `ns2.example.` needing `ns1.example.`) fails
/// instead of recursing forever (§4.3, §9).
struct Budget {
    hops: usize,
    queries: usize,
    hop_limit: usize,
    query_limit: usize,
    visiting: HashSet<String>,
}

impl Budget {
    fn new(hop_limit: usize, query_limit: usize) -> Self {
        Self {
            hops: 0,
            queries: 0,
            hop_limit,
            query_limit,
            visiting: HashSet::new(),
        }
    }

    fn spend_hop(&mut self) -> Result<(), ResolverError> {
        if self.hops >= self.hop_limit {
            return Err(ResolverError::HopLimitExceeded);
        }
        self.hops += 1;
        Ok(())
    }

    fn spend_query(&mut self) -> Result<(), ResolverError> {
        if self.queries >= self.query_limit {
            return Err(ResolverError::HopLimitExceeded);
        }
        self.queries += 1;
        Ok(())
    }
}

/// Walks the delegation hierarchy from a random root server down to an
/// authoritative answer (§4.3).
#[derive(Debug, Clone)]
pub struct IterativeResolver {
    transport: UdpTransport,
    hop_limit: usize,
    query_limit: usize,
}

impl Default for IterativeResolver {
    fn default() -> Self {
        Self {
            transport: UdpTransport::default(),
            hop_limit: DEFAULT_HOP_LIMIT,
            query_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl IterativeResolver {
    pub fn new(transport: UdpTransport, hop_limit: usize, query_limit: usize) -> Self {
        Self {
            transport,
            hop_limit,
            query_limit,
        }
    }

    pub async fn resolve(&self, name: &str, qtype: QueryType) -> Result<DnsPacket, ResolverError> {
        let mut budget = Budget::new(self.hop_limit, self.query_limit);
        self.resolve_with_budget(name, qtype, &mut budget).await
    }

    fn resolve_with_budget<'a>(
        &'a self,
        name: &'a str,
        qtype: QueryType,
        budget: &'a mut Budget,
    ) -> BoxFuture<'a, Result<DnsPacket, ResolverError>> {
        Box::pin(async move {
            let normalized = name.trim_end_matches('.').to_lowercase();
            if !budget.visiting.insert(normalized.clone()) {
                return Err(ResolverError::NoDelegation);
            }
            let result = self.walk(&normalized, qtype, budget).await;
            budget.visiting.remove(&normalized);
            result
        })
    }

    async fn walk(
        &self,
        name: &str,
        qtype: QueryType,
        budget: &mut Budget,
    ) -> Result<DnsPacket, ResolverError> {
        let mut current_ns_ip = random_root_server();
        tracing::debug!(%name, ?qtype, root = %current_ns_ip, "starting iterative walk");

        loop {
            budget.spend_hop()?;
            budget.spend_query()?;

            let response = self.query_one(name, qtype, current_ns_ip).await?;

            if !response.answers.is_empty() {
                tracing::debug!(%name, server = %current_ns_ip, "authoritative answer received");
                return Ok(response);
            }

            let ns_names: Vec<String> = response
                .authorities
                .iter()
                .filter_map(|record| match &record.data {
                    RData::Ns(host) => Some(host.clone()),
                    _ => None,
                })
                .collect();

            if ns_names.is_empty() {
                tracing::debug!(%name, server = %current_ns_ip, "no delegation in response, giving up");
                return Err(ResolverError::NoDelegation);
            }
            tracing::debug!(%name, server = %current_ns_ip, ?ns_names, "referral received");

            let glue: HashMap<String, Ipv4Addr> = response
                .additionals
                .iter()
                .filter_map(|record| match record.data {
                    RData::A(addr) => Some((record.name.to_lowercase(), addr)),
                    _ => None,
                })
                .collect();

            current_ns_ip = match self.next_hop(&ns_names, &glue, budget).await? {
                Some(ip) => ip,
                None => return Err(ResolverError::NoDelegation),
            };
        }
    }

    async fn query_one(
        &self,
        name: &str,
        qtype: QueryType,
        server: Ipv4Addr,
    ) -> Result<DnsPacket, ResolverError> {
        let query = DnsPacket::build_query(name, qtype, false);
        let payload = query.encode()?;
        let response_bytes = self
            .transport
            .query(server, &payload)
            .await
            .map_err(|_| ResolverError::Unreachable)?;
        Ok(DnsPacket::decode(&response_bytes)?)
    }

    /// Prefers glue, in NS order; falls back to resolving each candidate
    /// NS name's own A record, first success wins (§4.3 step 5).
    async fn next_hop(
        &self,
        ns_names: &[String],
        glue: &HashMap<String, Ipv4Addr>,
        budget: &mut Budget,
    ) -> Result<Option<Ipv4Addr>, ResolverError> {
        for ns_name in ns_names {
            if let Some(addr) = glue.get(&ns_name.to_lowercase()) {
                tracing::debug!(%ns_name, %addr, "following glue record");
                return Ok(Some(*addr));
            }
        }

        for ns_name in ns_names {
            tracing::debug!(%ns_name, "no glue for name server, sub-resolving its address");
            let sub = self
                .resolve_with_budget(ns_name, QueryType::A, budget)
                .await;
            if let Ok(packet) = sub {
                let found = packet.answers.iter().find_map(|record| match record.data {
                    RData::A(addr) => Some(addr),
                    _ => None,
                });
                if found.is_some() {
                    return Ok(found);
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_enforces_hop_limit() {
        let mut budget = Budget::new(1, 10);
        budget.spend_hop().unwrap();
        assert!(matches!(budget.spend_hop(), Err(ResolverError::HopLimitExceeded)));
    }

    #[test]
    fn budget_enforces_query_limit() {
        let mut budget = Budget::new(10, 1);
        budget.spend_query().unwrap();
        assert!(matches!(budget.spend_query(), Err(ResolverError::HopLimitExceeded)));
    }

    #[test]
    fn revisiting_a_name_already_on_stack_is_rejected() {
        let mut budget = Budget::new(10, 10);
        assert!(budget.visiting.insert("ns1.example.".to_string()));
        assert!(!budget.visiting.insert("ns1.example.".to_string()));
    }
}
