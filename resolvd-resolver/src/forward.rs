use crate::error::ResolverError;
use crate::transport::UdpTransport;
use resolvd_proto::{DnsPacket, QueryType};
use std::net::Ipv4Addr;

/// Forwards a query to a configured upstream recursor with `RD=1` and
/// parses whatever comes back (§4.6 `"forward"` mode).
#[derive(Debug, Clone)]
pub struct ForwardResolver {
    transport: UdpTransport,
    pub upstream: Ipv4Addr,
}

impl ForwardResolver {
    pub fn new(upstream: Ipv4Addr, transport: UdpTransport) -> Self {
        Self { transport, upstream }
    }

    pub async fn resolve(&self, name: &str, qtype: QueryType) -> Result<DnsPacket, ResolverError> {
        let query = DnsPacket::build_query(name, qtype, true);
        let payload = query.encode()?;
        let response = self.transport.query(self.upstream, &payload).await?;
        Ok(DnsPacket::decode(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_recursion_desired_query() {
        let query = DnsPacket::build_query("example.com", QueryType::A, true);
        assert!(query.header.rd);
        assert_eq!(query.questions[0].name, "example.com");
    }
}
