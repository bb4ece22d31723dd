use crate::error::ResolverError;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;

/// A single request/response over UDP: bind an ephemeral socket, send to
/// `(server, 53)`, wait up to `timeout` for a reply, and hand back the raw
/// bytes. No retry lives here — that belongs to whoever calls the transport
/// (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct UdpTransport {
    pub timeout: Duration,
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self {
            timeout: super::DEFAULT_TIMEOUT,
        }
    }
}

impl UdpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn query(&self, server: Ipv4Addr, payload: &[u8]) -> Result<Vec<u8>, ResolverError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let destination: SocketAddr = SocketAddrV4::new(server, 53).into();
        socket.send_to(payload, destination).await?;

        let mut buffer = [0u8; 4096];
        let (size, _) = tokio::time::timeout(self.timeout, socket.recv_from(&mut buffer))
            .await
            .map_err(|_| ResolverError::Timeout)??;

        Ok(buffer[..size].to_vec())
    }
}
