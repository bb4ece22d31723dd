use crate::prelude::Message;
use crate::Handler;
use resolvd_proto::{DnsPacket, Header, ResponseCode};
use resolvd_resolver::{ResolveMode, ResolverFacade};
use std::sync::Arc;

/// Re-exposes the façade on UDP/5353 (§9's "local DNS server stub"). We take
/// the symmetric-response-builder option: the façade already hands back a
/// parsed message rather than raw upstream bytes, so there is nothing to
/// relay byte-for-byte — we copy the client's id and question back into a
/// freshly built response instead.
pub struct RelayHandler {
    facade: Arc<ResolverFacade>,
    mode: ResolveMode,
}

impl RelayHandler {
    pub fn new(facade: Arc<ResolverFacade>, mode: ResolveMode) -> Self {
        Self { facade, mode }
    }

    async fn try_handle(&self, bytes: &[u8]) -> Vec<u8> {
        let request = match DnsPacket::decode(bytes) {
            Ok(request) => request,
            Err(_) => return Vec::new(),
        };

        let mut response = DnsPacket {
            header: Header::response_to(&request.header),
            questions: request.questions.clone(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        };

        match request.questions.first() {
            Some(question) => {
                let outcome = self
                    .facade
                    .resolve(&question.name, question.qtype, self.mode)
                    .await;
                match outcome.data {
                    Some(message) => {
                        response.answers = message.answers;
                        response.header.rcode = ResponseCode::NoError;
                    }
                    None => response.header.rcode = ResponseCode::ServerFailure,
                }
            }
            None => response.header.rcode = ResponseCode::FormatError,
        }

        response.encode().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Handler for RelayHandler {
    async fn handle(&self, message: Message) -> Message {
        let response_bytes = self.try_handle(&message.buffer[..message.size]).await;

        let mut buffer = [0u8; 512];
        let size = response_bytes.len().min(buffer.len());
        buffer[..size].copy_from_slice(&response_bytes[..size]);

        Message {
            address: message.address,
            buffer,
            size,
        }
    }
}
