use crate::error::ResolverError;
use std::time::Duration;

/// RFC 8484 DNS-over-HTTPS: POST the raw wire-format query to an HTTPS
/// endpoint with the `application/dns-message` media type and return the
/// response body verbatim (§4.2).
#[derive(Debug, Clone)]
pub struct DohTransport {
    client: reqwest::Client,
    pub endpoint: String,
}

impl DohTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ResolverError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ResolverError::TransportError(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn query(&self, payload: Vec<u8>) -> Result<Vec<u8>, ResolverError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/dns-message")
            .header("Accept", "application/dns-message")
            .body(payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ResolverError::Timeout
                } else {
                    ResolverError::TransportError(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ResolverError::TransportError(format!(
                "doh endpoint returned {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| ResolverError::TransportError(err.to_string()))
    }
}
