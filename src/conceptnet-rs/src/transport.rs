use conceptnet_core::RequestTarget;
use reqwest::Client as HttpClient;

use crate::TransportError;

/// Status and body of an HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs a single GET and hands back the raw response
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, target: &RequestTarget) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(insecure_skip_verify: bool) -> Result<Self, TransportError> {
        let client = if insecure_skip_verify {
            HttpClient::builder()
                .danger_accept_invalid_certs(true)
                .build()?
        } else {
            HttpClient::new()
        };

        Ok(Self { client })
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, headers)
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, target: &RequestTarget) -> Result<RawResponse, TransportError> {
        let response = self.client.get(target.url()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { status, body })
    }
}
