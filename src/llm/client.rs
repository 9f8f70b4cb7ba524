use super::types::GenerateRequest;
use crate::{Error, Result, config::LlmConfig};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

/// Raw response body of a streaming generation call.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Sends one generation request and hands back the undecoded body.
    /// Dropping the stream releases the underlying connection.
    async fn open_stream(&self, request: &GenerateRequest) -> Result<ByteStream>;
}

pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        let endpoint = format!("{}/api/generate", config.base_url.trim_end_matches('/'));

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn open_stream(&self, request: &GenerateRequest) -> Result<ByteStream> {
        let body = serde_json::to_vec(request)?;

        debug!(
            "Opening generation stream to {} (model: {}, prompt: {} bytes)",
            self.endpoint,
            request.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::backend(format!("Failed to reach generation backend: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Generation backend returned {}: {}", status, detail);
            return Err(Error::backend(format!(
                "Generation backend returned {}: {}",
                status,
                detail.trim()
            )));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::backend_stream(e.to_string())))
            .boxed())
    }
}
