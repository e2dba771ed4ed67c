//! Embedding providers.
//!
//! The production provider speaks the Titan text-embeddings invoke API
//! over HTTP. The base URL is injectable so tests and local stacks can
//! point it at a mock endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use vigil_core::Settings;

use crate::error::{EmbeddingError, Result};
use crate::Embedding;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the embedding dimension this provider produces.
    fn dimension(&self) -> usize;

    /// Generate an embedding for the given text.
    async fn embed_text(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts in batches.
    ///
    /// The default implementation issues one request per text, grouped
    /// into batches of `batch_size`. Batching amortizes call overhead;
    /// it does not introduce concurrency.
    async fn embed_texts(&self, texts: &[String], batch_size: usize) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size.max(1)) {
            for text in batch {
                embeddings.push(self.embed_text(text).await?);
            }
        }
        Ok(embeddings)
    }

    /// Check if the provider is configured and usable.
    fn is_available(&self) -> bool;
}

/// Titan text-embeddings provider.
pub struct TitanProvider {
    /// Endpoint base URL.
    base_url: Option<String>,

    /// Model identifier inserted into the invoke path.
    model_id: String,

    /// Embedding dimension the model produces.
    dimension: usize,

    /// Optional bearer token.
    api_key: Option<String>,

    /// HTTP client.
    client: reqwest::Client,
}

impl TitanProvider {
    /// Create an unconfigured provider with default model settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            model_id: "titan-embed-text-v2".to_string(),
            dimension: crate::DEFAULT_DIMENSION,
            api_key: std::env::var("VIGIL_EMBEDDING_API_KEY").ok(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut provider = Self::new();
        provider.base_url = settings.embedding_endpoint.clone();
        provider.model_id = settings.embedding_model_id.clone();
        provider.dimension = settings.embedding_dimension;
        provider
    }

    /// Set the endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

impl Default for TitanProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for TitanProvider {
    fn name(&self) -> &str {
        "titan"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        let base_url = self
            .base_url
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        debug!("Generating embedding with model: {}", self.model_id);

        let body = serde_json::json!({ "inputText": text });

        let mut request = self
            .client
            .post(format!("{base_url}/model/{}/invoke", self.model_id))
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: TitanEmbeddingResponse = response.json().await?;

        if result.embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse(
                "no embedding in response".to_string(),
            ));
        }

        info!("Generated embedding with {} dimensions", result.embedding.len());
        Ok(result.embedding)
    }

    fn is_available(&self) -> bool {
        self.base_url.is_some()
    }
}

/// Titan invoke API response format.
#[derive(Debug, Deserialize)]
struct TitanEmbeddingResponse {
    embedding: Vec<f32>,
    #[serde(rename = "inputTextTokenCount")]
    #[allow(dead_code)]
    input_text_token_count: Option<u64>,
}
