//! AI transform collaborator
//!
//! The `ai` registry entry delegates to an external LLM endpoint. The
//! contract is deliberately narrow: text in, text out, one attempt, one
//! timeout. Failure carries the endpoint context and maps to [`Error::Ai`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::{Error, Result};

/// The external LLM seam. Mocked in tests, HTTP-backed in production.
#[async_trait]
pub trait AiTransformer: Send + Sync {
    /// Transform `text` through the external model
    async fn transform(&self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    output: String,
}

/// Chat-completion style HTTP client for the `ai` transform
pub struct HttpAi {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HttpAi {
    /// Build the client from configuration. Returns `None` when no
    /// endpoint is configured - the engine then treats `ai` requests as a
    /// configuration error.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        let Some(endpoint) = config.endpoint.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Ai(format!("failed to build HTTP client: {e}")))?;

        Ok(Some(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }))
    }
}

#[async_trait]
impl AiTransformer for HttpAi {
    async fn transform(&self, text: &str) -> Result<String> {
        debug!(endpoint = %self.endpoint, model = %self.model, "Calling AI endpoint");

        let mut request = self.client.post(&self.endpoint).json(&CompletionRequest {
            model: &self.model,
            input: text,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Ai(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Ai(format!(
                "{} returned status {status}",
                self.endpoint
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Ai(format!("{}: malformed response: {e}", self.endpoint)))?;

        Ok(completion.output)
    }
}
