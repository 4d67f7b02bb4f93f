use crate::error::{Result, SpiderError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// A text-in, text-out language model.
pub trait LlmClient {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Ollama HTTP client for local LLM inference.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        trace!("prompting {} with {} chars", self.model, prompt.len());
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    SpiderError::Llm(format!("cannot reach Ollama at {}", self.base_url))
                } else if err.is_timeout() {
                    SpiderError::Llm(format!("{} timed out", self.model))
                } else {
                    SpiderError::Http(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpiderError::Llm(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| SpiderError::Llm(format!("malformed Ollama response: {err}")))?;

        Ok(parsed.response)
    }
}
