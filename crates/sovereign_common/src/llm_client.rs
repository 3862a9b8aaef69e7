//! Local LLM client abstraction.
//!
//! One request/response call per run, no schema: the generated text is used
//! verbatim. `OllamaClient` talks to an Ollama-compatible `/api/generate`
//! endpoint; `FakeLlmClient` replays canned responses for tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;

/// LLM errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("LLM returned empty response")]
    EmptyResponse,
}

/// Generic text-generation backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model name, for logging
    fn model(&self) -> &str;
}

/// Ollama HTTP client
pub struct OllamaClient {
    http_client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        debug!("Ollama request to {} ({} chars)", url, prompt.len());

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::HttpError(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!(
                "HTTP {} from Ollama",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;

        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or(LlmError::EmptyResponse)?;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text.to_string())
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Fake LLM client for testing
pub struct FakeLlmClient {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlmClient {
    /// Create a fake client with pre-defined responses
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_text(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::HttpError("fake client poisoned".to_string()))?;

        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            // Keep returning the last response
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }

    fn model(&self) -> &str {
        "fake"
    }
}
