//! Single-shot client for the generate proxy.
//!
//! The proxy holds the model credential; we send `{model, contents, config}`
//! and get back `{text}` or `{error}`. No timeout, retry or backoff happens
//! here. Callers decide what to fall back to.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AiError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/generate";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl GenerateRequest {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            model: None,
            contents: contents.into(),
            config: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Anything that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated text, which may be empty.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError>;
}

/// Map a non-2xx proxy reply onto the error taxonomy.
pub fn classify_failure(status: StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty());

    match message {
        Some(m) if status == StatusCode::INTERNAL_SERVER_ERROR && m.contains("API_KEY") => {
            AiError::ServerConfig(m)
        }
        message => AiError::Upstream {
            status: status.to_string(),
            message,
        },
    }
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl ProxyClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, ...).
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for ProxyClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }
}

#[async_trait]
impl TextGenerator for ProxyClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let mut body = request.clone();
        if body.model.is_none() {
            body.model = Some(self.model.clone());
        }

        debug!(endpoint = %self.endpoint, model = ?body.model, prompt_len = body.contents.len(), "generate");
        let resp = self.http.post(&self.endpoint).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            let err = classify_failure(status, &txt);
            warn!(%status, error = %err, "AI proxy call failed");
            return Err(err);
        }

        let out: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;
        Ok(out.text.unwrap_or_default())
    }
}
