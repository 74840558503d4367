//! # Language-Model Client
//!
//! The language-model capability and its OpenAI-compatible HTTP adapter.
//!
//! The assistant only needs "prompt in, text out", so the capability is the
//! single-method `LanguageModel` trait. `ChatClient` implements it against any
//! `/chat/completions` endpoint (Groq by default).

use crate::config::LlmSettings;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// System message sent with every completion request.
pub const SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from the language-model client layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The configured base URL is not an http(s) URL.
    InvalidUrl(String),
    /// Cannot reach the model API.
    ConnectionFailed(String),
    /// 401 Unauthorized - invalid or missing API key.
    Unauthorized,
    /// 429 Too Many Requests.
    RateLimited,
    /// The API answered with a non-success status.
    ServerError(u16, String),
    /// Failed to parse response body.
    ParseError(String),
    /// The response carried no completion text.
    EmptyCompletion,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(url) => write!(f, "Invalid model API URL: {url}"),
            Self::ConnectionFailed(url) => write!(f, "Cannot connect to model API at {url}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing API key"),
            Self::RateLimited => write!(f, "Rate limited: too many requests"),
            Self::ServerError(status, msg) => write!(f, "Server error ({status}): {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::EmptyCompletion => write!(f, "Model returned no completion"),
        }
    }
}

impl std::error::Error for ClientError {}

// =============================================================================
// CAPABILITY
// =============================================================================

/// Text generation: given a prompt and a token budget, produce text.
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt`, generating at most `max_tokens` tokens.
    fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// =============================================================================
// HTTP ADAPTER
// =============================================================================

/// HTTP client for an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ChatClient {
    /// Create a client from settings.
    pub fn new(settings: &LlmSettings) -> Result<Self, ClientError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(settings.base_url.clone()));
        }
        if settings.api_key.is_none() {
            tracing::warn!("No API key configured; set GROQ_API_KEY or MEDIBOT_API_KEY");
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key: settings.api_key.clone(),
        })
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Check status codes and parse the completion body.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<ChatResponse, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        resp.json::<ChatResponse>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}

impl LanguageModel for ChatClient {
    /// POST /chat/completions
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ClientError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens,
        };
        let req = self
            .request(reqwest::Method::POST, "/chat/completions")
            .json(&body);
        let resp = self.send(req).await?;
        let parsed = self.handle_response(resp).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .ok_or(ClientError::EmptyCompletion)
    }
}

// =============================================================================
// TESTS
// =============================================================================
