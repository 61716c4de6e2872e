//! Extraction backends.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. Both backends speak JSON over HTTP via `reqwest`;
//! they differ only in endpoint, authentication, and response shape.

use reqwest::StatusCode;
use tracing::{debug, warn};

use mindforest_types::{ExtractedWisdom, Message};

use crate::config::{BackendType, ExtractorConfig};
use crate::error::ExtractError;
use crate::parse::parse_wisdom;
use crate::prompt::{PromptEngine, RenderedPrompt};

// ---------------------------------------------------------------------------
// Extractor (prompt rendering + backend dispatch)
// ---------------------------------------------------------------------------

/// Turns a reflection conversation into an [`ExtractedWisdom`].
#[derive(Debug)]
pub struct Extractor {
    backend: ExtractorBackend,
    prompts: PromptEngine,
}

impl Extractor {
    /// Summarize a conversation.
    ///
    /// Missing or unparseable fields in the reply are filled with defaults.
    /// Transport and HTTP failures are returned as errors and produce
    /// nothing.
    pub async fn extract(&self, messages: &[Message]) -> Result<ExtractedWisdom, ExtractError> {
        if messages.is_empty() {
            return Err(ExtractError::EmptyConversation);
        }
        let prompt = self.prompts.render(messages)?;
        debug!(
            backend = self.backend.name(),
            messages = messages.len(),
            "Extracting wisdom"
        );

        let raw = self.backend.complete(&prompt).await.inspect_err(|e| {
            warn!(backend = self.backend.name(), error = %e, "Wisdom extraction failed");
        })?;
        Ok(parse_wisdom(&raw))
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        self.backend.name()
    }
}

/// A backend that can complete a rendered prompt.
#[derive(Debug)]
pub enum ExtractorBackend {
    /// `OpenAI`-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Chat proxy holding the provider key.
    Proxy(ProxyBackend),
}

impl ExtractorBackend {
    /// Send a prompt and return the reply text.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ExtractError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Proxy(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Proxy(_) => "proxy",
        }
    }
}

fn chat_messages(prompt: &RenderedPrompt) -> serde_json::Value {
    serde_json::json!([
        {"role": "system", "content": prompt.system},
        {"role": "user", "content": prompt.user}
    ])
}

/// Map a non-success response to an error, classifying 429 separately.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ExtractError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ExtractError::RateLimited);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(ExtractError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull a readable message out of an error body.
///
/// Understands `{ "message" }`, `{ "error": { "message" } }` and
/// `{ "error": "..." }`; anything else is returned verbatim.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_owned();
    };
    json.get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
        })
        .or_else(|| json.get("error").and_then(serde_json::Value::as_str))
        .map_or_else(|| body.trim().to_owned(), ToOwned::to_owned)
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions` in JSON mode.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            client: build_client(config)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ExtractError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": chat_messages(prompt),
            "temperature": 0.7,
            "max_tokens": 1024,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let json: serde_json::Value = check_status(response).await?.json().await?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, ExtractError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(|s| s.trim().to_owned())
        .ok_or_else(|| {
            ExtractError::Response("response missing choices[0].message.content".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Proxy backend
// ---------------------------------------------------------------------------

/// Backend for a chat proxy that keeps the provider key server side.
///
/// Sends `{ messages, jsonMode }` to `{api_url}/chat` and reads `text`
/// from the reply, falling back to the raw chat completions shape.
#[derive(Debug)]
pub struct ProxyBackend {
    client: reqwest::Client,
    api_url: String,
}

impl ProxyBackend {
    /// Create a new proxy backend.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            client: build_client(config)?,
            api_url: config.api_url.clone(),
        })
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ExtractError> {
        let url = format!("{}/chat", self.api_url);

        let body = serde_json::json!({
            "messages": chat_messages(prompt),
            "jsonMode": true
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let json: serde_json::Value = check_status(response).await?.json().await?;

        extract_proxy_content(&json)
    }
}

/// Extract the text content from a proxy response.
fn extract_proxy_content(json: &serde_json::Value) -> Result<String, ExtractError> {
    if let Some(text) = json.get("text").and_then(serde_json::Value::as_str) {
        return Ok(text.trim().to_owned());
    }
    extract_openai_content(json)
        .map_err(|e| ExtractError::Response(format!("proxy response missing text: {e}")))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

fn build_client(config: &ExtractorConfig) -> Result<reqwest::Client, ExtractError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ExtractError::Config(format!("failed to build HTTP client: {e}")))
}

/// Create an extractor from configuration.
///
/// Dispatches to [`OpenAiBackend`] or [`ProxyBackend`] based on the
/// configured [`BackendType`].
pub fn create_extractor(config: &ExtractorConfig) -> Result<Extractor, ExtractError> {
    let backend = match config.backend_type {
        BackendType::OpenAi => ExtractorBackend::OpenAi(OpenAiBackend::new(config)?),
        BackendType::Proxy => ExtractorBackend::Proxy(ProxyBackend::new(config)?),
    };
    Ok(Extractor {
        backend,
        prompts: PromptEngine::new()?,
    })
}
