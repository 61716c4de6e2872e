//! Extractor configuration loaded from the environment.

use std::time::Duration;

use crate::error::ExtractError;

/// Default model name for `OpenAI`-compatible endpoints.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default request deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for the extraction backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Which wire protocol to speak.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.deepseek.com/v1`).
    pub api_url: String,
    /// API key. Required for [`BackendType::OpenAi`]; the proxy holds its own.
    pub api_key: Option<String>,
    /// Model identifier sent with each request.
    pub model: String,
    /// Deadline for one extraction call.
    pub timeout: Duration,
}

/// Supported extraction backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions API (`OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// A chat proxy that holds the provider key and answers `{ "text" }`.
    Proxy,
}

impl std::str::FromStr for BackendType {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "deepseek" => Ok(Self::OpenAi),
            "proxy" => Ok(Self::Proxy),
            other => Err(ExtractError::Config(format!(
                "unknown EXTRACTOR_BACKEND {other:?} (expected openai or proxy)"
            ))),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `EXTRACTOR_API_URL` -- base URL of the backend
    /// - `EXTRACTOR_API_KEY` -- API key (only for the `openai` backend)
    ///
    /// Optional variables:
    /// - `EXTRACTOR_BACKEND` -- `openai` (default) or `proxy`
    /// - `EXTRACTOR_MODEL` -- model name (default `deepseek-chat`)
    /// - `EXTRACTOR_TIMEOUT_MS` -- request deadline (default 30000)
    pub fn from_env() -> Result<Self, ExtractError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ExtractError> {
        let backend_type = lookup("EXTRACTOR_BACKEND")
            .map_or(Ok(BackendType::OpenAi), |raw| raw.parse())?;

        let api_url = lookup("EXTRACTOR_API_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ExtractError::Config("missing env var: EXTRACTOR_API_URL".to_owned()))?;

        let api_key = lookup("EXTRACTOR_API_KEY").filter(|key| !key.is_empty());
        if backend_type == BackendType::OpenAi && api_key.is_none() {
            return Err(ExtractError::Config(
                "missing env var: EXTRACTOR_API_KEY".to_owned(),
            ));
        }

        let model = lookup("EXTRACTOR_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let timeout_ms: u64 = lookup("EXTRACTOR_TIMEOUT_MS")
            .map_or(Ok(DEFAULT_TIMEOUT_MS), |raw| raw.parse())
            .map_err(|e| ExtractError::Config(format!("invalid EXTRACTOR_TIMEOUT_MS: {e}")))?;
        if timeout_ms == 0 {
            return Err(ExtractError::Config(
                "EXTRACTOR_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            backend_type,
            api_url,
            api_key,
            model,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn openai_defaults() {
        let config = ExtractorConfig::from_lookup(lookup(&[
            ("EXTRACTOR_API_URL", "https://api.deepseek.com/v1/"),
            ("EXTRACTOR_API_KEY", "sk-test"),
        ]));
        let Ok(config) = config else {
            panic!("expected config, got {config:?}");
        };
        assert_eq!(config.backend_type, BackendType::OpenAi);
        assert_eq!(config.api_url, "https://api.deepseek.com/v1");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn proxy_needs_no_key() {
        let config = ExtractorConfig::from_lookup(lookup(&[
            ("EXTRACTOR_BACKEND", "Proxy"),
            ("EXTRACTOR_API_URL", "http://localhost:3000/api"),
            ("EXTRACTOR_TIMEOUT_MS", "5000"),
        ]));
        assert!(matches!(
            config,
            Ok(ExtractorConfig {
                backend_type: BackendType::Proxy,
                api_key: None,
                ..
            })
        ));
    }

    #[test]
    fn missing_or_bad_values_are_rejected() {
        assert!(ExtractorConfig::from_lookup(lookup(&[])).is_err());
        assert!(
            ExtractorConfig::from_lookup(lookup(&[("EXTRACTOR_API_URL", "http://x")])).is_err()
        );
        assert!(
            ExtractorConfig::from_lookup(lookup(&[
                ("EXTRACTOR_BACKEND", "gemini"),
                ("EXTRACTOR_API_URL", "http://x"),
            ]))
            .is_err()
        );
        assert!(
            ExtractorConfig::from_lookup(lookup(&[
                ("EXTRACTOR_BACKEND", "proxy"),
                ("EXTRACTOR_API_URL", "http://x"),
                ("EXTRACTOR_TIMEOUT_MS", "0"),
            ]))
            .is_err()
        );
    }
}
