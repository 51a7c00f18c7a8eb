//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::{gemini, openai, GeminiClient, Generator, ImageGenerator, OpenAiClient, Resilient, RetryPolicy};

/// Provider and storage settings. Every field has a default so the server
/// always starts; missing credentials surface on the first generation call.
#[derive(Clone, Debug)]
pub struct Config {
    /// From OPENAI_API_KEY
    pub openai_api_key: Option<String>,
    /// From OPENAI_MODEL
    pub openai_model: String,
    /// From OPENAI_BASE_URL
    pub openai_base_url: String,
    /// From GEMINI_API_KEY
    pub gemini_api_key: Option<String>,
    /// From GEMINI_BASE_URL
    pub gemini_base_url: String,
    /// From IDEA_SHAPER_LLM_TIMEOUT_SECS, IDEA_SHAPER_LLM_RETRIES and IDEA_SHAPER_LLM_BACKOFF_MS
    pub retry: RetryPolicy,
    /// From IDEA_SHAPER_DB_PATH; the platform data directory when unset
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: openai::DEFAULT_MODEL.to_string(),
            openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            db_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let retry = RetryPolicy {
            timeout: parse_or(&lookup, "IDEA_SHAPER_LLM_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry.timeout),
            max_retries: parse_or(&lookup, "IDEA_SHAPER_LLM_RETRIES")
                .unwrap_or(defaults.retry.max_retries),
            base_backoff: parse_or(&lookup, "IDEA_SHAPER_LLM_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.base_backoff),
        };

        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_base_url: non_empty("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            retry,
            db_path: non_empty("IDEA_SHAPER_DB_PATH").map(PathBuf::from),
        }
    }

    /// Text generator with the retry policy applied.
    pub fn generator(&self) -> Arc<dyn Generator> {
        let client = OpenAiClient::new(self.openai_api_key.clone())
            .with_model(self.openai_model.clone())
            .with_base_url(self.openai_base_url.clone());
        if self.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; generation requests will fail");
        }
        Arc::new(Resilient::new(Arc::new(client), self.retry))
    }

    /// Image generator with the retry policy applied.
    pub fn image_generator(&self) -> Arc<dyn ImageGenerator> {
        let client = GeminiClient::new(self.gemini_api_key.clone())
            .with_base_url(self.gemini_base_url.clone());
        if self.gemini_api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; image requests will fail");
        }
        Arc::new(Resilient::new(Arc::new(client), self.retry))
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}='{}'", key, raw);
            None
        }
    }
}
