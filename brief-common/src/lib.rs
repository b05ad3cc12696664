//! Common types and utilities shared across Brief crates.
//!
//! This crate defines the summarizer configuration, observability helpers, and
//! the shared error type used throughout the Brief workspace. It is kept
//! dependency‑minimal so every crate can depend on it cheaply.
//!
//! # Overview
//!
//! - [`SummarizerConfig`]: provider‑agnostic summarization model configuration
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`BriefError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use brief_common::{Provider, SummarizerConfig};
//!
//! let cfg = SummarizerConfig::default();
//! assert_eq!(cfg.provider, Provider::HuggingFace);
//! assert_eq!(cfg.model(), "sshleifer/distilbart-cnn-12-6");
//! assert_eq!(cfg.max_length, 130);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Default summarization model, served by the Hugging Face Inference API.
pub const DEFAULT_HF_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
pub const DEFAULT_HF_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Which backend hosts the pre-trained summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Dedicated summarization pipeline (BART-style seq2seq models).
    #[default]
    #[serde(alias = "hf")]
    HuggingFace,
    /// Chat model prompted to summarize.
    OpenAi,
    /// Local chat model prompted to summarize.
    Ollama,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Provider::HuggingFace => "huggingface",
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

/// Configuration for the summarization model.
///
/// `model` and `endpoint` fall back to per-provider defaults when unset.
/// See the `brief-llm` crate for the concrete clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub provider: Provider,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    /// Upper bound on summary length, in model tokens.
    pub max_length: u32,
    /// Lower bound on summary length, in model tokens.
    pub min_length: u32,
    /// Article text beyond this many characters is cut before inference.
    pub max_input_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: Provider::HuggingFace,
            model: None,
            endpoint: None,
            auth_token: None,
            max_length: 130,
            min_length: 30,
            max_input_chars: 4000,
        }
    }
}

impl SummarizerConfig {
    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(m), _) if !m.trim().is_empty() => m.trim(),
            (_, Provider::HuggingFace) => DEFAULT_HF_MODEL,
            (_, Provider::OpenAi) => DEFAULT_OPENAI_MODEL,
            (_, Provider::Ollama) => DEFAULT_OLLAMA_MODEL,
        }
    }

    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.provider) {
            (Some(e), _) if !e.trim().is_empty() => e.trim(),
            (_, Provider::HuggingFace) => DEFAULT_HF_ENDPOINT,
            (_, Provider::OpenAi) => DEFAULT_OPENAI_ENDPOINT,
            (_, Provider::Ollama) => DEFAULT_OLLAMA_ENDPOINT,
        }
    }

    /// Token with surrounding whitespace removed; blank tokens count as unset.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Error types used across the Brief system.
#[derive(thiserror::Error, Debug)]
pub enum BriefError {
    /// The summarization model failed or returned something unusable.
    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// Input text was too short to be worth summarizing.
    #[error("Not enough content to generate a summary.")]
    NotEnoughContent,

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`BriefError`].
pub type Result<T> = std::result::Result<T, BriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_follow_provider() {
        let cfg = SummarizerConfig {
            provider: Provider::Ollama,
            ..Default::default()
        };
        assert_eq!(cfg.model(), DEFAULT_OLLAMA_MODEL);
        assert_eq!(cfg.endpoint(), DEFAULT_OLLAMA_ENDPOINT);
    }

    #[test]
    fn explicit_model_wins_and_blank_is_ignored() {
        let mut cfg = SummarizerConfig {
            model: Some(" facebook/bart-large-cnn ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.model(), "facebook/bart-large-cnn");

        cfg.model = Some("   ".into());
        assert_eq!(cfg.model(), DEFAULT_HF_MODEL);
    }

    #[test]
    fn blank_token_is_none() {
        let cfg = SummarizerConfig {
            auth_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(cfg.auth_token().is_none());
    }

    #[test]
    fn provider_parses_lowercase_and_alias() {
        let p: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(p, Provider::OpenAi);
        let p: Provider = serde_json::from_str("\"hf\"").unwrap();
        assert_eq!(p, Provider::HuggingFace);
        assert_eq!(Provider::HuggingFace.to_string(), "huggingface");
    }

    #[test]
    fn token_is_never_serialized() {
        let cfg = SummarizerConfig {
            auth_token: Some("hf_secret".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("hf_secret"));
    }
}
