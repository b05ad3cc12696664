//! Provider‑agnostic summarization for Brief.
//!
//! The [`summarizer::Summarizer`] trait is the seam the app talks to. Two
//! families sit behind it:
//!
//! - [`huggingface::HuggingFaceSummarizer`]: a hosted summarization pipeline
//!   (BART-style model, `summary_text` output)
//! - [`summarizer::LlmSummarizer`]: any [`backend::PromptBackend`] (OpenAI,
//!   Ollama) prompted to summarize
//!
//! [`ensure_summarizer_ready`] builds whichever one the configuration names.
//!
//! # Examples
//! ```no_run
//! use brief_common::{Result, SummarizerConfig};
//! use brief_llm::ensure_summarizer_ready;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = SummarizerConfig::default();
//! let summarizer = ensure_summarizer_ready(&cfg).await?;
//! assert_eq!(summarizer.model_name(), "sshleifer/distilbart-cnn-12-6");
//! # Ok(())
//! # }
//! ```
pub mod backend;
pub mod huggingface;
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;
pub mod summarizer;

use brief_common::{BriefError, Provider, SummarizerConfig};
use huggingface::HuggingFaceSummarizer;
use std::sync::Arc;

pub use summarizer::{Summarizer, Summary, SummaryParams};

/// Build the configured summarizer, making sure its model is usable.
///
/// Ollama must list the model or it is pulled; hosted providers are
/// constructed lazily and fail on first use instead.
pub async fn ensure_summarizer_ready(
    config: &SummarizerConfig,
) -> brief_common::Result<Arc<dyn Summarizer + Send + Sync + 'static>> {
    let model = config.model().to_string();
    tracing::info!(
        provider = %config.provider,
        model = %model,
        endpoint = %config.endpoint(),
        "summarizer.loading"
    );

    let summarizer: Arc<dyn Summarizer + Send + Sync> = match config.provider {
        Provider::HuggingFace => Arc::new(HuggingFaceSummarizer::new(
            config.endpoint(),
            model,
            config.auth_token().map(str::to_string),
        )?),
        #[cfg(feature = "openai")]
        Provider::OpenAi => {
            let api_key = config.auth_token().ok_or_else(|| {
                BriefError::Config("summarizer.auth_token is required for openai".into())
            })?;
            let client =
                openai::OpenAiClient::with_base_url(api_key.to_string(), model, config.endpoint())?;
            Arc::new(summarizer::LlmSummarizer::new(Arc::new(client)))
        }
        #[cfg(feature = "ollama")]
        Provider::Ollama => {
            let client = ollama::OllamaClient::new(config.endpoint(), model).await?;
            Arc::new(summarizer::LlmSummarizer::new(Arc::new(client)))
        }
        #[allow(unreachable_patterns)]
        other => {
            return Err(BriefError::Config(format!(
                "summarizer provider `{other}` not enabled in this build"
            )))
        }
    };

    tracing::info!(model = %summarizer.model_name(), "summarizer.ready");
    Ok(summarizer)
}
