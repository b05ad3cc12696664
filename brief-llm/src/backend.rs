//! Prompted generation backends that [`crate::summarizer::LlmSummarizer`] drives.

use crate::summarizer::SummaryParams;
use async_trait::async_trait;
use brief_common::Result;

/// One prompt plus the generation limits derived from [`SummaryParams`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    /// Cap on generated tokens (`max_output_tokens`, `num_predict`).
    pub max_tokens: u32,
    pub temperature: f32,
}

impl<'a> PromptRequest<'a> {
    pub fn new(system: &'a str, prompt: &'a str, params: &SummaryParams) -> Self {
        Self {
            system,
            prompt,
            max_tokens: params.max_new_tokens(),
            temperature: params.temperature(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Model reported by the server, when it differs from the requested one.
    pub model: Option<String>,
}

/// A chat or completion model reachable over HTTP.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    async fn complete(&self, req: &PromptRequest<'_>) -> Result<Completion>;

    async fn health_check(&self) -> Result<bool>;

    fn model_name(&self) -> &str;
}
