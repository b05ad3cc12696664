//! Summarization seam shared by every model backend.

use crate::backend::{PromptBackend, PromptRequest};
use async_trait::async_trait;
use brief_common::{BriefError, Result, SummarizerConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shorter inputs are rejected with [`BriefError::NotEnoughContent`].
pub const MIN_SUMMARY_INPUT_CHARS: usize = 50;

/// Generation knobs, in the units of the summarization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
    pub max_input_chars: usize,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 130,
            min_length: 30,
            do_sample: false,
            max_input_chars: 4000,
        }
    }
}

impl SummaryParams {
    pub fn from_config(cfg: &SummarizerConfig) -> Self {
        Self {
            max_length: cfg.max_length,
            min_length: cfg.min_length,
            do_sample: false,
            max_input_chars: cfg.max_input_chars,
        }
    }

    /// Generation cap for prompted models, leaving room for a lead-in.
    pub fn max_new_tokens(&self) -> u32 {
        self.max_length.saturating_mul(2)
    }

    /// Greedy decoding unless sampling is on.
    pub fn temperature(&self) -> f32 {
        if self.do_sample { 0.7 } else { 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    pub model: String,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text`; fails with `NotEnoughContent` for trivially short input.
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<Summary>;

    async fn health_check(&self) -> Result<bool>;

    fn model_name(&self) -> &str;
}

/// Trim the input, reject short text, and cut overlong text on a word boundary.
///
/// ```
/// use brief_llm::summarizer::{prepare_input, SummaryParams};
///
/// let params = SummaryParams { max_input_chars: 60, ..Default::default() };
/// let text = "word ".repeat(40);
/// let prepared = prepare_input(&text, &params).unwrap();
/// assert!(prepared.chars().count() <= 60);
/// assert!(prepared.ends_with("word"));
/// ```
pub fn prepare_input(text: &str, params: &SummaryParams) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_SUMMARY_INPUT_CHARS {
        return Err(BriefError::NotEnoughContent);
    }
    let Some((cut, _)) = trimmed.char_indices().nth(params.max_input_chars) else {
        return Ok(trimmed.to_string());
    };

    let head = &trimmed[..cut];
    let on_boundary = trimmed[cut..].starts_with(char::is_whitespace);
    let head = match head.rfind(char::is_whitespace) {
        Some(ws) if ws > 0 && !on_boundary => &head[..ws],
        _ => head,
    };
    tracing::debug!(
        input_chars = trimmed.chars().count(),
        kept_chars = head.chars().count(),
        "summarize.input.truncated"
    );
    Ok(head.trim_end().to_string())
}

const SUMMARY_SYSTEM_PROMPT: &str = r#"You are a news editor who writes short, neutral summaries of articles.

Rules:
- Summarize only what the article says; do not add facts or opinions
- Write one paragraph of plain prose, no headings, lists, or preamble
- Keep names, numbers, and dates exactly as written in the article"#;

/// Adapts a chat-style [`PromptBackend`] into a [`Summarizer`] by prompting.
pub struct LlmSummarizer {
    backend: Arc<dyn PromptBackend + Send + Sync>,
}

impl LlmSummarizer {
    pub fn new(backend: Arc<dyn PromptBackend + Send + Sync>) -> Self {
        Self { backend }
    }

    fn build_prompt(text: &str, params: &SummaryParams) -> String {
        // Pipeline lengths are in tokens; roughly three words per four tokens.
        let min_words = params.min_length * 3 / 4;
        let max_words = params.max_length * 3 / 4;
        format!(
            "Summarize the following news article in {min_words} to {max_words} words.\n\nARTICLE:\n{text}\n\nSummary:"
        )
    }
}

fn clean_summary(raw: &str) -> String {
    let t = raw.trim();
    let t = t
        .strip_prefix("Summary:")
        .or_else(|| t.strip_prefix("**Summary:**"))
        .unwrap_or(t);
    t.trim().trim_matches('"').trim().to_string()
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<Summary> {
        let input = prepare_input(text, params)?;
        let prompt = Self::build_prompt(&input, params);
        let resp = self
            .backend
            .complete(&PromptRequest::new(SUMMARY_SYSTEM_PROMPT, &prompt, params))
            .await?;

        let text = clean_summary(&resp.text);
        if text.is_empty() {
            return Err(BriefError::Summarizer(
                "model returned an empty summary".into(),
            ));
        }
        Ok(Summary {
            text,
            model: resp
                .model
                .unwrap_or_else(|| self.backend.model_name().to_string()),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }

    fn model_name(&self) -> &str {
        self.backend.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Completion;
    use std::sync::Mutex;

    struct RecordingLlm {
        reply: String,
        seen: Mutex<Vec<(String, u32, f32)>>,
    }

    #[async_trait]
    impl PromptBackend for RecordingLlm {
        async fn complete(&self, req: &PromptRequest<'_>) -> Result<Completion> {
            assert_eq!(req.system, SUMMARY_SYSTEM_PROMPT);
            self.seen
                .lock()
                .unwrap()
                .push((req.prompt.to_string(), req.max_tokens, req.temperature));
            Ok(Completion {
                text: self.reply.clone(),
                model: None,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn article() -> String {
        "The city council approved the new transit budget on Tuesday after a long debate. "
            .repeat(3)
    }

    #[test]
    fn short_input_is_not_enough_content() {
        let err = prepare_input("   tiny text   ", &SummaryParams::default()).unwrap_err();
        assert!(matches!(err, BriefError::NotEnoughContent));
        assert_eq!(err.to_string(), "Not enough content to generate a summary.");
    }

    #[test]
    fn input_within_budget_is_only_trimmed() {
        let text = format!("  {}  ", article());
        let prepared = prepare_input(&text, &SummaryParams::default()).unwrap();
        assert_eq!(prepared, article().trim());
    }

    #[test]
    fn truncation_never_splits_multibyte_chars() {
        let params = SummaryParams {
            max_input_chars: 101,
            ..Default::default()
        };
        let text = "ééééé ".repeat(40);
        let prepared = prepare_input(&text, &params).unwrap();
        assert_eq!(prepared.chars().count(), 101);
        assert!(prepared.ends_with('é'));
    }

    #[test]
    fn budget_counts_chars_not_bytes() {
        // Two bytes per char: 2,999 chars is ~6 KB but inside the 4,000-char budget.
        let text = "Новости дня ".repeat(250);
        let text = text.trim();
        assert!(text.len() > SummaryParams::default().max_input_chars);

        let prepared = prepare_input(text, &SummaryParams::default()).unwrap();
        assert_eq!(prepared.chars().count(), text.chars().count());

        let params = SummaryParams {
            max_input_chars: 30,
            ..Default::default()
        };
        let prepared = prepare_input(text, &params).unwrap();
        assert!(prepared.chars().count() <= 30);
        assert!(prepared.ends_with("дня"));
    }

    #[test]
    fn params_follow_config() {
        let cfg = SummarizerConfig {
            max_length: 90,
            min_length: 20,
            max_input_chars: 1000,
            ..Default::default()
        };
        let p = SummaryParams::from_config(&cfg);
        assert_eq!((p.max_length, p.min_length, p.max_input_chars), (90, 20, 1000));
        assert!(!p.do_sample);
    }

    #[test]
    fn clean_summary_strips_labels_and_quotes() {
        assert_eq!(clean_summary("  Summary: \"Budget passed.\" "), "Budget passed.");
        assert_eq!(clean_summary("**Summary:** Budget passed."), "Budget passed.");
    }

    #[tokio::test]
    async fn llm_summarizer_prompts_deterministically() {
        let llm = Arc::new(RecordingLlm {
            reply: "Summary: The council approved the transit budget.".into(),
            seen: Mutex::new(Vec::new()),
        });
        let summarizer = LlmSummarizer::new(llm.clone());

        let summary = summarizer
            .summarize(&article(), &SummaryParams::default())
            .await
            .unwrap();

        assert_eq!(summary.text, "The council approved the transit budget.");
        assert_eq!(summary.model, "recording");

        let seen = llm.seen.lock().unwrap();
        let (prompt, max_tokens, temperature) = &seen[0];
        assert!(prompt.contains("22 to 97 words"));
        assert!(prompt.contains("transit budget"));
        assert_eq!(*max_tokens, 260);
        assert_eq!(*temperature, 0.0);
    }

    #[tokio::test]
    async fn sampling_and_length_reach_the_backend() {
        let llm = Arc::new(RecordingLlm {
            reply: "The council approved the transit budget.".into(),
            seen: Mutex::new(Vec::new()),
        });
        let params = SummaryParams {
            max_length: 60,
            min_length: 20,
            do_sample: true,
            ..Default::default()
        };
        LlmSummarizer::new(llm.clone())
            .summarize(&article(), &params)
            .await
            .unwrap();

        let seen = llm.seen.lock().unwrap();
        let (prompt, max_tokens, temperature) = &seen[0];
        assert!(prompt.contains("15 to 45 words"));
        assert_eq!(*max_tokens, 120);
        assert_eq!(*temperature, 0.7);
    }

    #[tokio::test]
    async fn empty_model_output_is_an_error() {
        let llm = Arc::new(RecordingLlm {
            reply: "   ".into(),
            seen: Mutex::new(Vec::new()),
        });
        let err = LlmSummarizer::new(llm)
            .summarize(&article(), &SummaryParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BriefError::Summarizer(_)));
    }
}
