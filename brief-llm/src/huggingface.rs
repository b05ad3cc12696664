use crate::summarizer::{prepare_input, Summarizer, Summary, SummaryParams};
use async_trait::async_trait;
use brief_common::{BriefError, Result};
use brief_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cold models can take a while to load on the hosted API.
const HF_TIMEOUT: Duration = Duration::from_secs(90);

const HEALTH_CHECK_TEXT: &str = "The quick brown fox jumped over the lazy dog while the farmer watched from the porch of the old wooden house.";

/// Client for a hosted summarization pipeline (Hugging Face Inference API).
///
/// The model runs as an unmodified seq2seq summarizer; this type only builds
/// the request and reads `summary_text` back.
pub struct HuggingFaceSummarizer {
    client: HttpClient,
    model: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
    options: HfOptions,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct HfOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct HfSummary {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HfResponse {
    Many(Vec<HfSummary>),
    One(HfSummary),
}

impl HfResponse {
    fn into_text(self) -> Option<String> {
        match self {
            HfResponse::Many(v) => v.into_iter().next().map(|s| s.summary_text),
            HfResponse::One(s) => Some(s.summary_text),
        }
    }
}

impl HuggingFaceSummarizer {
    pub fn new(endpoint: &str, model: String, token: Option<String>) -> Result<Self> {
        let base = format!("{}/", endpoint.trim_end_matches('/'));
        let client = HttpClient::new(&base)
            .map_err(|e| BriefError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(HF_TIMEOUT);

        Ok(Self {
            client,
            model,
            token,
        })
    }

    /// Override the retry budget (tests keep this at zero).
    pub fn with_retries(mut self, n: usize) -> Self {
        self.client = self.client.with_retries(n);
        self
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<Summary> {
        let input = prepare_input(text, params)?;
        let req = HfRequest {
            inputs: &input,
            parameters: HfParameters {
                max_length: params.max_length,
                min_length: params.min_length,
                do_sample: params.do_sample,
            },
            options: HfOptions {
                wait_for_model: true,
            },
        };
        let opts = RequestOpts {
            auth: self.token.as_deref().map(Auth::Bearer),
            ..Default::default()
        };

        let started = std::time::Instant::now();
        let resp: HfResponse = self
            .client
            .post_json_opts(&format!("models/{}", self.model), &req, opts)
            .await
            .map_err(http_to_brief)?;

        let text = resp
            .into_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BriefError::Summarizer("model returned an empty summary".into()))?;

        tracing::info!(
            model = %self.model,
            input_chars = input.len(),
            summary_chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "summarize.done"
        );

        Ok(Summary {
            text,
            model: self.model.clone(),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let params = SummaryParams {
            max_length: 20,
            min_length: 5,
            ..Default::default()
        };
        match self.summarize(HEALTH_CHECK_TEXT, &params).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("HuggingFace health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_brief(e: HttpError) -> BriefError {
    BriefError::Summarizer(format!("{e}"))
}
