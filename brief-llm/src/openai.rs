use crate::backend::{Completion, PromptBackend, PromptRequest};
use async_trait::async_trait;
use brief_common::{BriefError, DEFAULT_OPENAI_ENDPOINT, Result};
use brief_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_TIMEOUT: Duration = Duration::from_secs(60);

/// Summaries through the OpenAI Responses API, or any gateway speaking it.
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ResponsesReply {
    model: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputPart>,
}

#[derive(Deserialize)]
struct OutputPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesReply {
    /// Concatenated `output_text` parts of every message item.
    fn text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| &item.content)
            .filter(|part| part.kind == "output_text")
            .map(|part| part.text.as_str())
            .collect()
    }
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_OPENAI_ENDPOINT)
    }

    pub fn with_base_url(api_key: String, model: String, base_url: &str) -> Result<Self> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let client = HttpClient::new(&base)
            .map_err(|e| BriefError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(OPENAI_TIMEOUT);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn opts(&self) -> RequestOpts<'_> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.api_key)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PromptBackend for OpenAiClient {
    async fn complete(&self, req: &PromptRequest<'_>) -> Result<Completion> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: req.system,
            input: req.prompt,
            max_output_tokens: req.max_tokens,
            temperature: req.temperature,
        };
        let reply: ResponsesReply = self
            .client
            .post_json_opts("responses", &body, self.opts())
            .await
            .map_err(http_to_brief)?;

        if reply.status == "incomplete" {
            tracing::warn!(model = %reply.model, max_tokens = req.max_tokens, "openai.summary.truncated");
        }
        Ok(Completion {
            text: reply.text(),
            model: Some(reply.model),
        })
    }

    /// Looks the model up instead of spending tokens on a test prompt.
    async fn health_check(&self) -> Result<bool> {
        let path = format!("models/{}", self.model);
        match self
            .client
            .get_json::<serde_json::Value>(&path, self.opts())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "openai.health.failed");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_brief(e: HttpError) -> BriefError {
    BriefError::Summarizer(e.to_string())
}
