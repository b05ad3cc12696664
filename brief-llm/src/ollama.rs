use crate::backend::{Completion, PromptBackend, PromptRequest};
use async_trait::async_trait;
use brief_common::{BriefError, Result};
use brief_http::{HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str =
    "No running Ollama server detected. Start it with `ollama serve`.";

/// Local generation can be slow on CPU.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(180);
/// Pulling a model downloads gigabytes.
const PULL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Summaries from a local Ollama server.
pub struct OllamaClient {
    client: HttpClient,
    model: String,
}

#[derive(Deserialize)]
struct Tags {
    #[serde(default)]
    models: Vec<Tag>,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

impl OllamaClient {
    /// Connect to `base_url`, pulling `model` if the server lacks it.
    pub async fn new(base_url: &str, model: String) -> Result<Self> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let client = HttpClient::new(&base)
            .map_err(|e| BriefError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(GENERATE_TIMEOUT)
            .with_retries(0);
        let ollama = Self { client, model };

        if !ollama.has_model().await? {
            ollama.pull().await?;
        }
        Ok(ollama)
    }

    async fn has_model(&self) -> Result<bool> {
        let tags: Tags = self
            .client
            .get_json("api/tags", RequestOpts::default())
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "ollama.tags.failed");
                BriefError::Summarizer(OLLAMA_CONNECTION_ERROR.to_string())
            })?;

        // Bare names carry an implicit `:latest` tag.
        let tagged = if self.model.contains(':') {
            self.model.clone()
        } else {
            format!("{}:latest", self.model)
        };
        Ok(tags
            .models
            .iter()
            .any(|t| t.name == self.model || t.name == tagged))
    }

    async fn pull(&self) -> Result<()> {
        tracing::info!(model = %self.model, "ollama.pull.start");
        let opts = RequestOpts {
            timeout: Some(PULL_TIMEOUT),
            ..Default::default()
        };
        let body = PullRequest {
            model: &self.model,
            stream: false,
        };
        self.client
            .post_json_opts::<_, serde_json::Value>("api/pull", &body, opts)
            .await
            .map_err(|e| BriefError::Summarizer(format!("pulling {}: {e}", self.model)))?;
        tracing::info!(model = %self.model, "ollama.pull.done");
        Ok(())
    }
}

#[async_trait]
impl PromptBackend for OllamaClient {
    async fn complete(&self, req: &PromptRequest<'_>) -> Result<Completion> {
        let body = GenerateRequest {
            model: &self.model,
            system: req.system,
            prompt: req.prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: req.max_tokens,
                temperature: req.temperature,
            },
        };
        let reply: GenerateReply = self
            .client
            .post_json_opts("api/generate", &body, RequestOpts::default())
            .await
            .map_err(http_to_brief)?;

        Ok(Completion {
            text: reply.response,
            model: None,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.has_model().await.unwrap_or(false))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_brief(e: HttpError) -> BriefError {
    BriefError::Summarizer(e.to_string())
}
