mod common;
use brief_common::Result;
use brief_llm::openai::OpenAiClient;
use brief_llm::summarizer::LlmSummarizer;
use brief_llm::{Summarizer, SummaryParams};
use std::sync::Arc;

const MODEL: &str = "gpt-4o-mini";

const ARTICLE: &str = "The city council voted 7-2 on Tuesday to approve a $40 million \
expansion of the downtown light rail line. Construction is expected to begin next spring \
and finish within three years. Supporters said the project would cut commute times, while \
opponents questioned ridership forecasts and the cost to local taxpayers.";

#[tokio::test]
#[ignore]
async fn openai_summarize_smoketest() -> Result<()> {
    common::init_test_tracing();
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        tracing::debug!("Skipping: OPENAI_API_KEY not set");
        return Ok(());
    };

    let client = OpenAiClient::new(key, MODEL.to_string())?;
    let summarizer = LlmSummarizer::new(Arc::new(client));
    let summary = summarizer
        .summarize(ARTICLE, &SummaryParams::default())
        .await?;

    tracing::debug!("OpenAi summary is: {}", summary.text);
    assert!(!summary.text.trim().is_empty(), "summary should not be empty");
    Ok(())
}

#[tokio::test]
#[ignore]
async fn huggingface_summarize_smoketest() -> Result<()> {
    common::init_test_tracing();
    let token = std::env::var("HF_TOKEN").ok();
    let summarizer = brief_llm::huggingface::HuggingFaceSummarizer::new(
        brief_common::DEFAULT_HF_ENDPOINT,
        brief_common::DEFAULT_HF_MODEL.to_string(),
        token,
    )?;
    let summary = summarizer
        .summarize(ARTICLE, &SummaryParams::default())
        .await?;
    assert!(!summary.text.trim().is_empty());
    Ok(())
}
