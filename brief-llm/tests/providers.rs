mod common;

use brief_common::{BriefError, Provider, SummarizerConfig};
use brief_llm::huggingface::HuggingFaceSummarizer;
use brief_llm::ollama::OllamaClient;
use brief_llm::openai::OpenAiClient;
use brief_llm::backend::{PromptBackend, PromptRequest};
use brief_llm::{ensure_summarizer_ready, Summarizer, SummaryParams};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = "Engineers at the regional utility finished replacing the aging \
water main under Elm Street on Friday, two weeks ahead of schedule. Residents had endured \
low pressure for most of the summer. The utility said the new pipe should last eighty years.";

#[tokio::test]
async fn huggingface_sends_pipeline_parameters() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/sshleifer/distilbart-cnn-12-6"))
        .and(header("authorization", "Bearer hf_test"))
        .and(body_partial_json(json!({
            "parameters": {"max_length": 130, "min_length": 30, "do_sample": false},
            "options": {"wait_for_model": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"summary_text": " The Elm Street water main was replaced early. "}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let summarizer = HuggingFaceSummarizer::new(
        &server.uri(),
        "sshleifer/distilbart-cnn-12-6".into(),
        Some("hf_test".into()),
    )
    .unwrap();

    let summary = summarizer
        .summarize(ARTICLE, &SummaryParams::default())
        .await
        .expect("summary");

    assert_eq!(summary.text, "The Elm Street water main was replaced early.");
    assert_eq!(summary.model, "sshleifer/distilbart-cnn-12-6");
}

#[tokio::test]
async fn huggingface_errors_become_summarizer_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Input is too long"})),
        )
        .mount(&server)
        .await;

    let summarizer = HuggingFaceSummarizer::new(&server.uri(), "m/n".into(), None)
        .unwrap()
        .with_retries(0);
    let err = summarizer
        .summarize(ARTICLE, &SummaryParams::default())
        .await
        .unwrap_err();

    match err {
        BriefError::Summarizer(msg) => assert!(msg.contains("Input is too long")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn huggingface_rejects_short_input_without_calling_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summarizer = HuggingFaceSummarizer::new(&server.uri(), "m/n".into(), None).unwrap();
    let err = summarizer
        .summarize("Too short.", &SummaryParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BriefError::NotEnoughContent));
}

#[tokio::test]
async fn openai_sends_limits_and_reads_output_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "instructions": "be brief",
            "max_output_tokens": 50,
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "status": "completed",
            "model": "gpt-4o-mini-2024-07-18",
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "Short "},
                    {"type": "output_text", "text": "answer."}
                ]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::with_base_url(
        "sk-test".into(),
        "gpt-4o-mini".into(),
        &format!("{}/v1", server.uri()),
    )
    .unwrap();
    let params = SummaryParams {
        max_length: 25,
        ..Default::default()
    };
    let resp = client
        .complete(&PromptRequest::new("be brief", "hello", &params))
        .await
        .unwrap();

    assert_eq!(resp.text, "Short answer.");
    assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini-2024-07-18"));
}

#[tokio::test]
async fn openai_health_looks_up_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/gpt-4o-mini"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "gpt-4o-mini"})))
        .mount(&server)
        .await;

    let base = format!("{}/v1", server.uri());
    let known = OpenAiClient::with_base_url("sk-test".into(), "gpt-4o-mini".into(), &base).unwrap();
    assert!(known.health_check().await.unwrap());

    let unknown = OpenAiClient::with_base_url("sk-test".into(), "no-such-model".into(), &base).unwrap();
    assert!(!unknown.health_check().await.unwrap());
}

#[tokio::test]
async fn ollama_pulls_missing_model_then_summarizes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"models": [{"name": "other:latest"}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(json!({"model": "llama3.2:3b", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.2:3b",
            "stream": false,
            "options": {"num_predict": 200, "temperature": 0.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Summary: The Elm Street main was replaced early.",
            "eval_count": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = SummarizerConfig {
        provider: Provider::Ollama,
        model: Some("llama3.2:3b".into()),
        endpoint: Some(server.uri()),
        max_length: 100,
        ..Default::default()
    };
    let summarizer = ensure_summarizer_ready(&cfg).await.expect("ollama ready");
    let summary = summarizer
        .summarize(ARTICLE, &SummaryParams::from_config(&cfg))
        .await
        .expect("summary");

    assert_eq!(summary.text, "The Elm Street main was replaced early.");
    assert_eq!(summary.model, "llama3.2:3b");
}

#[tokio::test]
async fn ollama_without_server_is_a_clear_error() {
    let err = match OllamaClient::new("http://127.0.0.1:9", "llama3.2:3b".into()).await {
        Ok(_) => panic!("expected connection error"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("ollama serve"));
}

#[tokio::test]
async fn ensure_ready_requires_openai_token() {
    let cfg = SummarizerConfig {
        provider: Provider::OpenAi,
        ..Default::default()
    };
    let err = match ensure_summarizer_ready(&cfg).await {
        Ok(_) => panic!("expected configuration error"),
        Err(e) => e,
    };
    assert!(matches!(err, BriefError::Config(_)));
}

#[tokio::test]
async fn ensure_ready_builds_default_huggingface() {
    let summarizer = ensure_summarizer_ready(&SummarizerConfig::default())
        .await
        .expect("hf summarizer");
    assert_eq!(summarizer.model_name(), "sshleifer/distilbart-cnn-12-6");
}
