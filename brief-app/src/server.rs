use crate::service::{AppError, ArticleSummary, BriefService};
use crate::ui::{self, HeadlineCard, HeadlinePanel, Page};
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use brief_web::HeadlineSource;
use brief_web::headlines::clamp_count;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BriefService>,
    pub default_count: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/summarize", post(summarize_form))
        .route("/headlines/summarize", post(summarize_headline))
        .route("/api/summarize", post(api_summarize))
        .route("/api/headlines", get(api_headlines))
        .route("/healthz", get(healthz))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub source: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    pub url: String,
    pub source: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct HeadlineForm {
    pub link: String,
    pub source: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct HeadlinesQuery {
    pub source: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
}

/// An empty or unknown source means "none selected".
fn parse_source(raw: Option<&str>) -> Option<HeadlineSource> {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| s.parse().ok())
}

async fn build_panel(
    service: &BriefService,
    source: Option<HeadlineSource>,
    count: usize,
) -> HeadlinePanel {
    let Some(source) = source else {
        return HeadlinePanel::NoSource;
    };
    match service.headlines(source, count).await {
        Ok(list) if !list.is_empty() => HeadlinePanel::Cards(
            list.into_iter()
                .map(|headline| HeadlineCard {
                    outcome: service.card_outcome(&headline.link),
                    headline,
                })
                .collect(),
        ),
        Ok(_) => HeadlinePanel::Unavailable,
        Err(e) => {
            tracing::warn!(source = source.slug(), error = %e, "headlines.unavailable");
            HeadlinePanel::Unavailable
        }
    }
}

async fn render_index(
    state: &AppState,
    source: Option<HeadlineSource>,
    count: usize,
    url_input: &str,
    result: Result<Option<ArticleSummary>, AppError>,
) -> Response {
    let (status, result, error) = match result {
        Ok(r) => (StatusCode::OK, r, None),
        Err(e) => (e.status(), None, Some(e.user_message())),
    };
    let panel = build_panel(&state.service, source, count).await;
    let page = Page {
        url_input,
        result: result.as_ref(),
        error,
        source,
        count,
        panel,
        model: state.service.model_name(),
    };
    (status, Html(ui::render(&page))).into_response()
}

async fn index(State(state): State<AppState>, Query(q): Query<IndexQuery>) -> Response {
    let source = parse_source(q.source.as_deref());
    let count = clamp_count(q.count.unwrap_or(state.default_count));
    render_index(&state, source, count, "", Ok(None)).await
}

async fn summarize_form(State(state): State<AppState>, Form(form): Form<SummarizeForm>) -> Response {
    let result = state.service.summarize_url(&form.url).await.map(Some);
    let source = parse_source(form.source.as_deref());
    let count = clamp_count(form.count.unwrap_or(state.default_count));
    render_index(&state, source, count, &form.url, result).await
}

async fn summarize_headline(
    State(state): State<AppState>,
    Form(form): Form<HeadlineForm>,
) -> Redirect {
    // Failures are recorded on the card and rendered after the redirect.
    let _ = state.service.summarize_url(&form.link).await;
    let count = clamp_count(form.count.unwrap_or(state.default_count));
    let source = parse_source(form.source.as_deref())
        .map(|s| s.slug())
        .unwrap_or_default();
    Redirect::to(&format!("/?source={source}&count={count}"))
}

async fn api_summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<ArticleSummary>, AppError> {
    state.service.summarize_url(&req.url).await.map(Json)
}

async fn api_headlines(
    State(state): State<AppState>,
    Query(q): Query<HeadlinesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let source = match q.source.as_deref() {
        None => HeadlineSource::HackerNews,
        Some(raw) => raw.parse::<HeadlineSource>().map_err(AppError::InvalidInput)?,
    };
    let count = q.count.unwrap_or(state.default_count);
    let headlines = state.service.headlines(source, count).await?;
    Ok(Json(headlines))
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.service.model_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_unknown_sources_are_unselected() {
        assert_eq!(parse_source(None), None);
        assert_eq!(parse_source(Some("")), None);
        assert_eq!(parse_source(Some("bbc")), None);
        assert_eq!(
            parse_source(Some("hacker-news")),
            Some(HeadlineSource::HackerNews)
        );
    }
}
