//! Fetch → extract → summarize, with caching at each stage.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brief_common::BriefError;
use brief_config::BriefConfig;
use brief_llm::{Summarizer, Summary, SummaryParams};
use brief_web::headlines::clamp_count;
use brief_web::{
    Article, ExtractError, FetchError, Headline, HeadlineFetcher, HeadlineSource, PageFetcher,
    TtlCache, extract_article, parse_article_url,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Shown on a headline card when the link did not yield an article.
pub const NOT_AN_ARTICLE: &str = "Could not retrieve meaningful article content for summarization (link may not be a standard article).";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Summarize(#[from] BriefError),
    #[error("{0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Extract(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Summarize(BriefError::NotEnoughContent) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Summarize(BriefError::Config(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Summarize(BriefError::Summarizer(_)) => StatusCode::BAD_GATEWAY,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable tag for the JSON API.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "fetch",
            AppError::Extract(_) => "extract",
            AppError::Summarize(BriefError::NotEnoughContent) => "not_enough_content",
            AppError::Summarize(_) => "summarize",
            AppError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Message for the page's error banner.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Fetch(e) => format!("Could not fetch the article: {e}"),
            AppError::Extract(e) => format!("Could not extract article text: {e}"),
            AppError::Summarize(e) => summarize_message(e),
            AppError::InvalidInput(msg) => msg.clone(),
        }
    }

    /// Shorter message for a headline card.
    pub fn card_message(&self) -> String {
        match self {
            AppError::Fetch(_) | AppError::Extract(_) | AppError::InvalidInput(_) => {
                NOT_AN_ARTICLE.to_string()
            }
            AppError::Summarize(e) => summarize_message(e),
        }
    }
}

fn summarize_message(e: &BriefError) -> String {
    match e {
        BriefError::NotEnoughContent => e.to_string(),
        BriefError::Summarizer(msg) | BriefError::Config(msg) => {
            format!("Could not summarize this article due to an AI model error: {msg}")
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = ErrorBody {
            error: self.kind(),
            message: &message,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub model: String,
    /// Characters of article text that went into the summary.
    pub chars: usize,
    pub published_at: Option<DateTime<Utc>>,
}

/// Last known result of summarizing a headline link.
#[derive(Debug, Clone, PartialEq)]
pub enum CardOutcome {
    Summarized(ArticleSummary),
    Failed(String),
}

/// Entry counts of the service caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub articles: usize,
    pub summaries: usize,
    pub headlines: usize,
    pub cards: usize,
}

pub struct BriefService {
    pages: PageFetcher,
    headline_fetcher: HeadlineFetcher,
    summarizer: Arc<dyn Summarizer + Send + Sync>,
    params: SummaryParams,
    min_article_chars: usize,
    articles: TtlCache<String, Article>,
    summaries: TtlCache<String, Summary>,
    headlines: TtlCache<HeadlineSource, Vec<Headline>>,
    cards: TtlCache<String, CardOutcome>,
}

impl BriefService {
    pub fn new(
        cfg: &BriefConfig,
        summarizer: Arc<dyn Summarizer + Send + Sync>,
    ) -> Result<Self, AppError> {
        let pages = PageFetcher::new(&cfg.fetch.user_agent, cfg.fetch.timeout(), cfg.fetch.retries)?
            .with_max_page_bytes(cfg.fetch.max_page_bytes);
        let cap = cfg.fetch.max_cached_links;
        let headline_fetcher = HeadlineFetcher::new(pages.clone(), &cfg.headlines.hacker_news_url);
        Ok(Self {
            pages,
            headline_fetcher,
            summarizer,
            params: SummaryParams::from_config(&cfg.summarizer),
            min_article_chars: cfg.fetch.min_article_chars,
            articles: TtlCache::new(Some(Duration::from_secs(cfg.fetch.article_ttl_secs)))
                .with_capacity(cap),
            summaries: TtlCache::new(None).with_capacity(cap),
            headlines: TtlCache::new(Some(Duration::from_secs(cfg.headlines.ttl_secs))),
            cards: TtlCache::new(None).with_capacity(cap),
        })
    }

    pub fn model_name(&self) -> &str {
        self.summarizer.model_name()
    }

    pub async fn health_check(&self) -> bool {
        self.summarizer.health_check().await.unwrap_or(false)
    }

    /// Fetch, extract and summarize the article at `raw_url`.
    ///
    /// Articles are cached per URL for the configured TTL; summaries are
    /// cached per article checksum for the life of the process.
    pub async fn summarize_url(&self, raw_url: &str) -> Result<ArticleSummary, AppError> {
        let url = parse_article_url(raw_url).map_err(|e| AppError::InvalidInput(e.to_string()))?;
        let key = url.to_string();

        let article = self
            .articles
            .get_or_try_insert_with(key.clone(), || async {
                let page = self.pages.fetch_page(url.as_str()).await?;
                let article = extract_article(&page.html, &page.url, self.min_article_chars)?;
                Ok::<_, AppError>(article)
            })
            .await;

        let result = match article {
            Ok(article) => self.summarize_article(&key, article).await,
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(summary) => CardOutcome::Summarized(summary.clone()),
            Err(e) => {
                tracing::warn!(url = %key, kind = e.kind(), error = %e, "article.summarize.failed");
                CardOutcome::Failed(e.card_message())
            }
        };
        self.cards.insert(key, outcome);
        result
    }

    async fn summarize_article(
        &self,
        key: &str,
        article: Article,
    ) -> Result<ArticleSummary, AppError> {
        let summary = self
            .summaries
            .get_or_try_insert_with(article.checksum.clone(), || {
                self.summarizer.summarize(&article.text, &self.params)
            })
            .await?;

        tracing::info!(
            url = %key,
            model = %summary.model,
            chars = article.chars(),
            summary_chars = summary.text.len(),
            "article.summarized"
        );

        Ok(ArticleSummary {
            url: key.to_string(),
            title: article.display_title(),
            summary: summary.text,
            model: summary.model,
            chars: article.chars(),
            published_at: article.published_at,
        })
    }

    /// Up to `count` (clamped to 1..=20) current headlines from `source`.
    pub async fn headlines(
        &self,
        source: HeadlineSource,
        count: usize,
    ) -> Result<Vec<Headline>, AppError> {
        let mut all = self
            .headlines
            .get_or_try_insert_with(source, || self.headline_fetcher.fetch(source))
            .await?;
        all.truncate(clamp_count(count));
        Ok(all)
    }

    /// Summary for `link` if it was summarized successfully before.
    pub fn cached_summary(&self, link: &str) -> Option<ArticleSummary> {
        match self.card_outcome(link)? {
            CardOutcome::Summarized(s) => Some(s),
            CardOutcome::Failed(_) => None,
        }
    }

    pub fn card_outcome(&self, link: &str) -> Option<CardOutcome> {
        let key = parse_article_url(link).ok()?.to_string();
        self.cards.get(&key)
    }

    /// Drop expired articles and headline lists; returns how many went.
    pub fn purge_expired(&self) -> usize {
        self.articles.purge_expired() + self.headlines.purge_expired()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            articles: self.articles.len(),
            summaries: self.summaries.len(),
            headlines: self.headlines.len(),
            cards: self.cards.len(),
        }
    }
}
