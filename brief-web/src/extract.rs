//! Article extraction from raw HTML.
//!
//! Paragraph-based: the article body is the text of the page's `<p>`
//! elements, narrowed to `<article>` when the page has one, minus paragraphs
//! that live in navigation chrome (`nav`, `header`, `footer`, ...).

use crate::error::ExtractError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:title"], meta[name="og:title"]"#));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static ARTICLE_PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("article p"));
static PUBLISHED_META: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"meta[property="article:published_time"], meta[itemprop="datePublished"]"#)
});
static TIME: LazyLock<Selector> = LazyLock::new(|| selector("time[datetime]"));

/// Containers whose paragraphs are page chrome, not article body.
const SKIPPED_ANCESTORS: &[&str] = &[
    "nav", "header", "footer", "aside", "form", "script", "style", "noscript",
];

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

#[derive(Debug, Clone)]
pub struct Article {
    pub url: Url,
    pub title: Option<String>,
    /// Paragraph texts joined by blank lines.
    pub text: String,
    pub paragraphs: usize,
    pub published_at: Option<DateTime<Utc>>,
    /// blake3 hex digest of `text`; identical bodies share a summary.
    pub checksum: String,
}

impl Article {
    /// Title for display; falls back to the URL.
    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.url.to_string())
    }

    pub fn chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extract title and body text from `html`.
///
/// Fails with [`ExtractError::NoParagraphs`] when the page has no paragraph
/// text and [`ExtractError::TooShort`] when the text is under `min_chars`.
///
/// ```
/// use brief_web::extract_article;
/// use url::Url;
///
/// let html = "<html><head><title>Rail expansion approved</title></head><body>\
///     <p>The council approved the rail expansion on Tuesday.</p>\
///     <p>Work starts next spring.</p></body></html>";
/// let url = Url::parse("https://news.example/rail").unwrap();
/// let article = extract_article(html, &url, 20).unwrap();
///
/// assert_eq!(article.title.as_deref(), Some("Rail expansion approved"));
/// assert_eq!(article.paragraphs, 2);
/// assert!(article.text.starts_with("The council approved"));
/// ```
pub fn extract_article(html: &str, url: &Url, min_chars: usize) -> Result<Article, ExtractError> {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let paragraphs = extract_paragraphs(&doc);
    if paragraphs.is_empty() {
        tracing::debug!(url = %url, "article.extract.no_paragraphs");
        return Err(ExtractError::NoParagraphs);
    }

    let text = paragraphs.join("\n\n");
    let chars = text.chars().count();
    if chars < min_chars {
        tracing::debug!(url = %url, chars, min_chars, "article.extract.too_short");
        return Err(ExtractError::TooShort {
            chars,
            min: min_chars,
        });
    }

    let checksum = blake3::hash(text.as_bytes()).to_hex().to_string();
    let published_at = extract_published_at(&doc);

    tracing::debug!(
        url = %url,
        title = ?title,
        paragraphs = paragraphs.len(),
        chars,
        "article.extract.ok"
    );

    Ok(Article {
        url: url.clone(),
        title,
        text,
        paragraphs: paragraphs.len(),
        published_at,
        checksum,
    })
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<String>())
}

fn extract_title(doc: &Html) -> Option<String> {
    let og = doc
        .select(&OG_TITLE)
        .filter_map(|m| m.value().attr("content"))
        .map(collapse_ws)
        .find(|t| !t.is_empty());
    og.or_else(|| {
        doc.select(&TITLE)
            .map(element_text)
            .find(|t| !t.is_empty())
    })
    .or_else(|| doc.select(&H1).map(element_text).find(|t| !t.is_empty()))
}

fn in_skipped_container(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| SKIPPED_ANCESTORS.contains(&a.value().name()))
}

fn collect_paragraphs(doc: &Html, sel: &Selector) -> Vec<String> {
    doc.select(sel)
        .filter(|p| !in_skipped_container(p))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

fn extract_paragraphs(doc: &Html) -> Vec<String> {
    let scoped = collect_paragraphs(doc, &ARTICLE_PARAGRAPH);
    if !scoped.is_empty() {
        return scoped;
    }
    collect_paragraphs(doc, &PARAGRAPH)
}

fn extract_published_at(doc: &Html) -> Option<DateTime<Utc>> {
    doc.select(&PUBLISHED_META)
        .filter_map(|m| m.value().attr("content"))
        .chain(doc.select(&TIME).filter_map(|t| t.value().attr("datetime")))
        .find_map(parse_published)
}

/// Accept RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (as UTC), or a bare date.
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}
