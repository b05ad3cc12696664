use crate::error::FetchError;
use crate::fetch::PageFetcher;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

/// Most headlines a page will render at once.
pub const MAX_HEADLINES: usize = 20;

static HN_TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.titleline > a").expect("static selector parses"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadlineSource {
    HackerNews,
}

impl HeadlineSource {
    pub const ALL: &'static [HeadlineSource] = &[HeadlineSource::HackerNews];

    /// Human-readable name for the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            HeadlineSource::HackerNews => "Hacker News",
        }
    }

    /// Stable identifier for URLs and the JSON API.
    pub fn slug(&self) -> &'static str {
        match self {
            HeadlineSource::HackerNews => "hacker-news",
        }
    }
}

impl FromStr for HeadlineSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hacker-news" | "hackernews" | "hn" => Ok(HeadlineSource::HackerNews),
            other => Err(format!("unknown headline source `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

/// Clamp a requested headline count into `1..=MAX_HEADLINES`.
///
/// ```
/// use brief_web::headlines::clamp_count;
///
/// assert_eq!(clamp_count(0), 1);
/// assert_eq!(clamp_count(7), 7);
/// assert_eq!(clamp_count(99), 20);
/// ```
pub fn clamp_count(n: usize) -> usize {
    n.clamp(1, MAX_HEADLINES)
}

/// Parse a Hacker News front page into outbound headlines.
///
/// Items without a title or pointing back into the site (`item?id=`) are
/// dropped, since only external stories can be summarized.
pub fn parse_hacker_news(html: &str) -> Vec<Headline> {
    let doc = Html::parse_document(html);
    doc.select(&HN_TITLE_LINK)
        .filter_map(|a| {
            let title = a.text().collect::<String>().trim().to_string();
            let href = a.value().attr("href")?.trim();
            if title.is_empty() || !href.starts_with("http") {
                return None;
            }
            Some(Headline {
                title,
                link: href.to_string(),
            })
        })
        .collect()
}

/// Fetches and parses front pages of the supported sources.
#[derive(Clone)]
pub struct HeadlineFetcher {
    pages: PageFetcher,
    hacker_news_url: String,
}

impl HeadlineFetcher {
    pub fn new(pages: PageFetcher, hacker_news_url: impl Into<String>) -> Self {
        Self {
            pages,
            hacker_news_url: hacker_news_url.into(),
        }
    }

    pub async fn fetch(&self, source: HeadlineSource) -> Result<Vec<Headline>, FetchError> {
        let headlines = match source {
            HeadlineSource::HackerNews => {
                let page = self.pages.fetch_page(&self.hacker_news_url).await?;
                parse_hacker_news(&page.html)
            }
        };
        tracing::info!(
            source = source.slug(),
            count = headlines.len(),
            "headlines.fetch.ok"
        );
        Ok(headlines)
    }
}
