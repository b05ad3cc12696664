//! Web acquisition for Brief.
//!
//! - Page download with browser-like headers (`fetch`)
//! - Article title/text extraction from HTML (`extract`)
//! - Front-page headline scraping for news sources (`headlines`)
//! - A small concurrent TTL cache used for all of the above (`cache`)

pub mod cache;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod headlines;

pub use cache::TtlCache;
pub use error::{ExtractError, FetchError};
pub use extract::{Article, extract_article};
pub use fetch::{FetchedPage, PageFetcher, parse_article_url};
pub use headlines::{Headline, HeadlineFetcher, HeadlineSource};
