use crate::error::FetchError;
use brief_http::header::{ACCEPT, HeaderMap, HeaderValue};
use brief_http::{HttpClient, HttpError, RequestOpts};
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Default download cap for one page.
pub const DEFAULT_MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    pub html: String,
    pub fetched_at: DateTime<Utc>,
    /// blake3 hex digest of `html`.
    pub checksum: String,
}

/// Parse user input into an `http(s)` URL with a host.
///
/// ```
/// use brief_web::parse_article_url;
///
/// assert!(parse_article_url(" https://example.com/news/1 ").is_ok());
/// assert!(parse_article_url("ftp://example.com/file").is_err());
/// assert!(parse_article_url("not a url").is_err());
/// ```
pub fn parse_article_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("empty".into()));
    }
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}

/// Downloads HTML pages for extraction.
#[derive(Clone)]
pub struct PageFetcher {
    http: HttpClient,
    max_page_bytes: usize,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration, retries: usize) -> Result<Self, FetchError> {
        let build_err = |e: HttpError| FetchError::Network {
            url: String::new(),
            message: e.to_string(),
        };
        let http = HttpClient::unanchored()
            .map_err(build_err)?
            .with_user_agent(user_agent)
            .map_err(build_err)?
            .with_timeout(timeout)
            .with_retries(retries);
        Ok(Self {
            http,
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
        })
    }

    pub fn with_max_page_bytes(mut self, max: usize) -> Self {
        self.max_page_bytes = max;
        self
    }

    /// GET `url` and return its HTML.
    ///
    /// Fails with [`FetchError`] on network errors, non-success statuses,
    /// non-HTML content types and pages over the size cap. The type and size
    /// checks run before the body is downloaded.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let url = parse_article_url(url)?;
        let url_str = url.to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        let opts = RequestOpts {
            headers: Some(headers),
            allow_absolute: true,
            accept_content_type: Some(is_textual),
            max_body_bytes: Some(self.max_page_bytes),
            ..Default::default()
        };

        let resp = self
            .http
            .get_text(url.as_str(), opts)
            .await
            .map_err(|e| http_to_fetch(e, &url_str))?;

        let checksum = blake3::hash(resp.body.as_bytes()).to_hex().to_string();
        tracing::info!(
            url = %url_str,
            final_url = %resp.url,
            bytes = resp.body.len(),
            "article.fetch.ok"
        );

        Ok(FetchedPage {
            url: resp.url,
            html: resp.body,
            fetched_at: Utc::now(),
            checksum,
        })
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    matches!(
        mime.as_str(),
        "text/html" | "application/xhtml+xml" | "text/plain" | ""
    )
}

fn http_to_fetch(e: HttpError, url: &str) -> FetchError {
    match e {
        HttpError::Api { status, .. } => FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        },
        HttpError::Url(reason) => FetchError::InvalidUrl {
            url: url.to_string(),
            reason,
        },
        HttpError::ContentType(content_type) => {
            tracing::warn!(url = %url, content_type = %content_type, "article.fetch.unsupported_type");
            FetchError::UnsupportedContentType {
                url: url.to_string(),
                content_type,
            }
        }
        HttpError::TooLarge(limit) => FetchError::TooLarge {
            url: url.to_string(),
            limit,
        },
        other => FetchError::Network {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
