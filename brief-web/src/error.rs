use thiserror::Error;

/// The page could not be downloaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is not an HTML page (content-type `{content_type}`)")]
    UnsupportedContentType { url: String, content_type: String },
    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: usize },
}

/// The page was downloaded but holds no usable article text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no paragraph text found in the page")]
    NoParagraphs,
    #[error("article text too short ({chars} chars, need at least {min})")]
    TooShort { chars: usize, min: usize },
}
