use reqwest::StatusCode;
use thirtyfour::error::WebDriverError;
use thiserror::Error;

/// The page could not be loaded or did not finish rendering in time.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("webdriver session failed")]
    WebDriver(#[from] WebDriverError),
    #[error("request failed")]
    Http(#[from] reqwest::Error),
    #[error("could not read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{marker:?} did not appear on {url} within {timeout_secs}s")]
    MarkerTimeout {
        url: String,
        marker: String,
        timeout_secs: u64,
        #[source]
        source: WebDriverError,
    },
    #[error("{url} answered with {status}")]
    Status { url: String, status: StatusCode },
}

/// The target does not resolve to a patent page.
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("no patent page at {url} ({status})")]
    Status { url: String, status: StatusCode },
    #[error("page has no <article> element, the identifier may not name a patent")]
    NoArticle,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}
