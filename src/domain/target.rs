use std::fmt;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("patent identifier is empty")]
    Empty,
    #[error("invalid patent identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("invalid URL {raw:?}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
}

/// A patent identifier such as `US6360693B1`, used verbatim in the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatentIdentifier(String);

impl PatentIdentifier {
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TargetError::Empty);
        }
        if raw.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(TargetError::InvalidIdentifier(raw.to_string()));
        }
        Ok(PatentIdentifier(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{base_url}/patent/{id}/{language}`. An empty language selects the
    /// patent's original language.
    pub fn page_url(&self, base_url: &str, language: Option<&str>) -> String {
        format!(
            "{}/patent/{}/{}",
            base_url.trim_end_matches('/'),
            self.0,
            language.unwrap_or_default()
        )
    }
}

impl fmt::Display for PatentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Patent(PatentIdentifier),
    /// An explicit page, e.g. a `file://` fixture or a local mirror.
    Url(Url),
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let raw = raw.trim();
        match raw.contains('/') {
            true => Url::parse(raw)
                .map(Target::Url)
                .map_err(|source| TargetError::InvalidUrl {
                    raw: raw.to_string(),
                    source,
                }),
            false => PatentIdentifier::parse(raw).map(Target::Patent),
        }
    }

    pub fn page_url(&self, base_url: &str) -> String {
        match self {
            Target::Patent(id) => id.page_url(base_url, None),
            Target::Url(url) => url.to_string(),
        }
    }

    pub fn identifier(&self) -> Option<&PatentIdentifier> {
        match self {
            Target::Patent(id) => Some(id),
            Target::Url(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Patent(id) => fmt::Display::fmt(id, f),
            Target::Url(url) => fmt::Display::fmt(url, f),
        }
    }
}
