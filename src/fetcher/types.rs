use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// What kind of payload a fetched document carries, derived from the
/// Content-Type header. The vendor API serves JSON; everything else the
/// pipeline cares about is HTML (or close enough to treat as such).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Json,
    Text,
}

impl DocumentKind {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("text/html") || ct.contains("application/xhtml") {
            Some(Self::Html)
        } else if ct.contains("application/json") || ct.contains("+json") {
            Some(Self::Json)
        } else if ct.contains("text/plain") {
            Some(Self::Text)
        } else {
            None
        }
    }
}

/// A request for one document.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Hint that the page needs a browser-rendered pass (lazy-loaded
    /// content). The plain HTTP client cannot honor it and falls back to
    /// a regular GET; a rendering collaborator behind the `Fetch` trait
    /// may do better.
    pub render: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            render: false,
        }
    }

    pub fn rendered(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            render: true,
        }
    }
}

/// A fetched, decoded document.
#[derive(Debug, Clone)]
pub struct Document {
    pub url_final: Url,
    pub status: StatusCode,
    pub kind: DocumentKind,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}
