use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which site or vendor a document came from. Determines the selector
/// fallback chain used by the extractor and the URL shapes the aggregator
/// builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    PrimarySite,
    MirrorA,
    MirrorB,
    VendorApi,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PrimarySite => "primary-site",
            Self::MirrorA => "mirror-a",
            Self::MirrorB => "mirror-b",
            Self::VendorApi => "vendor-api",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub title: Option<String>,
}

/// Normalized result of extracting one document. The `url` is the dedup key
/// within a run; records are never persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub ticker: Option<String>,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub body: String,
    pub is_paywalled: bool,
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// One entry scraped off a listing page (or the vendor listing API). Carries
/// metadata only; the body comes from a follow-up article fetch.
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub title: String,
    pub url: String,
    pub ticker: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

impl ListingEntry {
    pub fn into_record(self, source: SourceKind) -> TranscriptRecord {
        TranscriptRecord {
            ticker: self.ticker,
            title: self.title,
            url: self.url,
            published_at: self.published_at,
            body: String::new(),
            is_paywalled: false,
            source,
            participants: Vec::new(),
            qa_section: None,
            summary: self.summary,
        }
    }
}

/// Published dates arrive in several inconsistent shapes. Try the formats
/// actually seen in the wild, in order; anything else is `None`.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%b. %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
