pub mod listing;
pub mod model;
pub mod paywall;
pub mod reader;
pub mod sources;
pub mod ticker;
pub mod vendor;

#[cfg(test)]
mod tests;

pub use model::{ListingEntry, Participant, SourceKind, TranscriptRecord};

use crate::fetcher::{Document, DocumentKind};

/// Minimum body length for a document to count as a transcript. Bodies at
/// exactly this length are accepted; one character under falls through to
/// the next extraction strategy.
pub const MIN_BODY_LEN: usize = 400;

/// Turn one fetched document into a transcript record. Parse failures and
/// thin documents yield `None`; the aggregator carries on with the rest.
pub fn extract(document: &Document, source: SourceKind) -> Option<TranscriptRecord> {
    match document.kind {
        DocumentKind::Json => vendor::extract_article(document),
        DocumentKind::Html | DocumentKind::Text => reader::extract_article(document, source),
    }
}
