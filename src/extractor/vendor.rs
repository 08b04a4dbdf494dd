//! Vendor API parsing. The vendor exposes the same articles as the HTML
//! sources but as a JSON:API-ish envelope, which is far more stable than
//! scraping markup.

use scraper::Html;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::extractor::model::{ListingEntry, SourceKind, TranscriptRecord, parse_published_at};
use crate::extractor::{MIN_BODY_LEN, paywall, ticker};
use crate::fetcher::Document;

#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    #[serde(default)]
    data: Vec<ListingItem>,
    #[serde(default)]
    included: Vec<IncludedItem>,
}

#[derive(Debug, Deserialize)]
struct ListingItem {
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    links: Links,
    #[serde(default)]
    relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Attributes {
    title: Option<String>,
    publish_on: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    #[serde(default)]
    is_paid: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(rename = "self")]
    self_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Relationships {
    #[serde(default)]
    primary_tickers: RelationshipData,
}

#[derive(Debug, Default, Deserialize)]
struct RelationshipData {
    #[serde(default)]
    data: Vec<RelationshipRef>,
}

#[derive(Debug, Deserialize)]
struct RelationshipRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IncludedItem {
    id: String,
    #[serde(default)]
    attributes: IncludedAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct IncludedAttributes {
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleEnvelope {
    data: ListingItem,
}

/// Parse a vendor listing response into entries. Malformed JSON yields an
/// empty list rather than an error; the aggregator treats that like any
/// other unusable page.
pub fn parse_listing(body: &str, base_url: &Url) -> Vec<ListingEntry> {
    let envelope: ListingEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!("unparseable vendor listing: {}", e);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for item in &envelope.data {
        let Some(title) = item.attributes.title.clone() else {
            continue;
        };
        let Some(url) = resolve_link(item, base_url) else {
            continue;
        };

        let ticker = item
            .relationships
            .primary_tickers
            .data
            .first()
            .and_then(|r| slug_for(&envelope.included, &r.id))
            .map(|slug| slug.to_uppercase())
            .or_else(|| ticker::from_title(&title));

        entries.push(ListingEntry {
            ticker,
            published_at: item
                .attributes
                .publish_on
                .as_deref()
                .and_then(parse_published_at),
            summary: item.attributes.summary.clone(),
            title,
            url,
        });
    }

    entries
}

/// Extract a single article served as JSON. Honors the same minimum-length
/// and paywall-preview rules as the HTML reader.
pub fn extract_article(document: &Document) -> Option<TranscriptRecord> {
    let envelope: ArticleEnvelope = serde_json::from_str(&document.body).ok()?;
    let item = envelope.data;

    let title = item.attributes.title.clone()?;
    let body = strip_html(item.attributes.content.as_deref().unwrap_or(""));

    let long_enough = body.chars().count() >= MIN_BODY_LEN;
    let paid_preview = item.attributes.is_paid && !body.is_empty();
    if !long_enough && !paid_preview {
        return None;
    }

    let url = resolve_link(&item, &document.url_final)
        .unwrap_or_else(|| document.url_final.to_string());

    Some(TranscriptRecord {
        ticker: ticker::from_title(&title),
        published_at: item
            .attributes
            .publish_on
            .as_deref()
            .and_then(parse_published_at),
        is_paywalled: paywall::classify(item.attributes.is_paid, &body),
        summary: item.attributes.summary.clone(),
        title,
        url,
        body,
        source: SourceKind::VendorApi,
        participants: Vec::new(),
        qa_section: None,
    })
}

fn resolve_link(item: &ListingItem, base_url: &Url) -> Option<String> {
    let link = item.links.self_link.as_deref()?;
    base_url.join(link).ok().map(|u| u.to_string())
}

fn slug_for<'a>(included: &'a [IncludedItem], id: &str) -> Option<&'a str> {
    included
        .iter()
        .find(|i| i.id == id)
        .and_then(|i| i.attributes.slug.as_deref())
}

/// Vendor article content is an HTML string; flatten it to text lines.
fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
