pub mod canonical;

pub use canonical::canonical_url;

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::extractor::{
    self, ListingEntry, MIN_BODY_LEN, SourceKind, TranscriptRecord, listing, vendor,
};
use crate::fetcher::{Document, DocumentKind, Fetch, FetchRequest};

/// One configured source: which site, and where it lives. Base URLs are
/// injectable so tests can point a source at a local mock server.
#[derive(Debug, Clone)]
pub struct Source {
    pub kind: SourceKind,
    pub base_url: Url,
}

impl Source {
    pub fn new(kind: SourceKind, base_url: Url) -> Self {
        Self { kind, base_url }
    }

    /// Listing URL for a 1-based page number.
    pub fn listing_url(&self, page: usize) -> String {
        match self.kind {
            SourceKind::PrimarySite => {
                let base = format!("{}earnings/earnings-call-transcripts", self.base_url);
                if page > 1 {
                    format!("{base}?page={page}")
                } else {
                    base
                }
            }
            SourceKind::MirrorA => {
                let base = format!("{}earnings/call-transcripts", self.base_url);
                if page > 1 {
                    format!("{base}?page={page}")
                } else {
                    base
                }
            }
            SourceKind::MirrorB => {
                let base = format!("{}transcripts", self.base_url);
                if page > 1 {
                    format!("{base}?page={page}")
                } else {
                    base
                }
            }
            SourceKind::VendorApi => format!(
                "{}api/v3/articles?filter[category]=earnings::earnings-call-transcripts&page[size]=40&page[number]={page}",
                self.base_url
            ),
        }
    }

    /// Search/listing URL used to resolve a ticker to its most recent
    /// transcript.
    pub fn search_url(&self, ticker: &str) -> String {
        let encoded = utf8_percent_encode(ticker, NON_ALPHANUMERIC);
        match self.kind {
            SourceKind::VendorApi => format!(
                "{}api/v3/articles?filter[category]=earnings::earnings-call-transcripts&filter[ticker]={encoded}&page[size]=5",
                self.base_url
            ),
            _ => format!(
                "{}search?q={encoded}%20earnings%20call%20transcript&tab=transcripts",
                self.base_url
            ),
        }
    }

    /// The primary site drives its listings with JavaScript, so article
    /// pages carry the render hint for fetchers that can honor it.
    fn wants_render(&self) -> bool {
        matches!(self.kind, SourceKind::PrimarySite)
    }

    fn parse_listing(&self, document: &Document) -> Vec<ListingEntry> {
        match (self.kind, document.kind) {
            (SourceKind::VendorApi, _) | (_, DocumentKind::Json) => {
                vendor::parse_listing(&document.body, &self.base_url)
            }
            _ => listing::parse(&document.body, self.kind, &self.base_url),
        }
    }
}

/// Collection targets for one run: resolve specific tickers, or page
/// through the listing.
#[derive(Debug, Clone)]
pub enum CollectPlan {
    Tickers(Vec<String>),
    Listing { pages: usize },
}

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub min_body_len: usize,
    /// Politeness delay between targets. Not a correctness requirement.
    pub request_delay: Duration,
    pub lookback_days: Option<u32>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            min_body_len: MIN_BODY_LEN,
            request_delay: Duration::from_secs(2),
            lookback_days: None,
        }
    }
}

/// Orchestrates fetch + extract over a set of targets, deduplicating by
/// canonical URL. Targets are processed sequentially, in input order; one
/// bad target never fails the run.
pub struct Aggregator<F: Fetch> {
    fetcher: F,
    sources: Vec<Source>,
    options: AggregatorOptions,
    cancel: CancellationToken,
}

impl<F: Fetch> Aggregator<F> {
    pub fn new(fetcher: F, sources: Vec<Source>, options: AggregatorOptions) -> Self {
        Self {
            fetcher,
            sources,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops scheduling further targets when cancelled. Any
    /// in-flight fetch is allowed to finish; there is no state to roll back.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Collect transcript records for the plan. Always returns partial
    /// results; per-target failures are logged omissions.
    pub async fn collect(&self, plan: &CollectPlan) -> Vec<TranscriptRecord> {
        match plan {
            CollectPlan::Tickers(tickers) => self.collect_tickers(tickers).await,
            CollectPlan::Listing { pages } => self.collect_listing(*pages).await,
        }
    }

    async fn collect_tickers(&self, tickers: &[String]) -> Vec<TranscriptRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (i, ticker) in tickers.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("cancelled, not scheduling remaining tickers");
                break;
            }

            let ticker = ticker.trim().to_uppercase();
            match self.resolve_ticker(&ticker).await {
                Some(mut record) => {
                    record.url = canonical_url(&record.url);
                    if !seen.insert(record.url.clone()) {
                        debug!("duplicate url for {}, skipping: {}", ticker, record.url);
                    } else if self.within_lookback(&record) {
                        records.push(record);
                    }
                }
                None => warn!("no transcript found for {}", ticker),
            }

            if i + 1 < tickers.len() {
                self.pause().await;
            }
        }

        records
    }

    /// Try each source in priority order; the first one yielding a body at
    /// or above the minimum length wins. A paywalled preview is remembered
    /// as a fallback in case no source has the full text.
    async fn resolve_ticker(&self, ticker: &str) -> Option<TranscriptRecord> {
        let mut preview: Option<TranscriptRecord> = None;

        for source in &self.sources {
            let Some(entry) = self.search_source(source, ticker).await else {
                continue;
            };

            let request = if source.wants_render() {
                FetchRequest::rendered(&entry.url)
            } else {
                FetchRequest::new(&entry.url)
            };

            let document = match self.fetcher.fetch(&request).await {
                Ok(document) => document,
                Err(e) => {
                    warn!("article fetch failed for {} via {}: {}", ticker, source.kind, e);
                    continue;
                }
            };

            let Some(mut record) = extractor::extract(&document, source.kind) else {
                debug!("no usable content for {} via {}", ticker, source.kind);
                continue;
            };
            record.source = source.kind;
            if record.published_at.is_none() {
                record.published_at = entry.published_at;
            }

            if record.body.chars().count() >= self.options.min_body_len {
                return Some(record);
            }
            if preview.is_none() {
                preview = Some(record);
            }
        }

        preview
    }

    async fn search_source(&self, source: &Source, ticker: &str) -> Option<ListingEntry> {
        let request = FetchRequest::new(source.search_url(ticker));
        let document = match self.fetcher.fetch(&request).await {
            Ok(document) => document,
            Err(e) => {
                warn!("search failed for {} via {}: {}", ticker, source.kind, e);
                return None;
            }
        };

        source
            .parse_listing(&document)
            .into_iter()
            .find(|entry| entry_matches_ticker(entry, ticker))
    }

    async fn collect_listing(&self, pages: usize) -> Vec<TranscriptRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        let Some(source) = self.sources.first() else {
            warn!("no sources configured");
            return records;
        };

        for page in 1..=pages {
            if self.cancel.is_cancelled() {
                info!("cancelled, not scheduling remaining pages");
                break;
            }

            let request = if source.wants_render() {
                FetchRequest::rendered(source.listing_url(page))
            } else {
                FetchRequest::new(source.listing_url(page))
            };

            let document = match self.fetcher.fetch(&request).await {
                Ok(document) => document,
                Err(e) => {
                    warn!("listing page {} failed via {}: {}", page, source.kind, e);
                    continue;
                }
            };

            let entries = source.parse_listing(&document);
            let mut new_count = 0;
            for entry in entries {
                let mut record = entry.into_record(source.kind);
                record.url = canonical_url(&record.url);
                if seen.insert(record.url.clone()) && self.within_lookback(&record) {
                    records.push(record);
                    new_count += 1;
                }
            }
            debug!("page {}: {} new records", page, new_count);

            if page < pages {
                self.pause().await;
            }
        }

        records
    }

    /// Records older than the lookback window are dropped; undated records
    /// are kept.
    fn within_lookback(&self, record: &TranscriptRecord) -> bool {
        let Some(days) = self.options.lookback_days else {
            return true;
        };
        let Some(published_at) = record.published_at else {
            return true;
        };
        published_at >= Utc::now() - chrono::Duration::days(days as i64)
    }

    async fn pause(&self) {
        if !self.options.request_delay.is_zero() {
            sleep(self.options.request_delay).await;
        }
    }
}

fn entry_matches_ticker(entry: &ListingEntry, ticker: &str) -> bool {
    if entry.ticker.as_deref() == Some(ticker) {
        return true;
    }
    entry.title.contains(&format!("({ticker})")) || entry.title.starts_with(&format!("{ticker}:"))
}
