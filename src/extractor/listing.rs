use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::extractor::model::{ListingEntry, SourceKind, parse_published_at};
use crate::extractor::{sources, ticker};

/// Listing titles at or under this length are navigation noise, not
/// article headlines.
const MIN_TITLE_LEN: usize = 10;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TIME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("time").unwrap());

/// Parse transcript entries off one listing page. Selector chains first;
/// when none match, fall back to any anchor whose href carries the source's
/// transcript marker. Duplicate hrefs within the page collapse to one entry.
pub fn parse(html: &str, kind: SourceKind, base_url: &Url) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);

    let mut anchors: Vec<ElementRef<'_>> = Vec::new();
    for selector_str in sources::listing_selectors(kind) {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        anchors = document.select(&selector).collect();
        if !anchors.is_empty() {
            debug!(
                "listing matched selector {} ({} anchors)",
                selector_str,
                anchors.len()
            );
            break;
        }
    }

    if anchors.is_empty() {
        let marker = sources::link_marker(kind);
        anchors = document
            .select(&ANCHOR)
            .filter(|a| a.value().attr("href").is_some_and(|h| h.contains(marker)))
            .collect();
    }

    let mut seen_hrefs = HashSet::new();
    let mut entries = Vec::new();

    for anchor in anchors {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base_url.join(href) else {
            continue;
        };
        let url = resolved.to_string();
        if !seen_hrefs.insert(url.clone()) {
            continue;
        }

        let title = anchor
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if title.chars().count() <= MIN_TITLE_LEN {
            continue;
        }

        entries.push(ListingEntry {
            ticker: ticker::from_title(&title),
            title,
            url,
            published_at: nearby_date(anchor),
            summary: None,
        });
    }

    entries
}

/// Listing cards usually carry a `<time>` somewhere in the anchor's
/// enclosing card element. Walk a few ancestors up and take the first one.
/// The walk stops at any ancestor holding other listing anchors, otherwise
/// flat markup would hand this entry a sibling card's date.
fn nearby_date(anchor: ElementRef<'_>) -> Option<chrono::DateTime<chrono::Utc>> {
    for ancestor in anchor.ancestors().take(3) {
        let Some(element) = ElementRef::wrap(ancestor) else {
            continue;
        };
        if element.select(&ANCHOR).count() > 1 {
            break;
        }
        if let Some(time) = element.select(&TIME).next() {
            if let Some(datetime) = time.value().attr("datetime")
                && let Some(parsed) = parse_published_at(datetime)
            {
                return Some(parsed);
            }
            let text: String = time.text().collect();
            if let Some(parsed) = parse_published_at(&text) {
                return Some(parsed);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://news.example.com").unwrap()
    }

    #[test]
    fn duplicate_links_collapse() {
        let html = r#"
            <html><body>
              <a href="/article/123-aaa-earnings-call-transcript">Alpha Corp (AAA) Q1 Earnings Call Transcript</a>
              <a href="/article/123-aaa-earnings-call-transcript">Alpha Corp (AAA) Q1 Earnings Call Transcript</a>
              <a href="/article/456-bbb-earnings-call-transcript">Beta Inc (BBB) Q1 Earnings Call Transcript</a>
            </body></html>"#;

        let entries = parse(html, SourceKind::PrimarySite, &base());
        assert_eq!(entries.len(), 2);
        assert!(entries[0].url.ends_with("/article/123-aaa-earnings-call-transcript"));
        assert!(entries[1].url.ends_with("/article/456-bbb-earnings-call-transcript"));
    }

    #[test]
    fn short_titles_are_dropped() {
        let html = r#"
            <html><body>
              <a href="/article/1-x-earnings-call-transcript">More</a>
              <a href="/article/2-y-earnings-call-transcript">Gamma Plc (GGG) Q4 Earnings Call Transcript</a>
            </body></html>"#;

        let entries = parse(html, SourceKind::PrimarySite, &base());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticker.as_deref(), Some("GGG"));
    }

    #[test]
    fn selector_chain_beats_marker_fallback() {
        let html = r#"
            <html><body>
              <a data-test-id="post-list-item-title" href="/article/789-ccc-transcript">
                Charlie Co (CCC) Q2 Earnings Call Transcript
              </a>
              <a href="/unrelated-earnings-call-transcript-sidebar">A long unrelated sidebar headline</a>
            </body></html>"#;

        let entries = parse(html, SourceKind::PrimarySite, &base());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticker.as_deref(), Some("CCC"));
    }

    #[test]
    fn dates_do_not_leak_across_sibling_cards() {
        let html = r#"
            <html><body>
              <article>
                <a href="/article/11-ddd-earnings-call-transcript">Delta Ltd (DDD) Q3 Earnings Call Transcript</a>
                <time datetime="2025-01-30T21:00:00Z">Jan 30</time>
              </article>
              <article>
                <a href="/article/12-eee-earnings-call-transcript">Echo Corp (EEE) Q3 Earnings Call Transcript</a>
              </article>
            </body></html>"#;

        let entries = parse(html, SourceKind::PrimarySite, &base());
        assert_eq!(entries.len(), 2);
        assert!(entries[0].published_at.is_some());
        assert_eq!(entries[1].published_at, None);
    }

    #[test]
    fn dates_found_in_enclosing_card() {
        let html = r#"
            <html><body>
              <article>
                <a href="/article/11-ddd-earnings-call-transcript">Delta Ltd (DDD) Q3 Earnings Call Transcript</a>
                <time datetime="2025-01-30T21:00:00Z">Jan 30</time>
              </article>
            </body></html>"#;

        let entries = parse(html, SourceKind::PrimarySite, &base());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].published_at.is_some());
    }
}
