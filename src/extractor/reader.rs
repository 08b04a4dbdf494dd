use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::model::{Participant, SourceKind, TranscriptRecord, parse_published_at};
use crate::extractor::{MIN_BODY_LEN, paywall, sources, ticker};
use crate::fetcher::Document;

/// Paragraph blocks shorter than this are ignored by the last-resort
/// extraction strategy (navigation stubs, bylines, share buttons).
const PARAGRAPH_MIN_LEN: usize = 80;

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static ARTICLE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-test-id='article-title']").unwrap());
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static TIME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("time").unwrap());
static ARTICLE_DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-test-id='article-date']").unwrap());
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

const PARTICIPANT_MARKERS: [&str; 3] = [
    "Conference Call Participants",
    "Company Participants",
    "Call Participants",
];

const QA_MARKERS: [&str; 3] = [
    "Question-and-Answer Session",
    "Q&A Session",
    "Questions and Answers",
];

/// Extract a transcript record from one HTML article page. Any failure to
/// find usable content yields `None`; nothing here panics on bad markup.
pub fn extract_article(document: &Document, source: SourceKind) -> Option<TranscriptRecord> {
    let html = Html::parse_document(&document.body);

    let title = extract_title(&html)?;
    let published_at = extract_date(&html);
    let marker_present = paywall::has_marker(&html);

    let body = extract_body(&html, source, marker_present)?;
    let is_paywalled = paywall::classify(marker_present, &body);

    let participants = extract_participants(&body);
    let qa_section = extract_qa_section(&body);

    Some(TranscriptRecord {
        ticker: ticker::from_title(&title),
        title,
        url: document.url_final.to_string(),
        published_at,
        body,
        is_paywalled,
        source,
        participants,
        qa_section,
        summary: None,
    })
}

fn extract_title(html: &Html) -> Option<String> {
    for sel in [&*H1, &*ARTICLE_TITLE] {
        if let Some(element) = html.select(sel).next() {
            let title = element_text(element, " ");
            if !title.is_empty() {
                return Some(title);
            }
        }
    }

    if let Some(element) = html.select(&OG_TITLE).next()
        && let Some(content) = element.value().attr("content")
        && !content.trim().is_empty()
    {
        return Some(content.trim().to_string());
    }

    if let Some(element) = html.select(&TITLE).next() {
        let title = element_text(element, " ");
        if !title.is_empty() {
            return Some(title);
        }
    }

    None
}

fn extract_date(html: &Html) -> Option<chrono::DateTime<chrono::Utc>> {
    if let Some(element) = html.select(&TIME).next() {
        if let Some(datetime) = element.value().attr("datetime")
            && let Some(parsed) = parse_published_at(datetime)
        {
            return Some(parsed);
        }
        if let Some(parsed) = parse_published_at(&element_text(element, " ")) {
            return Some(parsed);
        }
    }

    html.select(&ARTICLE_DATE)
        .next()
        .and_then(|el| parse_published_at(&element_text(el, " ")))
}

/// First selector in the source's chain whose text clears `MIN_BODY_LEN`
/// wins; anything shorter falls through to the next strategy. Last resort is
/// every substantial paragraph in document order. Paywalled pages get to
/// keep a short preview body.
fn extract_body(html: &Html, source: SourceKind, paywall_marker: bool) -> Option<String> {
    for selector_str in sources::content_selectors(source) {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in html.select(&selector) {
            let text = element_text(element, "\n");
            if text.chars().count() >= MIN_BODY_LEN {
                debug!("body matched selector {}", selector_str);
                return Some(text);
            }
        }
    }

    let paragraphs: Vec<String> = html
        .select(&PARAGRAPH)
        .map(|p| element_text(p, " "))
        .filter(|t| t.chars().count() > PARAGRAPH_MIN_LEN)
        .collect();
    let fallback = paragraphs.join("\n\n");

    if fallback.chars().count() >= MIN_BODY_LEN {
        return Some(fallback);
    }
    if paywall_marker && !fallback.is_empty() {
        return Some(fallback);
    }

    None
}

fn element_text(element: scraper::ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Name/title pairs from the participants block(s) near the top of a
/// transcript. Lines look like "Tim Cook - Chief Executive Officer".
fn extract_participants(body: &str) -> Vec<Participant> {
    let mut participants = Vec::new();
    let lines: Vec<&str> = body.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if PARTICIPANT_MARKERS.iter().any(|m| line.contains(m)) {
            let mut j = i + 1;
            while j < lines.len() {
                let entry = lines[j].trim();
                if let Some((name, title)) = entry.split_once(" - ") {
                    participants.push(Participant {
                        name: name.trim().to_string(),
                        title: Some(title.trim().to_string()).filter(|t| !t.is_empty()),
                    });
                    j += 1;
                } else {
                    break;
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }

    participants
}

fn extract_qa_section(body: &str) -> Option<String> {
    for marker in QA_MARKERS {
        if let Some(idx) = body.find(marker) {
            return Some(body[idx..].to_string());
        }
    }
    None
}
