use chrono::Utc;
use reqwest::StatusCode;
use url::Url;

use crate::extractor::{MIN_BODY_LEN, SourceKind, extract};
use crate::fetcher::{Document, DocumentKind};

fn html_doc(html: impl Into<String>, url: &str) -> Document {
    Document {
        url_final: Url::parse(url).unwrap(),
        status: StatusCode::OK,
        kind: DocumentKind::Html,
        body: html.into(),
        fetched_at: Utc::now(),
    }
}

fn filler(len: usize) -> String {
    "x".repeat(len)
}

#[test]
fn full_transcript_page() {
    let body_text = format!(
        "Apple Inc. (NASDAQ:AAPL) Q1 2025 Earnings Conference Call January 30, 2025 5:00 PM ET\n\
         Company Participants\n\
         Tim Cook - Chief Executive Officer\n\
         Luca Maestri - Chief Financial Officer\n\
         Operator\n\
         Good day and welcome to the call. {}\n\
         Question-and-Answer Session\n\
         Operator\n\
         We will now begin the question-and-answer session.",
        filler(600)
    );
    let html = format!(
        r#"<html><body>
             <h1>Apple Inc. (AAPL) Q1 2025 Earnings Call Transcript</h1>
             <time datetime="2025-01-30T21:00:00Z">Jan 30, 2025</time>
             <div data-test-id="article-body">{}</div>
           </body></html>"#,
        body_text
            .lines()
            .map(|l| format!("<p>{l}</p>"))
            .collect::<String>()
    );

    let record = extract(
        &html_doc(html, "https://news.example.com/article/4751234-apple"),
        SourceKind::PrimarySite,
    )
    .expect("record expected");

    assert_eq!(record.ticker.as_deref(), Some("AAPL"));
    assert!(record.title.contains("Earnings Call Transcript"));
    assert!(record.published_at.is_some());
    assert!(!record.is_paywalled);
    assert_eq!(record.participants.len(), 2);
    assert_eq!(record.participants[0].name, "Tim Cook");
    assert!(record.qa_section.as_deref().unwrap().starts_with("Question-and-Answer Session"));
}

#[test]
fn body_at_exact_threshold_is_accepted() {
    let html = format!(
        r#"<html><body><h1>Alpha Corp (AAA) Q1 2025 Earnings Call Transcript</h1>
           <div data-test-id="article-body">{}</div></body></html>"#,
        filler(MIN_BODY_LEN)
    );

    let record = extract(
        &html_doc(html, "https://news.example.com/article/1"),
        SourceKind::PrimarySite,
    )
    .expect("exact threshold should be accepted");
    assert_eq!(record.body.chars().count(), MIN_BODY_LEN);
}

#[test]
fn one_char_under_threshold_is_rejected() {
    let html = format!(
        r#"<html><body><h1>Alpha Corp (AAA) Q1 2025 Earnings Call Transcript</h1>
           <div data-test-id="article-body">{}</div></body></html>"#,
        filler(MIN_BODY_LEN - 1)
    );

    assert!(
        extract(
            &html_doc(html, "https://news.example.com/article/1"),
            SourceKind::PrimarySite,
        )
        .is_none()
    );
}

#[test]
fn short_selector_falls_through_to_next_strategy() {
    // The preferred container is thin, but the page has substantial
    // paragraphs elsewhere; the paragraph fallback should win.
    let html = format!(
        r#"<html><body><h1>Beta Inc (BBB) Q2 2025 Earnings Call Transcript</h1>
           <div data-test-id="article-body">{}</div>
           <div class="comments"><p>{}</p><p>{}</p></div></body></html>"#,
        filler(100),
        filler(300),
        filler(300),
    );

    let record = extract(
        &html_doc(html, "https://news.example.com/article/2"),
        SourceKind::PrimarySite,
    )
    .expect("paragraph fallback should produce a record");
    assert!(record.body.chars().count() >= MIN_BODY_LEN);
}

#[test]
fn paywalled_preview_is_kept() {
    let html = format!(
        r#"<html><body><h1>Gamma Plc (GGG) Q3 2025 Earnings Call Transcript</h1>
           <div class="paywall-message">Subscribe to premium for the full transcript</div>
           <p>{}</p></body></html>"#,
        filler(200)
    );

    let record = extract(
        &html_doc(html, "https://news.example.com/article/3"),
        SourceKind::PrimarySite,
    )
    .expect("paywalled preview should not be discarded");
    assert!(record.is_paywalled);
    assert!(!record.body.is_empty());
    assert!(record.body.chars().count() < MIN_BODY_LEN);
}

#[test]
fn thin_document_yields_none() {
    let html = "<html><body><h1>A headline long enough</h1><p>Too short.</p></body></html>";
    assert!(
        extract(
            &html_doc(html, "https://news.example.com/article/4"),
            SourceKind::PrimarySite,
        )
        .is_none()
    );
}

#[test]
fn missing_title_yields_none() {
    let html = format!("<html><body><div data-test-id='article-body'>{}</div></body></html>", filler(800));
    assert!(
        extract(
            &html_doc(html, "https://news.example.com/article/5"),
            SourceKind::PrimarySite,
        )
        .is_none()
    );
}

#[test]
fn vendor_json_article() {
    let body = format!(
        r#"{{"data": {{
            "attributes": {{
                "title": "Tesla, Inc. (TSLA) Q4 2024 Earnings Call Transcript",
                "publishOn": "2025-01-29T18:00:00Z",
                "content": "<p>{}</p>"
            }},
            "links": {{"self": "/article/4751156-tesla"}}
        }}}}"#,
        filler(600)
    );
    let document = Document {
        url_final: Url::parse("https://vendor.example.com/api/v3/articles/4751156").unwrap(),
        status: StatusCode::OK,
        kind: DocumentKind::Json,
        body,
        fetched_at: Utc::now(),
    };

    let record = extract(&document, SourceKind::VendorApi).expect("vendor record expected");
    assert_eq!(record.ticker.as_deref(), Some("TSLA"));
    assert_eq!(record.source, SourceKind::VendorApi);
    assert_eq!(record.url, "https://vendor.example.com/article/4751156-tesla");
}
