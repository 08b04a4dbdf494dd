use chrono::{DateTime, Utc};

use crate::extractor::TranscriptRecord;

/// Body preview caps for the two formats. Longer bodies get an ellipsis
/// marker.
const PLAIN_PREVIEW_LEN: usize = 500;
const HTML_PREVIEW_LEN: usize = 300;

/// The two message bodies, rendered independently from the same records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub plain: String,
    pub html: String,
}

/// Deterministic rendering of a result list. Same records in, same strings
/// out; `generated_at` is passed in so callers (and tests) control the
/// timestamp.
pub fn render(records: &[TranscriptRecord], generated_at: DateTime<Utc>) -> Rendered {
    Rendered {
        plain: render_plain(records, generated_at),
        html: render_html(records, generated_at),
    }
}

fn render_plain(records: &[TranscriptRecord], generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "Earnings Call Transcripts".to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
        format!("Total transcripts: {}", records.len()),
        String::new(),
        "=".repeat(60),
        String::new(),
    ];

    for record in records {
        lines.push(format!("Ticker: {}", record.ticker.as_deref().unwrap_or("N/A")));
        lines.push(format!("Title: {}", record.title));
        lines.push(format!(
            "Date: {}",
            record
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string())
        ));
        lines.push(format!("URL: {}", record.url));
        lines.push(format!("Source: {}", record.source));
        if record.is_paywalled {
            lines.push("[PAYWALLED - preview only]".to_string());
        }
        lines.push(String::new());

        if !record.body.is_empty() {
            lines.push("Preview:".to_string());
            lines.push(truncate(&record.body, PLAIN_PREVIEW_LEN));
            lines.push(String::new());
        }

        lines.push("-".repeat(40));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_html(records: &[TranscriptRecord], generated_at: DateTime<Utc>) -> String {
    let mut rows = String::new();
    for record in records {
        let preview = if record.body.is_empty() {
            String::new()
        } else {
            format!(
                r#"<p style="color: #666; font-size: 12px; margin-top: 8px;">{}</p>"#,
                escape(&truncate(&record.body, HTML_PREVIEW_LEN))
            )
        };
        let paywall_badge = if record.is_paywalled {
            r#" <span style="color: #b00;">[paywalled]</span>"#
        } else {
            ""
        };

        rows.push_str(&format!(
            r#"<tr>
  <td style="padding: 12px; border-bottom: 1px solid #eee;"><strong>{ticker}</strong></td>
  <td style="padding: 12px; border-bottom: 1px solid #eee;">
    <a href="{url}" style="color: #333;">{title}</a>{paywall_badge}
    {preview}
  </td>
  <td style="padding: 12px; border-bottom: 1px solid #eee; color: #666;">{date}</td>
</tr>
"#,
            ticker = escape(record.ticker.as_deref().unwrap_or("N/A")),
            url = escape(&record.url),
            title = escape(&record.title),
            date = record
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 800px; margin: 0 auto; padding: 20px;">
<h1 style="border-bottom: 2px solid #1a73e8; padding-bottom: 10px;">Earnings Call Transcripts</h1>
<p style="color: #666;">Generated: {generated} | Total: {count} transcripts</p>
<table style="width: 100%; border-collapse: collapse; margin-top: 20px;">
<thead>
<tr style="background: #f5f5f5;">
  <th style="padding: 12px; text-align: left; width: 80px;">Ticker</th>
  <th style="padding: 12px; text-align: left;">Title</th>
  <th style="padding: 12px; text-align: left; width: 120px;">Date</th>
</tr>
</thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        generated = generated_at.format("%Y-%m-%d %H:%M"),
        count = records.len(),
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::SourceKind;
    use chrono::TimeZone;

    fn record(ticker: &str, title: &str, body: &str) -> TranscriptRecord {
        TranscriptRecord {
            ticker: Some(ticker.to_string()),
            title: title.to_string(),
            url: format!("https://news.example.com/article/{}", ticker.to_lowercase()),
            published_at: Some(Utc.with_ymd_and_hms(2025, 1, 30, 21, 0, 0).unwrap()),
            body: body.to_string(),
            is_paywalled: false,
            source: SourceKind::PrimarySite,
            participants: Vec::new(),
            qa_section: None,
            summary: None,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 2, 14, 30, 0).unwrap()
    }

    #[test]
    fn rendering_is_deterministic() {
        let records = vec![record("AAPL", "Apple Inc. (AAPL) Q1 2025 Earnings Call Transcript", "body")];
        assert_eq!(render(&records, generated_at()), render(&records, generated_at()));
    }

    #[test]
    fn preview_is_truncated_with_ellipsis() {
        let long_body = "word ".repeat(200);
        let records = vec![record("AAPL", "Apple Inc. (AAPL) Q1 2025 Earnings Call Transcript", &long_body)];
        let rendered = render(&records, generated_at());

        assert!(rendered.plain.contains("..."));
        // plain preview line is capped plus the marker
        let preview_line = rendered
            .plain
            .lines()
            .find(|l| l.starts_with("word "))
            .unwrap();
        assert_eq!(preview_line.chars().count(), PLAIN_PREVIEW_LEN + 3);
    }

    #[test]
    fn html_escapes_title() {
        let records = vec![record("AAPL", "Apple <&> Co (AAPL) Earnings Call", "")];
        let rendered = render(&records, generated_at());
        assert!(rendered.html.contains("Apple &lt;&amp;&gt; Co"));
        assert!(!rendered.html.contains("Apple <&> Co"));
    }

    #[test]
    fn html_and_plain_carry_the_same_records() {
        let records = vec![
            record("AAPL", "Apple Inc. (AAPL) Q1 2025 Earnings Call Transcript", "body one"),
            record("MSFT", "Microsoft Corporation (MSFT) Q2 2025 Earnings Call Transcript", "body two"),
        ];
        let rendered = render(&records, generated_at());

        let html_text: String = scraper::Html::parse_document(&rendered.html)
            .root_element()
            .text()
            .collect();

        for record in &records {
            let ticker = record.ticker.as_deref().unwrap();
            assert!(rendered.plain.contains(ticker));
            assert!(html_text.contains(ticker));
            assert!(rendered.plain.contains(&record.title));
            assert!(html_text.contains(&record.title));
        }
    }

    #[test]
    fn empty_list_renders_headers_only() {
        let rendered = render(&[], generated_at());
        assert!(rendered.plain.contains("Total transcripts: 0"));
        assert!(rendered.html.contains("Total: 0 transcripts"));
    }
}
