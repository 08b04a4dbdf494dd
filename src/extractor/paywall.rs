use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Bodies longer than this are treated as full articles even when paywall
/// chrome is present on the page.
pub const PAYWALL_PREVIEW_MAX: usize = 2000;

static MARKER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".paywall-message",
        "[data-test-id='paywall']",
        ".locked-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// True when the page carries a paywall marker. A heuristic, not a
/// contract: sites rename these classes without notice.
pub fn has_marker(document: &Html) -> bool {
    if MARKER_SELECTORS
        .iter()
        .any(|sel| document.select(sel).next().is_some())
    {
        return true;
    }

    let html = document.html().to_lowercase();
    html.contains("premium") && html.contains("subscribe")
}

/// Paywall classification: marker present AND the extracted body is short
/// enough to plausibly be a preview.
pub fn classify(marker_present: bool, body: &str) -> bool {
    marker_present && body.chars().count() < PAYWALL_PREVIEW_MAX
}
