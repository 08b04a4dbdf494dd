//! Per-source markup knowledge: selector fallback chains and link markers.
//! Each source renders transcripts differently and changes its markup over
//! time, so every chain ends in progressively more generic selectors.

use crate::extractor::model::SourceKind;

/// Ordered fallback chain for locating the article body. First selector
/// whose text clears the minimum length wins.
pub fn content_selectors(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::PrimarySite => &[
            "div[data-test-id='article-body']",
            "article[data-test-id='article-content']",
            ".paywall-full-content",
            "#article-content",
            "article",
        ],
        SourceKind::MirrorA => &[
            ".article-body",
            ".tailwind-article-body",
            "main article",
            "article",
        ],
        SourceKind::MirrorB => &[
            ".entry-content",
            ".post-content",
            "#article-content",
            "article",
        ],
        // The vendor serves JSON, not markup.
        SourceKind::VendorApi => &[],
    }
}

/// Ordered chain for anchor elements on a listing page.
pub fn listing_selectors(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::PrimarySite => &[
            "a[data-test-id='post-list-item-title']",
            "article[data-test-id='post-list-item'] a",
            "div[data-test-id='post-list'] article a",
        ],
        SourceKind::MirrorA => &["a[data-track-category='Article']", ".article-list a"],
        SourceKind::MirrorB => &[".post-title a", "h2.entry-title a"],
        SourceKind::VendorApi => &[],
    }
}

/// Href substring used as a last-resort listing filter when no selector
/// chain matches anything.
pub fn link_marker(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::PrimarySite => "earnings-call-transcript",
        SourceKind::MirrorA => "call-transcript",
        SourceKind::MirrorB => "transcript",
        SourceKind::VendorApi => "transcript",
    }
}
