use regex::Regex;
use std::sync::LazyLock;

// "Company Name (TICK) ...". Deliberately permissive, also matches
// non-ticker parenthesized acronyms. Do not tighten.
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]{1,5})\)").unwrap());

// "TICK: Company Name" / "TICK - Company Name"
static LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{1,5})\s*[:\-–—]").unwrap());

/// Best-effort ticker extraction from a headline. Not authoritative.
pub fn from_title(title: &str) -> Option<String> {
    if let Some(captures) = PARENTHESIZED.captures(title) {
        return Some(captures[1].to_string());
    }
    if let Some(captures) = LEADING.captures(title) {
        return Some(captures[1].to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parenthesized_ticker() {
        assert_eq!(
            from_title("Apple Inc. (AAPL) Q1 2025 Earnings Call Transcript"),
            Some("AAPL".to_string())
        );
    }

    #[test]
    fn leading_prefix() {
        assert_eq!(
            from_title("MSFT: Q2 2025 Earnings Call Transcript"),
            Some("MSFT".to_string())
        );
        assert_eq!(
            from_title("HUB - Earnings Call Highlights"),
            Some("HUB".to_string())
        );
    }

    #[test]
    fn no_ticker() {
        assert_eq!(from_title("Earnings Season Kicks Off This Week"), None);
        // digits never match the symbol class
        assert_eq!(from_title("Record quarter (Q1) for the sector"), None);
    }

    #[test]
    fn acronyms_match_permissively() {
        // known collision, kept on purpose
        assert_eq!(
            from_title("Revenue up 12% (GAAP) year over year"),
            Some("GAAP".to_string())
        );
    }
}
