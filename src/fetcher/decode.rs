use crate::fetcher::errors::FetchError;
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s[^>]*charset\s*=\s*["']?([^"'\s;/>]+)"#).unwrap()
});

/// Decode a response body to UTF-8. Charset precedence: the Content-Type
/// header, a `<meta charset>` in the first 4KB, then chardetng's guess.
pub fn decode_body(content_type: &str, body: &[u8]) -> Result<String, FetchError> {
    let encoding = sniff_encoding(content_type, body);

    let (decoded, _, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(FetchError::Charset(format!(
            "undecodable content for charset {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

fn sniff_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(enc) = label_from(&HEADER_CHARSET, content_type) {
        return enc;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(4096)]);
    if let Some(enc) = label_from(&META_CHARSET, &head) {
        return enc;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(&body[..body.len().min(4096)], false);
    detector.guess(None, true)
}

fn label_from(re: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let captures = re.captures(haystack)?;
    let label = captures.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}
