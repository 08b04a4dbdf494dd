use url::Url;

/// Query parameters that only exist for click tracking. They vary per
/// referrer, so the same article shows up under many URLs unless removed.
const TRACKING_PARAMS: [&str; 4] = ["source", "ref", "gclid", "fbclid"];

/// Canonical form of a document URL: fragment dropped, tracking query
/// parameters removed. This is the dedup key for a run. Unparseable input
/// is returned untouched so it still participates in dedup.
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &kept {
            serializer.append_pair(k, v);
        }
        url.set_query(Some(&serializer.finish()));
    }

    url.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
