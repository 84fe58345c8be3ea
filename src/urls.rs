use url::Url;

/// Resolve a scraped link or image reference against a portal's base URL.
///
/// Absolute `http(s)` references pass through untouched, protocol-relative
/// ones get `https:`, root-relative ones are joined to the base origin and
/// anything else is treated as relative to `base_url + "/"`. Empty input
/// gives empty output.
pub fn resolve(raw: &str, base_url: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("http") {
        return raw.to_string();
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    let base = base_url.trim_end_matches('/');
    if raw.starts_with('/') {
        return match Url::parse(base) {
            Ok(parsed) => format!("{}{}", parsed.origin().ascii_serialization(), raw),
            Err(_) => format!("{}{}", base, raw),
        };
    }

    let dir = format!("{}/", base);
    Url::parse(&dir)
        .and_then(|u| u.join(raw))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{}{}", dir, raw))
}

/// Host of an absolute or protocol-relative URL, lowercased.
pub fn host_of(url: &str) -> Option<String> {
    let url = url.trim();
    let absolute = match url.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}
