use url::Url;

/// Parse `candidate` and accept it only as an absolute `http`/`https` URL
/// with a non-empty host. Malformed input yields `None`, never a panic.
pub fn parse_valid_url(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

pub fn is_valid_url(candidate: &str) -> bool {
    parse_valid_url(candidate).is_some()
}

/// Resolve a possibly-relative href/src against the page's base URL.
///
/// Empty input stays empty; already-absolute http(s) URLs pass through
/// unchanged; anything else goes through standard URL-join semantics.
/// A join failure yields an empty string so callers can drop the entry.
pub fn make_absolute_url(base: &Url, candidate: &str) -> String {
    if candidate.is_empty() {
        return String::new();
    }
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return candidate.to_string();
    }
    base.join(candidate).map(|u| u.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_with_host() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/path?q=1"));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(!is_valid_url("ftp://x.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("file:///etc/passwd"));
        assert!(!is_valid_url("http://"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn joins_relative_paths() {
        let base = Url::parse("https://a.com/x/").unwrap();
        assert_eq!(make_absolute_url(&base, "y.html"), "https://a.com/x/y.html");
        assert_eq!(make_absolute_url(&base, "/top"), "https://a.com/top");
        assert_eq!(make_absolute_url(&base, "//cdn.b.com/i.png"), "https://cdn.b.com/i.png");
        assert_eq!(make_absolute_url(&base, "?page=2"), "https://a.com/x/?page=2");
    }

    #[test]
    fn absolute_urls_pass_through_unchanged() {
        let base = Url::parse("https://a.com").unwrap();
        assert_eq!(make_absolute_url(&base, "https://b.com/z"), "https://b.com/z");
        assert_eq!(make_absolute_url(&base, "http://b.com"), "http://b.com");
    }

    #[test]
    fn empty_input_stays_empty() {
        let base = Url::parse("https://a.com").unwrap();
        assert_eq!(make_absolute_url(&base, ""), "");
    }
}
