use url::Url;

/// Extracts the host from a URL
///
/// Retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use caissa_harvest::url::extract_host;
///
/// let url = Url::parse("https://Lichess.ORG/study/abc").unwrap();
/// assert_eq!(extract_host(&url), Some("lichess.org".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Tests whether a host matches a domain pattern by suffix
///
/// `facebook.com` matches both `facebook.com` itself and any subdomain such
/// as `www.facebook.com`; it does not match `notfacebook.com`.
pub fn host_matches_suffix(host: &str, pattern: &str) -> bool {
    host == pattern || host.ends_with(&format!(".{}", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host_lowercases() {
        let url = Url::parse("https://EXAMPLE.com/path").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_host_keeps_subdomain() {
        let url = Url::parse("https://sub.example.com/path").unwrap();
        assert_eq!(extract_host(&url), Some("sub.example.com".to_string()));
    }

    #[test]
    fn test_suffix_match_exact() {
        assert!(host_matches_suffix("facebook.com", "facebook.com"));
    }

    #[test]
    fn test_suffix_match_subdomain() {
        assert!(host_matches_suffix("www.facebook.com", "facebook.com"));
        assert!(host_matches_suffix("m.cdn.facebook.com", "facebook.com"));
    }

    #[test]
    fn test_suffix_match_rejects_lookalike() {
        assert!(!host_matches_suffix("notfacebook.com", "facebook.com"));
        assert!(!host_matches_suffix("facebook.com.evil.net", "facebook.com"));
    }
}
