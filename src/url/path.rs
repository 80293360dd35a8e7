use url::Url;

/// Splits a URL path into segments after removing the first matching prefix
///
/// Empty segments are dropped. An unparseable URL yields no segments.
///
/// # Examples
///
/// ```
/// use kb_mirror::url::path_segments;
///
/// let prefixes = vec!["portal/en/kb/haltech/".to_string(), "kb/".to_string()];
/// let segments = path_segments("https://support.haltech.com/portal/en/kb/haltech/engines/rb26", &prefixes);
/// assert_eq!(segments, vec!["engines", "rb26"]);
/// ```
pub fn path_segments(url: &str, prefixes: &[String]) -> Vec<String> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };

    let mut path = parsed.path().trim_matches('/');
    if let Some(prefix) = prefixes.iter().find(|p| path.starts_with(p.as_str())) {
        path = &path[prefix.len()..];
    }

    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Last non-empty path segment of a URL
pub fn last_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// File name component of a URL path; empty when the path ends with '/'
pub fn url_basename(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec![
            "portal/en/kb/haltech/".to_string(),
            "portal/kb/".to_string(),
            "kb/".to_string(),
        ]
    }

    #[test]
    fn test_strip_first_matching_prefix() {
        let segments = path_segments(
            "https://support.haltech.com/portal/en/kb/haltech/elite/wiring/pinout/",
            &prefixes(),
        );
        assert_eq!(segments, vec!["elite", "wiring", "pinout"]);
    }

    #[test]
    fn test_only_one_prefix_stripped() {
        let segments = path_segments("https://support.haltech.com/portal/kb/kb/x", &prefixes());
        assert_eq!(segments, vec!["kb", "x"]);
    }

    #[test]
    fn test_no_prefix() {
        let segments = path_segments("https://support.haltech.com/docs/a", &prefixes());
        assert_eq!(segments, vec!["docs", "a"]);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(
            last_segment("https://support.haltech.com/kb/articles/rb26-guide/"),
            Some("rb26-guide".to_string())
        );
        assert_eq!(last_segment("https://support.haltech.com/"), None);
    }

    #[test]
    fn test_url_basename() {
        assert_eq!(
            url_basename("https://support.haltech.com/img/diagram.png?v=2"),
            "diagram.png"
        );
        assert_eq!(url_basename("https://support.haltech.com/img/"), "");
        assert_eq!(url_basename("nonsense"), "");
    }
}
