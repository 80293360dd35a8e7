use crate::UrlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// An absolute http(s) URL with its fragment and trailing slashes removed
///
/// Equality on this type is the deduplication key for discovery, the site map
/// and the scrape ledger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the normalized string back into a [`Url`]
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(e.to_string()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a URL, optionally resolving it against a base first
///
/// # Normalization Steps
///
/// 1. Resolve `url` against `base` when one is given, otherwise parse it as-is
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Reject URLs without a host
/// 4. Remove the fragment
/// 5. Remove trailing slashes from the serialized form
///
/// Scheme and host case are canonicalized by the parser. Query strings are
/// kept untouched.
///
/// # Examples
///
/// ```
/// use kb_mirror::url::normalize;
///
/// let url = normalize("../guides/rb26/#pinout", Some("https://support.haltech.com/kb/a/b")).unwrap();
/// assert_eq!(url.as_str(), "https://support.haltech.com/kb/guides/rb26");
/// ```
pub fn normalize(url: &str, base: Option<&str>) -> Result<NormalizedUrl, UrlError> {
    // Step 1: Resolve or parse
    let mut parsed = match base {
        Some(base) => {
            let base = Url::parse(base).map_err(|e| UrlError::Parse(e.to_string()))?;
            base.join(url.trim())
                .map_err(|e| UrlError::Parse(e.to_string()))?
        }
        None => Url::parse(url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?,
    };

    // Step 2: Validate scheme
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    // Step 3: Require a host
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    // Step 4: Remove fragment
    parsed.set_fragment(None);

    // Step 5: Trailing slashes. All of them go, so the result is a fixed point.
    let serialized = String::from(parsed);
    Ok(NormalizedUrl(serialized.trim_end_matches('/').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize("https://support.haltech.com/kb/page/", None).unwrap();
        assert_eq!(result.as_str(), "https://support.haltech.com/kb/page");
    }

    #[test]
    fn test_root_loses_slash() {
        let result = normalize("https://support.haltech.com/", None).unwrap();
        assert_eq!(result.as_str(), "https://support.haltech.com");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize("https://support.haltech.com/kb/page#section", None).unwrap();
        assert_eq!(result.as_str(), "https://support.haltech.com/kb/page");
    }

    #[test]
    fn test_fragment_then_slash() {
        let result = normalize("https://support.haltech.com/kb/page/#top", None).unwrap();
        assert_eq!(result.as_str(), "https://support.haltech.com/kb/page");
    }

    #[test]
    fn test_resolve_relative() {
        let result = normalize(
            "/portal/en/kb/articles/rb26",
            Some("https://support.haltech.com/portal/en/kb/haltech"),
        )
        .unwrap();
        assert_eq!(
            result.as_str(),
            "https://support.haltech.com/portal/en/kb/articles/rb26"
        );
    }

    #[test]
    fn test_absolute_ignores_base() {
        let result = normalize("https://other.com/x", Some("https://support.haltech.com/kb")).unwrap();
        assert_eq!(result.as_str(), "https://other.com/x");
    }

    #[test]
    fn test_query_is_kept() {
        let result = normalize("https://support.haltech.com/kb?page=2", None).unwrap();
        assert_eq!(result.as_str(), "https://support.haltech.com/kb?page=2");
    }

    #[test]
    fn test_host_is_lowercased() {
        let result = normalize("HTTPS://Support.Haltech.COM/KB/Page", None).unwrap();
        assert_eq!(result.as_str(), "https://support.haltech.com/KB/Page");
    }

    #[test]
    fn test_invalid_scheme() {
        assert!(matches!(
            normalize("mailto:someone@example.com", None),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            normalize("javascript:void(0)", Some("https://support.haltech.com")),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(normalize("not a url", None), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://support.haltech.com/",
            "https://support.haltech.com/kb/page//",
            "https://support.haltech.com/kb/page/#frag",
            "https://support.haltech.com/kb/page?x=1#frag",
            "http://support.haltech.com/a/b/../c/",
        ];
        for input in inputs {
            let once = normalize(input, None).unwrap();
            let twice = normalize(once.as_str(), None).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }
}
