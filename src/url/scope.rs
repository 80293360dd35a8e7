use crate::config::SiteConfig;
use crate::url::NormalizedUrl;
use crate::UrlError;
use url::Url;

/// Returns true if the URL belongs to the target domain and its path matches
/// none of the exclusion patterns
///
/// Host comparison ignores case and port. Exclusion patterns are matched as
/// case-insensitive substrings of the path.
pub fn is_in_scope(url: &str, site: &SiteConfig) -> bool {
    check_scope(url, site).is_ok()
}

/// Like [`is_in_scope`], but reports why a URL was rejected
pub fn check_scope(url: &str, site: &SiteConfig) -> Result<(), UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;

    let host = parsed.host_str().ok_or(UrlError::MissingDomain)?;
    if !host.eq_ignore_ascii_case(&site.target_domain) {
        return Err(UrlError::OutOfScope(format!(
            "{} is not on {}",
            url, site.target_domain
        )));
    }

    let path = parsed.path().to_lowercase();
    if let Some(pattern) = site
        .exclude_patterns
        .iter()
        .find(|p| path.contains(&p.to_lowercase()))
    {
        return Err(UrlError::OutOfScope(format!(
            "{} matches exclusion pattern '{}'",
            url, pattern
        )));
    }

    Ok(())
}

/// Normalizes a link and keeps it only when it is in scope
pub fn normalize_in_scope(
    href: &str,
    base: &str,
    site: &SiteConfig,
) -> Result<NormalizedUrl, UrlError> {
    let url = super::normalize(href, Some(base))?;
    check_scope(url.as_str(), site)?;
    Ok(url)
}
