use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;

    if config.user_agent.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    let kb_url = Url::parse(&config.kb_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid kb-url: {}", e)))?;

    if kb_url.scheme() != "http" && kb_url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "kb-url '{}' must use HTTP or HTTPS",
            config.kb_url
        )));
    }

    validate_domain_string(&config.target_domain)?;

    let seed_host = kb_url.host_str().unwrap_or_default();
    if !seed_host.eq_ignore_ascii_case(&config.target_domain) {
        return Err(ConfigError::Validation(format!(
            "kb-url host '{}' does not match target-domain '{}'",
            seed_host, config.target_domain
        )));
    }

    if config.site_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site-name cannot be empty".to_string(),
        ));
    }

    if config.exclude_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "exclude-patterns cannot contain empty strings".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_depth > 50 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be <= 50, got {}",
            config.max_depth
        )));
    }

    if config.navigation_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation-timeout-ms must be > 0".to_string(),
        ));
    }

    if config.image_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "image-timeout-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.logs_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "logs-dir cannot be empty".to_string(),
        ));
    }

    // Relative image paths are computed as "../" * depth + images-dir
    if config.images_dir.is_empty()
        || config.images_dir.contains('/')
        || config.images_dir.contains('\\')
        || config.images_dir == "."
        || config.images_dir == ".."
    {
        return Err(ConfigError::Validation(format!(
            "images-dir must be a single directory name, got '{}'",
            config.images_dir
        )));
    }

    if config.max_filename_length < 16 {
        return Err(ConfigError::Validation(format!(
            "max-filename-length must be >= 16, got {}",
            config.max_filename_length
        )));
    }

    Ok(())
}

/// Validates a host name
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::Validation(
            "target-domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_domain_string() {
        assert!(validate_domain_string("support.haltech.com").is_ok());
        assert!(validate_domain_string("127.0.0.1").is_ok());
        assert!(validate_domain_string("localhost").is_ok());

        assert!(validate_domain_string("").is_err());
        assert!(validate_domain_string(".example.com").is_err());
        assert!(validate_domain_string("example.com.").is_err());
        assert!(validate_domain_string("exa mple.com").is_err());
        assert!(validate_domain_string("a..b").is_err());
    }

    #[test]
    fn test_seed_host_must_match_target_domain() {
        let mut config = Config::default();
        config.site.target_domain = "other.example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_kb_url() {
        let mut config = Config::default();
        config.site.kb_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.concurrency = 0;
        assert!(validate(&config).is_err());
        config.crawler.concurrency = 101;
        assert!(validate(&config).is_err());
        config.crawler.concurrency = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_images_dir_must_be_single_segment() {
        let mut config = Config::default();
        config.output.images_dir = "assets/images".to_string();
        assert!(validate(&config).is_err());
        config.output.images_dir = "..".to_string();
        assert!(validate(&config).is_err());
        config.output.images_dir = "assets".to_string();
        assert!(validate(&config).is_ok());
    }
}
