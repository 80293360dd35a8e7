//! Configuration module for kb-mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error at this layer; callers fall back to
//! [`Config::default`] and validate it the same way.
//!
//! # Example
//!
//! ```no_run
//! use kb_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("kb-mirror.toml")).unwrap();
//! println!("Discovery will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
