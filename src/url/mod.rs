//! URL handling module for kb-mirror
//!
//! This module provides URL normalization, the crawl scope filter, and the
//! path helpers used to turn URLs into directories and file names.

mod normalize;
mod path;
mod scope;

// Re-export main functions
pub use normalize::{normalize, NormalizedUrl};
pub use path::{last_segment, path_segments, url_basename};
pub use scope::{check_scope, is_in_scope, normalize_in_scope};
