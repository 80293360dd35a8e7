//! Output module for writing the mirrored document tree
//!
//! This module handles:
//! - Rendering documents with their front matter
//! - Deciding where each document lives in the tree
//! - Rehosting images into the shared image directory
//! - Generating the top-level index once the scrape has settled

mod document;
mod images;
mod index;
mod path;

pub use document::{read_title, FrontMatter, OutputArtifact};
pub use images::{image_filename, relative_image_path, ImageRehoster};
pub use index::build_index;
pub use path::{
    clean_filename, document_filename, resolve_path, slugify, truncate_at_separator,
    OutputLocation,
};
