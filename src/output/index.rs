//! Top-level index of the mirrored tree

use crate::classify::title_case;
use crate::output::document::read_title;
use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDEX_FILENAME: &str = "index.md";

/// Heading for documents written directly below the output root
const ROOT_SECTION: &str = "Other";

/// One category directory and its documents as (title, relative link)
struct Section {
    heading: String,
    entries: Vec<(String, String)>,
}

/// Writes `index.md` at the output root, linking every document by title
///
/// Directories are walked recursively in name order, skipping the shared image
/// directory. Each directory holding documents becomes a section; documents
/// at the root are listed last under "Other". A document whose title cannot
/// be read is left out.
pub fn build_index(
    output_dir: &Path,
    images_dir_name: &str,
    site_name: &str,
    total_articles: usize,
    generated_at: NaiveDateTime,
) -> io::Result<PathBuf> {
    let mut sections = Vec::new();
    let mut root_entries = Vec::new();

    for entry in sorted_entries(output_dir)? {
        if entry.is_dir() {
            if entry.file_name().map_or(false, |n| n == images_dir_name) {
                continue;
            }
            collect_sections(output_dir, &entry, &mut sections)?;
        } else if let Some(link) = document_entry(output_dir, &entry) {
            root_entries.push(link);
        }
    }

    if !root_entries.is_empty() {
        sections.push(Section {
            heading: ROOT_SECTION.to_string(),
            entries: root_entries,
        });
    }

    let mut lines = vec![
        format!("# {} Knowledge Base", site_name),
        String::new(),
        format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        format!("Total articles: {}", total_articles),
        String::new(),
        "## Categories".to_string(),
    ];
    for section in &sections {
        lines.push(String::new());
        lines.push(format!("### {}", section.heading));
        for (title, link) in &section.entries {
            lines.push(format!("- [{}]({})", title, link));
        }
    }
    lines.push(String::new());

    let index_path = output_dir.join(INDEX_FILENAME);
    fs::write(&index_path, lines.join("\n"))?;
    info!("Created main index: {}", index_path.display());

    Ok(index_path)
}

fn collect_sections(root: &Path, dir: &Path, sections: &mut Vec<Section>) -> io::Result<()> {
    let entries = sorted_entries(dir)?;

    let documents: Vec<(String, String)> = entries
        .iter()
        .filter(|path| path.is_file())
        .filter_map(|path| document_entry(root, path))
        .collect();

    if !documents.is_empty() {
        sections.push(Section {
            heading: section_heading(root, dir),
            entries: documents,
        });
    }

    for subdir in entries.iter().filter(|path| path.is_dir()) {
        collect_sections(root, subdir, sections)?;
    }

    Ok(())
}

/// Title and root-relative link of a Markdown document, if it has a title
fn document_entry(root: &Path, path: &Path) -> Option<(String, String)> {
    let name = path.file_name()?.to_str()?;
    if !name.ends_with(".md") || name == INDEX_FILENAME {
        return None;
    }

    let title = match fs::read_to_string(path) {
        Ok(content) => read_title(&content)?,
        Err(e) => {
            debug!("Skipping {} in index: {}", path.display(), e);
            return None;
        }
    };

    Some((title, relative_link(root, path)))
}

fn relative_link(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn section_heading(root: &Path, dir: &Path) -> String {
    dir.strip_prefix(root)
        .unwrap_or(dir)
        .components()
        .map(|c| title_case(&c.as_os_str().to_string_lossy().replace('-', " ")))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}
