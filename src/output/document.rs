//! Output documents: front matter plus Markdown body

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Metadata block written at the top of every document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub url: String,
    pub date_scraped: NaiveDate,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl FrontMatter {
    /// Formats the front matter as a `---` delimited block
    pub fn render(&self) -> String {
        let mut block = String::new();

        block.push_str("---\n");
        block.push_str(&format!("title: {}\n", single_line(&self.title)));
        block.push_str(&format!("url: {}\n", self.url));
        block.push_str(&format!(
            "date_scraped: {}\n",
            self.date_scraped.format("%Y-%m-%d")
        ));
        if let Some(category) = &self.category {
            block.push_str(&format!("category: {}\n", single_line(category)));
        }
        if let Some(subcategory) = &self.subcategory {
            block.push_str(&format!("subcategory: {}\n", single_line(subcategory)));
        }
        block.push_str("---\n");

        block
    }
}

/// A document ready to be written below the output root
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Directory relative to the output root
    pub directory: PathBuf,
    pub filename: String,
    pub front_matter: FrontMatter,
    pub markdown_body: String,
}

impl OutputArtifact {
    /// Full file contents: front matter, a blank line, then the body
    pub fn render(&self) -> String {
        format!("{}\n{}", self.front_matter.render(), self.markdown_body)
    }

    pub fn path_under(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.directory).join(&self.filename)
    }

    /// Writes the document, creating its directory when needed
    pub async fn write(&self, output_root: &Path) -> std::io::Result<PathBuf> {
        let path = self.path_under(output_root);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, self.render()).await?;
        Ok(path)
    }
}

/// Reads the `title:` line from a document's front matter
pub fn read_title(content: &str) -> Option<String> {
    let mut lines = content.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }

    lines
        .take_while(|line| line.trim() != "---")
        .find_map(|line| line.strip_prefix("title:"))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn front_matter() -> FrontMatter {
        FrontMatter {
            title: "RB26 Wiring Guide".to_string(),
            url: "https://support.haltech.com/kb/articles/rb26".to_string(),
            date_scraped: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            category: Some("Engines".to_string()),
            subcategory: None,
        }
    }

    #[test]
    fn test_render_front_matter() {
        assert_eq!(
            front_matter().render(),
            "---\ntitle: RB26 Wiring Guide\nurl: https://support.haltech.com/kb/articles/rb26\ndate_scraped: 2024-03-09\ncategory: Engines\n---\n"
        );
    }

    #[test]
    fn test_render_document() {
        let artifact = OutputArtifact {
            directory: PathBuf::from("technical-library/engines/nissan"),
            filename: "rb26.md".to_string(),
            front_matter: front_matter(),
            markdown_body: "# Body".to_string(),
        };
        let rendered = artifact.render();
        assert!(rendered.ends_with("---\n\n# Body"));
        assert_eq!(read_title(&rendered).as_deref(), Some("RB26 Wiring Guide"));
    }

    #[test]
    fn test_read_title_requires_front_matter() {
        assert_eq!(read_title("# title: nope"), None);
        assert_eq!(read_title("---\nurl: x\n---\ntitle: body text"), None);
        assert_eq!(read_title(""), None);
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let artifact = OutputArtifact {
            directory: PathBuf::from("a/b"),
            filename: "doc.md".to_string(),
            front_matter: front_matter(),
            markdown_body: "text".to_string(),
        };
        let path = artifact.write(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("a/b/doc.md"));
        assert!(std::fs::read_to_string(path).unwrap().contains("text"));
    }
}
