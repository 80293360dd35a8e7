//! HTML to Markdown conversion
//!
//! Content markup is sanitized (boilerplate elements dropped, attributes
//! reduced to `href`/`src`/`alt`/`title`, links made absolute), rendered with
//! `htmd` using ATX headings and `-` bullets, then tidied up.

use crate::extract::dom::{inner_html, DomFilter};
use htmd::options::{BulletListMarker, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html};
use tracing::error;
use url::Url;

const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "meta", "link", "noscript", "nav", "header", "footer",
];

const KEPT_ATTRIBUTES: &[&str] = &["href", "src", "alt", "title"];

static DROPPED_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(sidebar|advertisement|banner|popup)").expect("valid regex"));

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static BULLET_WITHOUT_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)-([^\s-])").expect("valid regex"));

static NUMBER_WITHOUT_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)(\d+)\.([^\s\d])").expect("valid regex"));

static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img\s+[^>]*?src=["']([^"']+)["'][^>]*?>"#).expect("valid regex")
});

static IMG_ALT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"alt=["']([^"']*)["']"#).expect("valid regex"));

static IMG_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"title=["']([^"']*)["']"#).expect("valid regex"));

/// Sanitizes content markup ahead of rendering
struct Sanitize<'a> {
    base: Option<&'a Url>,
}

impl DomFilter for Sanitize<'_> {
    fn keep(&self, el: ElementRef<'_>) -> bool {
        let element = el.value();
        if DROPPED_ELEMENTS.contains(&element.name()) {
            return false;
        }
        !element
            .attr("class")
            .map_or(false, |class| DROPPED_CLASS.is_match(class))
    }

    fn attribute(&self, el: ElementRef<'_>, name: &str, value: &str) -> Option<String> {
        if !KEPT_ATTRIBUTES.contains(&name) {
            return None;
        }

        let is_link = matches!((el.value().name(), name), ("a", "href") | ("img", "src"));
        match self.base {
            Some(base) if is_link => Some(
                base.join(value.trim())
                    .map(String::from)
                    .unwrap_or_else(|_| value.to_string()),
            ),
            _ => Some(value.to_string()),
        }
    }
}

/// Strips boilerplate and attributes, and makes links absolute
pub fn sanitize(content_html: &str, base_url: &str) -> String {
    let base = Url::parse(base_url).ok();
    let fragment = Html::parse_fragment(content_html);
    inner_html(
        fragment.root_element(),
        &Sanitize {
            base: base.as_ref(),
        },
    )
}

/// Converts content markup to Markdown
///
/// Never fails: a rendering error is logged and yields an empty string,
/// which callers treat as a conversion failure.
pub fn convert(content_html: &str, base_url: &str) -> String {
    let sanitized = sanitize(content_html, base_url);

    let converter = HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: BulletListMarker::Dash,
            ..Default::default()
        })
        .build();

    match converter.convert(&sanitized) {
        Ok(markdown) => post_process(&markdown),
        Err(e) => {
            error!("Error converting HTML to Markdown for {}: {}", base_url, e);
            String::new()
        }
    }
}

/// Cleans up rendering artifacts
///
/// 1. Collapse three or more newlines into one blank line
/// 2. Add the missing space after `-` bullets and `1.` numbers
/// 3. Remove empty fenced code blocks
/// 4. Turn leftover `<img>` tags into Markdown images
/// 5. Trim surrounding whitespace
pub fn post_process(markdown: &str) -> String {
    let text = BLANK_LINES.replace_all(markdown, "\n\n");
    let text = BULLET_WITHOUT_SPACE.replace_all(&text, "$1- $2");
    let text = NUMBER_WITHOUT_SPACE.replace_all(&text, "$1$2. $3");
    let text = remove_empty_fences(&text);
    let text = convert_img_tags(&text);
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Drops fenced code blocks that contain only blank lines
fn remove_empty_fences(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let is_fence = line.trim_start().starts_with("```");

        if is_fence && !in_fence {
            let mut j = i + 1;
            while j < lines.len() && lines[j].trim().is_empty() {
                j += 1;
            }
            if j < lines.len() && lines[j].trim() == "```" {
                i = j + 1;
                continue;
            }
            in_fence = true;
        } else if is_fence {
            in_fence = false;
        }

        kept.push(line);
        i += 1;
    }

    kept.join("\n")
}

/// Rewrites raw `<img>` tags as `![alt](src "title")`
fn convert_img_tags(markdown: &str) -> String {
    IMG_TAG
        .replace_all(markdown, |caps: &Captures<'_>| {
            let tag = &caps[0];
            let src = &caps[1];
            let alt = IMG_ALT
                .captures(tag)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            match IMG_TITLE.captures(tag).and_then(|c| c.get(1)) {
                Some(title) => format!("![{}]({} \"{}\")", alt, src, title.as_str()),
                None => format!("![{}]({})", alt, src),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://support.haltech.com/portal/en/kb/articles/rb26-wiring";

    #[test]
    fn test_sanitize_drops_boilerplate() {
        let html = r#"<div class="body"><script>x()</script><nav>menu</nav><div class="Sidebar-left">side</div><p style="color:red">Keep</p></div>"#;
        assert_eq!(sanitize(html, BASE), "<div><p>Keep</p></div>");
    }

    #[test]
    fn test_sanitize_absolutizes_links() {
        let html = r#"<p><a href="../guides/x" class="btn">x</a><img src="/img/a.png"></p>"#;
        assert_eq!(
            sanitize(html, BASE),
            r#"<p><a href="https://support.haltech.com/portal/en/kb/guides/x">x</a><img src="https://support.haltech.com/img/a.png"></p>"#
        );
    }

    #[test]
    fn test_convert_headings_lists_images() {
        let html = r#"<div>
            <h2>Pinout</h2>
            <ul><li>First</li><li>Second</li></ul>
            <p><img src="/img/diagram.png" alt="Diagram"></p>
        </div>"#;
        let markdown = convert(html, BASE);

        assert!(markdown.starts_with("## Pinout"));
        assert!(markdown
            .lines()
            .any(|l| l.starts_with("- ") && l.contains("First")));
        assert!(markdown.contains("![Diagram](https://support.haltech.com/img/diagram.png"));
        assert!(!markdown.contains("\n\n\n"));
    }

    #[test]
    fn test_convert_empty_input() {
        assert_eq!(convert("", BASE), "");
    }

    #[test]
    fn test_post_process_blank_lines() {
        assert_eq!(post_process("a\n\n\n\nb\n"), "a\n\nb");
    }

    #[test]
    fn test_post_process_list_markers() {
        assert_eq!(post_process("-item\n  -nested\n---\n-5"), "- item\n  - nested\n---\n- 5");
        assert_eq!(post_process("1.First\n2. Second\n1.5 litres"), "1. First\n2. Second\n1.5 litres");
    }

    #[test]
    fn test_post_process_empty_fences() {
        assert_eq!(post_process("before\n\n```\n\n```\n\nafter"), "before\n\nafter");
        let kept = "```\ncode\n```\n\n```\nmore\n```";
        assert_eq!(post_process(kept), kept);
    }

    #[test]
    fn test_post_process_img_tags() {
        assert_eq!(
            post_process(r#"see <img class="x" src="/a.png" alt="A" title="T"> here"#),
            r#"see ![A](/a.png "T") here"#
        );
        assert_eq!(post_process("<img src='b.png'>"), "![](b.png)");
    }
}
