//! Filtered DOM serialization
//!
//! `scraper` trees are immutable, so "removing" elements is done by
//! re-serializing the tree through a [`DomFilter`] that decides which elements
//! survive and how their attributes are rewritten.

use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Decides which elements and attributes survive serialization
pub trait DomFilter {
    /// Returning false drops the element together with its subtree
    fn keep(&self, el: ElementRef<'_>) -> bool {
        let _ = el;
        true
    }

    /// Returns the value to write for an attribute, or `None` to drop it
    fn attribute(&self, el: ElementRef<'_>, name: &str, value: &str) -> Option<String> {
        let _ = (el, name);
        Some(value.to_string())
    }
}

/// Serializes everything unchanged
pub struct KeepAll;

impl DomFilter for KeepAll {}

/// Drops every element matching one of the selectors
pub struct Prune<'a> {
    pub selectors: &'a [Selector],
}

impl DomFilter for Prune<'_> {
    fn keep(&self, el: ElementRef<'_>) -> bool {
        !matches_any(el, self.selectors)
    }
}

/// Returns true if the element matches any of the selectors
pub fn matches_any(el: ElementRef<'_>, selectors: &[Selector]) -> bool {
    selectors.iter().any(|s| s.matches(&el))
}

/// Returns true if the element or one of its ancestors is dropped by the filter
pub fn is_dropped(el: ElementRef<'_>, filter: &impl DomFilter) -> bool {
    !filter.keep(el) || el.ancestors().filter_map(ElementRef::wrap).any(|a| !filter.keep(a))
}

/// Parses a static selector list, skipping entries that fail to parse
pub fn parse_selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().filter_map(|s| Selector::parse(s).ok()).collect()
}

/// Serializes the element itself and its surviving subtree
pub fn outer_html(el: ElementRef<'_>, filter: &impl DomFilter) -> String {
    let mut out = String::new();
    if filter.keep(el) {
        write_element(&mut out, el, filter);
    }
    out
}

/// Serializes only the surviving children of the element
pub fn inner_html(el: ElementRef<'_>, filter: &impl DomFilter) -> String {
    let mut out = String::new();
    write_children(&mut out, el, filter);
    out
}

fn write_element(out: &mut String, el: ElementRef<'_>, filter: &impl DomFilter) {
    let name = el.value().name();
    out.push('<');
    out.push_str(name);
    for (attr, value) in el.value().attrs() {
        if let Some(value) = filter.attribute(el, attr, value) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&escape_attribute(&value));
            out.push('"');
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    write_children(out, el, filter);

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_children(out: &mut String, el: ElementRef<'_>, filter: &impl DomFilter) {
    let raw = RAW_TEXT_ELEMENTS.contains(&el.value().name());
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                if raw {
                    out.push_str(&text.text);
                } else {
                    out.push_str(&escape_text(&text.text));
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if filter.keep(child_el) {
                        write_element(out, child_el, filter);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Length of the surviving text, counting each text node with surrounding
/// whitespace trimmed
pub fn text_len(el: ElementRef<'_>, filter: &impl DomFilter) -> usize {
    let mut total = 0;
    for child in el.children() {
        match child.value() {
            Node::Text(text) => total += text.text.trim().chars().count(),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if filter.keep(child_el) {
                        total += text_len(child_el, filter);
                    }
                }
            }
            _ => {}
        }
    }
    total
}

/// All text below the element with runs of whitespace collapsed to one space
pub fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if any text below the element is non-whitespace
pub fn has_text(el: ElementRef<'_>) -> bool {
    el.text().any(|t| !t.trim().is_empty())
}

/// Returns true if the element is, or contains, one of the named elements
pub fn contains_element(el: ElementRef<'_>, names: &[&str]) -> bool {
    el.descendants()
        .filter_map(|n| n.value().as_element().map(|e| e.name()))
        .any(|name| names.contains(&name))
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
