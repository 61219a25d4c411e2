use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::ScrapeError;

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\u{a0}]+").unwrap());

/// Blogger keeps the post in `div.post-body`; older templates use the others.
const CONTENT_SELECTORS: &[&str] = &["div.post-body", "div.post", "article"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "table", "tr", "td",
    "th", "blockquote", "section", "article", "header", "footer",
];
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Cleaned text lines of a document, one logical record per line.
#[derive(Debug, Clone, Default)]
pub struct Lines {
    text: String,
}

impl Lines {
    /// Flatten the post body into lines. Block elements and `<br>` end a line;
    /// inline markup is collapsed into the surrounding text.
    pub fn from_html(html: &str) -> Result<Self, ScrapeError> {
        let document = Html::parse_document(html);
        let container = CONTENT_SELECTORS
            .iter()
            .find_map(|sel| {
                let selector = Selector::parse(sel).ok()?;
                document.select(&selector).next()
            })
            .ok_or_else(|| {
                ScrapeError::Parse(format!(
                    "no content container found (tried {})",
                    CONTENT_SELECTORS.join(", ")
                ))
            })?;

        let mut raw = String::new();
        collect_text(container, &mut raw);
        Ok(Self::from_text(&raw))
    }

    /// Normalize already-extracted text: collapse whitespace, drop blank lines.
    pub fn from_text(text: &str) -> Self {
        let text = text
            .lines()
            .map(normalize_line)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Lines { text }
    }

    /// Lines in document order. Cheap to call again for a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.lines()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

fn normalize_line(line: &str) -> String {
    SPACE_RE.replace_all(line, " ").trim().to_string()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source newlines inside a text node are formatting, not record breaks.
            Node::Text(text) => out.extend(text.chars().map(|c| match c {
                '\n' | '\r' => ' ',
                c => c,
            })),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_blocks_and_collapses_inline_markup() {
        let html = r#"<html><body><div class="post-body">
            <h3><span style="color:red">Russia -
              100</span>, of which: destroyed: 80</h3>
            <script>var x = "5 Fake:";</script>
            <ul><li><img src="flag.png"> 2 <b>T-54-3M</b>:&nbsp;<a href="https://x/1.jpg">(1, destroyed)</a> <a href="https://x/2.jpg">(2, captured)</a></li></ul>
        </div></body></html>"#;
        let lines = Lines::from_html(html).unwrap();
        let got: Vec<&str> = lines.iter().collect();
        assert_eq!(
            got,
            vec![
                "Russia - 100, of which: destroyed: 80",
                "2 T-54-3M: (1, destroyed) (2, captured)",
            ]
        );
    }

    #[test]
    fn br_ends_a_line() {
        let html = r#"<div class="post-body">Tanks (2, of which destroyed: 2)<br>1 T-72:<br/>1 T-80:</div>"#;
        let lines = Lines::from_html(html).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().nth(2), Some("1 T-80:"));
    }

    #[test]
    fn table_cells_are_separate_lines() {
        let html = r#"<div class="post-body"><table><tr><th>Tanks (2, of which destroyed: 2)</th></tr>
            <tr><td>Tanks (2, of which destroyed: 2)</td><td>2 T-72:</td></tr></table></div>"#;
        let lines = Lines::from_html(html).unwrap();
        assert_eq!(
            lines.iter().collect::<Vec<_>>(),
            vec![
                "Tanks (2, of which destroyed: 2)",
                "Tanks (2, of which destroyed: 2)",
                "2 T-72:",
            ]
        );
    }

    #[test]
    fn falls_back_to_article() {
        let html = "<article><p>10 T-90M:</p></article>";
        let lines = Lines::from_html(html).unwrap();
        assert_eq!(lines.iter().collect::<Vec<_>>(), vec!["10 T-90M:"]);
    }

    #[test]
    fn missing_container_is_parse_error() {
        let err = Lines::from_html("<html><body><p>nothing here</p></body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn iteration_is_restartable() {
        let lines = Lines::from_text("  a \n\n b\t c \n");
        let first: Vec<&str> = lines.iter().collect();
        let second: Vec<&str> = lines.iter().collect();
        assert_eq!(first, vec!["a", "b c"]);
        assert_eq!(first, second);
    }
}
