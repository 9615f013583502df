// src/notes/markdown.rs
// =============================================================================
// This module pulls structure out of a note's Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Is fast and memory-efficient (it's a streaming parser)
//
// Two things are extracted:
// - The outline: every heading with its level
// - The links: every link destination, marked external (http/https) or
//   internal (relative links to other notes, anchors, etc.)
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLink {
    pub target: String,
    pub external: bool,
}

// Extracts all headings from Markdown text, in document order
//
// Example input:
//   "# Title\n\nSome text\n\n## Part *one*"
//
// Example output:
//   [Heading { level: 1, text: "Title" }, Heading { level: 2, text: "Part one" }]
pub fn outline(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();

    // Text inside a heading arrives as several events (plain, emphasis,
    // code...), so collect it until the heading ends.
    let mut current: Option<(usize, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                current = Some((level as usize, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = current.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, text)) = current.take() {
                    headings.push(Heading {
                        level,
                        text: text.trim().to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    headings
}

// Extracts every link destination from Markdown text
//
// Unlike a link checker we keep relative links too: in a vault they point
// at other notes.
pub fn note_links(markdown: &str) -> Vec<NoteLink> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link(_link_type, dest_url, _title)) if !dest_url.is_empty() => {
                let target = dest_url.to_string();
                Some(NoteLink {
                    external: is_http_link(&target),
                    target,
                })
            }
            _ => None,
        })
        .collect()
}

fn is_http_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_levels_and_text() {
        let markdown = "# Title\n\nSome text\n\n## Part *one*\n\n### `code` heading\n";
        let headings = outline(markdown);

        assert_eq!(
            headings,
            vec![
                Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                Heading {
                    level: 2,
                    text: "Part one".to_string()
                },
                Heading {
                    level: 3,
                    text: "code heading".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_outline_empty_for_plain_text() {
        assert!(outline("just a paragraph").is_empty());
    }

    #[test]
    fn test_links_internal_and_external() {
        let markdown = "See [Rust](https://www.rust-lang.org) and [other](./other%20note.md).";
        let links = note_links(markdown);

        assert_eq!(links.len(), 2);
        assert!(links[0].external);
        assert_eq!(links[1].target, "./other%20note.md");
        assert!(!links[1].external);
    }
}
