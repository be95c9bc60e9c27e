//! Markdown bodies parsed into styled rich-text lines.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde_json::Value;

use crate::config::ThemeColor;
use crate::display::{DisplayNode, RichLine, RichSpan};
use crate::error::MalformedBody;

use super::body_str;

/// Markdown renderer entry point.
pub fn markdown(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    Ok(DisplayNode::Rich(to_rich_lines(body_str(body, "markdown")?)))
}

/// Accumulates parser events into finished lines.
#[derive(Default)]
struct LineBuilder {
    lines: Vec<RichLine>,
    current: Vec<RichSpan>,
    bold: u32,
    italic: u32,
    code_block: bool,
    heading: bool,
    /// Bullet depth; numbered lists carry their next index.
    list_stack: Vec<Option<u64>>,
}

impl LineBuilder {
    fn push_text(&mut self, text: &str) {
        // Code blocks arrive with embedded newlines; split them into lines.
        let mut first = true;
        for part in text.split('\n') {
            if !first {
                self.flush_line();
            }
            first = false;
            if !part.is_empty() {
                self.current.push(RichSpan {
                    text: part.to_string(),
                    bold: self.bold > 0 || self.heading,
                    italic: self.italic > 0,
                    code: self.code_block,
                });
            }
        }
    }

    fn push_code(&mut self, text: &str) {
        self.current.push(RichSpan {
            text: text.to_string(),
            bold: self.bold > 0 || self.heading,
            italic: self.italic > 0,
            code: true,
        });
    }

    fn flush_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(RichLine { spans });
    }

    /// End a block element: finish the pending line, if any.
    fn end_block(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(RichLine::default());
        }
    }

    fn item_marker(&mut self) {
        let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
        let marker = match self.list_stack.last_mut() {
            Some(Some(n)) => {
                let m = format!("{indent}{n}. ");
                *n += 1;
                m
            }
            _ => format!("{indent}\u{2022} "),
        };
        self.current.push(RichSpan::plain(marker));
    }
}

fn heading_prefix(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        HeadingLevel::H4 => "#### ",
        HeadingLevel::H5 => "##### ",
        HeadingLevel::H6 => "###### ",
    }
}

/// Parse markdown source into display lines.
pub fn to_rich_lines(src: &str) -> Vec<RichLine> {
    let mut b = LineBuilder::default();

    for event in Parser::new(src) {
        match event {
            Event::Start(Tag::Paragraph) => b.blank_line(),
            Event::End(TagEnd::Paragraph) => b.end_block(),
            Event::Start(Tag::Heading { level, .. }) => {
                b.blank_line();
                b.heading = true;
                b.current.push(RichSpan {
                    text: heading_prefix(level).to_string(),
                    bold: true,
                    ..RichSpan::default()
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                b.heading = false;
                b.end_block();
            }
            Event::Start(Tag::List(start)) => b.list_stack.push(start),
            Event::End(TagEnd::List(_)) => {
                b.list_stack.pop();
                if b.list_stack.is_empty() {
                    b.blank_line();
                }
            }
            Event::Start(Tag::Item) => b.item_marker(),
            Event::End(TagEnd::Item) => b.end_block(),
            Event::Start(Tag::CodeBlock(_)) => {
                b.blank_line();
                b.code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                b.code_block = false;
                b.end_block();
            }
            Event::Start(Tag::Emphasis) => b.italic += 1,
            Event::End(TagEnd::Emphasis) => b.italic = b.italic.saturating_sub(1),
            Event::Start(Tag::Strong) => b.bold += 1,
            Event::End(TagEnd::Strong) => b.bold = b.bold.saturating_sub(1),
            Event::Start(Tag::Link { .. }) => {}
            Event::End(TagEnd::Link) => {}
            Event::Text(text) => b.push_text(&text),
            Event::Code(code) => b.push_code(&code),
            Event::SoftBreak | Event::HardBreak => b.flush_line(),
            Event::Rule => {
                b.end_block();
                b.lines.push(RichLine {
                    spans: vec![RichSpan::plain("\u{2500}".repeat(24))],
                });
            }
            _ => {}
        }
    }
    b.end_block();

    // Trim the leading blank a first block-start may have produced.
    if b.lines.first().is_some_and(RichLine::is_empty) {
        b.lines.remove(0);
    }
    b.lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> Vec<RichLine> {
        to_rich_lines(src)
    }

    fn line_text(line: &RichLine) -> String {
        line.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn paragraph_is_a_plain_line() {
        let lines = render("hello world");
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "hello world");
        assert!(!lines[0].spans[0].bold);
    }

    #[test]
    fn strong_and_emphasis_set_flags() {
        let lines = render("a **b** *c*");
        let spans = &lines[0].spans;
        assert!(spans.iter().any(|s| s.text == "b" && s.bold));
        assert!(spans.iter().any(|s| s.text == "c" && s.italic));
    }

    #[test]
    fn heading_keeps_marker_and_bold() {
        let lines = render("## Title");
        assert_eq!(line_text(&lines[0]), "## Title");
        assert!(lines[0].spans.iter().all(|s| s.bold));
    }

    #[test]
    fn bullets_and_numbers() {
        let lines = render("- one\n- two\n\n1. first");
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert!(texts.contains(&"\u{2022} one".to_string()));
        assert!(texts.contains(&"\u{2022} two".to_string()));
        assert!(texts.contains(&"1. first".to_string()));
    }

    #[test]
    fn inline_code_is_flagged() {
        let lines = render("run `cargo test` now");
        assert!(lines[0].spans.iter().any(|s| s.text == "cargo test" && s.code));
    }

    #[test]
    fn code_block_splits_lines() {
        let lines = render("```\nfn a() {}\nfn b() {}\n```");
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert!(texts.contains(&"fn a() {}".to_string()));
        assert!(texts.contains(&"fn b() {}".to_string()));
    }

    #[test]
    fn renderer_rejects_non_string_body() {
        assert!(markdown(&serde_json::json!(["x"]), &ThemeColor::DEFAULT).is_err());
    }
}
