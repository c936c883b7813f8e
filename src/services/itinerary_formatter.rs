//! Itinerary text formatter
//!
//! Turns the loosely formatted text returned by the itinerary generation
//! service into typed display blocks, and renders those blocks as HTML.
//!
//! Rules, applied line by line:
//! - blank lines are skipped and never close an open list
//! - a leading `#` run is a heading marker and is dropped
//! - a leading `-` run, or a `*` run followed by whitespace, is a bullet marker and is dropped
//! - `**x**` becomes strong text, then `*x*` becomes emphasis
//! - `Day <n>:` / `Day <n> ` lines become headings, bullet lines become list items,
//!   everything else becomes a paragraph
//! - a list is closed only by a heading or by the end of the text

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static HEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*").unwrap());
static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[*-]+\s+|-+)").unwrap());
static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*]\s+").unwrap());
static STRONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static DAY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^day\s*\d+[:\s]").unwrap());

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
}

/// A line of display text made of inline spans.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct RichText(pub Vec<Inline>);

impl RichText {
    /// Text with all emphasis markers removed.
    pub fn plain(&self) -> String {
        self.0
            .iter()
            .map(|span| match span {
                Inline::Text(text) | Inline::Strong(text) | Inline::Emphasis(text) => {
                    text.as_str()
                }
            })
            .collect()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for span in &self.0 {
            match span {
                Inline::Text(text) => html.push_str(&escape_html(text)),
                Inline::Strong(text) => {
                    html.push_str("<strong>");
                    html.push_str(&escape_html(text));
                    html.push_str("</strong>");
                }
                Inline::Emphasis(text) => {
                    html.push_str("<em>");
                    html.push_str(&escape_html(text));
                    html.push_str("</em>");
                }
            }
        }
        html
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum FormattedBlock {
    Heading(RichText),
    ListStart,
    ListItem(RichText),
    ListEnd,
    Paragraph(RichText),
}

impl FormattedBlock {
    /// Plain text carried by the block, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            FormattedBlock::Heading(text)
            | FormattedBlock::ListItem(text)
            | FormattedBlock::Paragraph(text) => Some(text.plain()),
            FormattedBlock::ListStart | FormattedBlock::ListEnd => None,
        }
    }
}

pub fn format(text: &str) -> Vec<FormattedBlock> {
    let mut blocks = Vec::new();
    let mut in_list = false;

    for raw_line in text.trim().lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let without_heading = HEADING_MARKER.replace(line, "");
        let cleaned = BULLET_MARKER.replace(&without_heading, "");
        let rich = parse_inline(&cleaned);

        if DAY_HEADING.is_match(&rich.plain()) {
            if in_list {
                blocks.push(FormattedBlock::ListEnd);
                in_list = false;
            }
            blocks.push(FormattedBlock::Heading(rich));
        } else if BULLET_LINE.is_match(line) {
            if !in_list {
                blocks.push(FormattedBlock::ListStart);
                in_list = true;
            }
            blocks.push(FormattedBlock::ListItem(rich));
        } else {
            blocks.push(FormattedBlock::Paragraph(rich));
        }
    }

    if in_list {
        blocks.push(FormattedBlock::ListEnd);
    }
    blocks
}

pub fn render_html(blocks: &[FormattedBlock]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            FormattedBlock::Heading(text) => {
                html.push_str("<h4>");
                html.push_str(&text.to_html());
                html.push_str("</h4>");
            }
            FormattedBlock::ListStart => html.push_str("<ul>"),
            FormattedBlock::ListItem(text) => {
                html.push_str("<li>");
                html.push_str(&text.to_html());
                html.push_str("</li>");
            }
            FormattedBlock::ListEnd => html.push_str("</ul>"),
            FormattedBlock::Paragraph(text) => {
                html.push_str("<p>");
                html.push_str(&text.to_html());
                html.push_str("</p>");
            }
        }
    }
    html
}

pub fn format_html(text: &str) -> String {
    render_html(&format(text))
}

// Strong pairs first; emphasis only inside the text left between them.
fn parse_inline(line: &str) -> RichText {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in STRONG.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_emphasis_spans(&line[last..whole.start()], &mut spans);
        spans.push(Inline::Strong(inner.as_str().to_string()));
        last = whole.end();
    }
    push_emphasis_spans(&line[last..], &mut spans);
    RichText(spans)
}

fn push_emphasis_spans(segment: &str, spans: &mut Vec<Inline>) {
    let mut last = 0;
    for caps in EMPHASIS.captures_iter(segment) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Inline::Text(segment[last..whole.start()].to_string()));
        }
        spans.push(Inline::Emphasis(inner.as_str().to_string()));
        last = whole.end();
    }
    if last < segment.len() {
        spans.push(Inline::Text(segment[last..].to_string()));
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
