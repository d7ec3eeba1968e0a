//! Traversal state shared by the renderers.

use std::collections::HashMap;
use std::sync::LazyLock;

use url::Url;

/// Base that relative link references are checked against.
static LINK_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("file:///").expect("link base URL is valid"));

/// Per-call rich-text traversal state.
///
/// Created at the document root and threaded through the recursion. Each
/// `enter_*` helper restores the previous frame once its closure returns,
/// so sibling subtrees never observe each other's nesting.
#[derive(Debug, Default)]
pub(crate) struct RenderState {
    nesting: usize,
    blockquote_depth: usize,
    list_depth: usize,
    indent: f32,
    /// Max cell width per column for each open table, innermost last.
    tables: Vec<Vec<usize>>,
    next_attachment: usize,
}

impl RenderState {
    /// Number of node levels above the current node.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn enter_node<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    /// Number of block quotes enclosing the current node.
    pub fn blockquote_depth(&self) -> usize {
        self.blockquote_depth
    }

    /// Number of lists enclosing the current node.
    pub fn list_depth(&self) -> usize {
        self.list_depth
    }

    /// Accumulated head indent.
    pub fn indent(&self) -> f32 {
        self.indent
    }

    pub fn enter_list<R>(&mut self, indent: f32, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = (self.list_depth, self.indent);
        self.list_depth += 1;
        self.indent += indent;
        let result = f(self);
        (self.list_depth, self.indent) = saved;
        result
    }

    pub fn enter_block_quote<R>(&mut self, indent: f32, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = (self.blockquote_depth, self.indent);
        self.blockquote_depth += 1;
        self.indent += indent;
        let result = f(self);
        (self.blockquote_depth, self.indent) = saved;
        result
    }

    pub fn enter_table<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.tables.len();
        self.tables.push(Vec::new());
        let result = f(self);
        self.tables.truncate(depth);
        result
    }

    /// Record a cell of `width` in `column` of the innermost table.
    pub fn widen_column(&mut self, column: usize, width: usize) {
        let Some(widths) = self.tables.last_mut() else {
            return;
        };
        if widths.len() <= column {
            widths.resize(column + 1, 0);
        }
        widths[column] = widths[column].max(width);
    }

    /// Widest cell seen in `column` of the innermost table.
    pub fn column_width(&self, column: usize) -> usize {
        self.tables
            .last()
            .and_then(|widths| widths.get(column).copied())
            .unwrap_or(0)
    }

    /// Reserve the next `count` attachment indices and return the first.
    pub fn reserve_attachments(&mut self, count: usize) -> usize {
        let first = self.next_attachment;
        self.next_attachment += count;
        first
    }
}

/// Unique heading anchor generator.
#[derive(Debug, Default)]
pub(crate) struct HeadingAnchors {
    counts: HashMap<String, usize>,
}

impl HeadingAnchors {
    /// Slug for `text`, suffixed with `-N` when already taken.
    pub fn next(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.counts.entry(base.clone()).or_default();
        let id = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Convert text to URL-safe slug.
///
/// Lowercases ASCII alphanumerics, collapses whitespace, dashes and
/// underscores into single dashes, and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Link destination usable as a link attribute.
///
/// Accepts absolute URLs and references relative to the document
/// (`docs/page.md`, `/abs`, `#top`). Empty destinations and ones holding
/// whitespace or control characters are rejected.
pub(crate) fn link_target(destination: &str) -> Option<String> {
    if destination.is_empty()
        || destination
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
    {
        return None;
    }
    Url::options()
        .base_url(Some(&LINK_BASE))
        .parse(destination)
        .ok()
        .map(|_| destination.to_owned())
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
