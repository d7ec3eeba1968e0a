//! Code block syntax highlighting.
//!
//! [`RegexHighlighter`] ships small built-in grammars for Rust and Swift.
//! Each grammar is a single alternation of named groups scanned left to
//! right, so a comment marker inside a string literal stays part of the
//! string.

use std::ops::Range;
use std::sync::LazyLock;

use mdview_style::{AttributeSet, Color};
use regex::Regex;

/// Attribute override for a byte range of the highlighted code.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub attributes: AttributeSet,
}

/// Syntax highlighter collaborator.
///
/// Implementations must return an empty list for languages they do not
/// know and must never panic.
pub trait Highlighter: Send + Sync {
    /// Spans to layer over `code`; ranges are byte offsets into `code`.
    fn highlight(&self, code: &str, language: Option<&str>) -> Vec<HighlightSpan>;
}

/// Highlighter that never styles anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, _code: &str, _language: Option<&str>) -> Vec<HighlightSpan> {
        Vec::new()
    }
}

/// Token classes recognized by the built-in grammars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenClass {
    Comment,
    String,
    Keyword,
    Literal,
    Type,
}

impl TokenClass {
    const ALL: [Self; 5] = [
        Self::Comment,
        Self::String,
        Self::Keyword,
        Self::Literal,
        Self::Type,
    ];

    fn group(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::String => "string",
            Self::Keyword => "keyword",
            Self::Literal => "literal",
            Self::Type => "type",
        }
    }
}

/// Colors per token class.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightTheme {
    pub comment: Color,
    pub string: Color,
    pub keyword: Color,
    pub literal: Color,
    pub type_name: Color,
}

impl HighlightTheme {
    fn attributes(&self, class: TokenClass) -> AttributeSet {
        let color = match class {
            TokenClass::Comment => self.comment,
            TokenClass::String => self.string,
            TokenClass::Keyword => self.keyword,
            TokenClass::Literal => self.literal,
            TokenClass::Type => self.type_name,
        };
        AttributeSet {
            foreground: Some(color),
            ..AttributeSet::default()
        }
    }
}

impl Default for HighlightTheme {
    fn default() -> Self {
        Self {
            comment: Color::from_hex(0x6C_79_86),
            string: Color::from_hex(0xFC_6A_5D),
            keyword: Color::from_hex(0xFC_5F_A3),
            literal: Color::from_hex(0xFC_5F_A3),
            type_name: Color::from_hex(0x9E_F1_DD),
        }
    }
}

const COMMENT: &str = r"(?P<comment>//[^\n]*|/\*(?s:.)*?\*/)";
const STRING: &str = r#"(?P<string>"(?:[^"\\\n]|\\.)*")"#;
const TYPE: &str = r"(?P<type>\b[A-Z][A-Za-z0-9_]*\b)";

fn grammar(keywords: &[&str], literals: &[&str]) -> Regex {
    let pattern = format!(
        r"{COMMENT}|{STRING}|(?P<keyword>\b(?:{})\b)|(?P<literal>\b(?:{})\b|\b[0-9][0-9_]*(?:\.[0-9]+)?\b)|{TYPE}",
        keywords.join("|"),
        literals.join("|"),
    );
    Regex::new(&pattern).expect("invalid highlight grammar")
}

static RUST: LazyLock<Regex> = LazyLock::new(|| {
    grammar(
        &[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
            "extern", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
            "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
            "type", "unsafe", "use", "where", "while",
        ],
        &["true", "false", "None", "Some", "Ok", "Err"],
    )
});

static SWIFT: LazyLock<Regex> = LazyLock::new(|| {
    grammar(
        &[
            "associatedtype", "case", "class", "defer", "deinit", "do", "else", "enum",
            "extension", "fileprivate", "for", "func", "guard", "if", "import", "in", "init",
            "internal", "let", "private", "protocol", "public", "repeat", "return", "self",
            "Self", "static", "struct", "subscript", "super", "switch", "throws", "try", "var",
            "where", "while",
        ],
        &["true", "false", "nil"],
    )
});

/// Regex-based highlighter with built-in Rust and Swift grammars.
#[derive(Clone, Debug, Default)]
pub struct RegexHighlighter {
    theme: HighlightTheme,
}

impl RegexHighlighter {
    /// Highlighter using `theme` colors.
    #[must_use]
    pub fn new(theme: HighlightTheme) -> Self {
        Self { theme }
    }

    /// Classify tokens of `code`, in order.
    pub fn tokens(&self, code: &str, language: Option<&str>) -> Vec<(Range<usize>, TokenClass)> {
        let Some(grammar) = language.and_then(grammar_for) else {
            return Vec::new();
        };
        grammar
            .captures_iter(code)
            .filter_map(|caps| {
                TokenClass::ALL.into_iter().find_map(|class| {
                    caps.name(class.group())
                        .map(|matched| (matched.range(), class))
                })
            })
            .collect()
    }
}

fn grammar_for(language: &str) -> Option<&'static Regex> {
    match language.to_ascii_lowercase().as_str() {
        "rust" | "rs" => Some(&RUST),
        "swift" => Some(&SWIFT),
        _ => None,
    }
}

impl Highlighter for RegexHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Vec<HighlightSpan> {
        self.tokens(code, language)
            .into_iter()
            .map(|(range, class)| HighlightSpan {
                range,
                attributes: self.theme.attributes(class),
            })
            .collect()
    }
}
