//! Node kinds and per-node metadata.

/// Index of a node inside a [`Document`](crate::Document) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Source lines covered by a node (1-based, inclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRange {
    /// First line of the construct.
    pub start_line: usize,
    /// Last line of the construct.
    pub end_line: usize,
}

impl SourceRange {
    /// Create a range spanning `start_line..=end_line`.
    #[must_use]
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line: end_line.max(start_line),
        }
    }
}

/// Task list checkbox state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Checkbox {
    Checked,
    Unchecked,
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
}

/// Kind of a document node together with its kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Document,
    Paragraph,
    /// Heading with level 1-6.
    Heading {
        level: u8,
    },
    Text(String),
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode(String),
    CodeBlock {
        code: String,
        language: Option<String>,
    },
    Link {
        destination: Option<String>,
        title: Option<String>,
    },
    /// Image; alt text is kept as child nodes.
    Image {
        source: Option<String>,
        title: Option<String>,
    },
    OrderedList {
        start: u64,
    },
    UnorderedList,
    ListItem {
        checkbox: Option<Checkbox>,
    },
    /// Table with per-column alignment (`None` when the delimiter row is bare).
    Table {
        alignments: Vec<Option<ColumnAlignment>>,
    },
    /// Header row; children are cells.
    TableHead,
    /// Body section; children are rows.
    TableBody,
    TableRow,
    TableCell {
        column: usize,
    },
    BlockQuote,
    ThematicBreak,
    SoftBreak,
    LineBreak,
    HtmlBlock(String),
    InlineHtml(String),
    /// Construct that no renderer handles specifically (footnotes,
    /// definition lists, math, ...). Rendered by concatenating children.
    Unsupported(String),
}

impl NodeKind {
    /// Short name of the construct, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Document => "Document",
            Self::Paragraph => "Paragraph",
            Self::Heading { .. } => "Heading",
            Self::Text(_) => "Text",
            Self::Emphasis => "Emphasis",
            Self::Strong => "Strong",
            Self::Strikethrough => "Strikethrough",
            Self::InlineCode(_) => "InlineCode",
            Self::CodeBlock { .. } => "CodeBlock",
            Self::Link { .. } => "Link",
            Self::Image { .. } => "Image",
            Self::OrderedList { .. } => "OrderedList",
            Self::UnorderedList => "UnorderedList",
            Self::ListItem { .. } => "ListItem",
            Self::Table { .. } => "Table",
            Self::TableHead => "TableHead",
            Self::TableBody => "TableBody",
            Self::TableRow => "TableRow",
            Self::TableCell { .. } => "TableCell",
            Self::BlockQuote => "BlockQuote",
            Self::ThematicBreak => "ThematicBreak",
            Self::SoftBreak => "SoftBreak",
            Self::LineBreak => "LineBreak",
            Self::HtmlBlock(_) => "HtmlBlock",
            Self::InlineHtml(_) => "InlineHtml",
            Self::Unsupported(name) => name,
        }
    }

    /// Whether the construct is block-level.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::Paragraph
                | Self::Heading { .. }
                | Self::CodeBlock { .. }
                | Self::OrderedList { .. }
                | Self::UnorderedList
                | Self::ListItem { .. }
                | Self::Table { .. }
                | Self::TableHead
                | Self::TableBody
                | Self::TableRow
                | Self::TableCell { .. }
                | Self::BlockQuote
                | Self::ThematicBreak
                | Self::HtmlBlock(_)
        )
    }

    /// Whether the construct is a list container.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::OrderedList { .. } | Self::UnorderedList)
    }
}

/// A node in the document arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) range: Option<SourceRange>,
}

impl Node {
    /// Node kind and payload.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent node, `None` for the document root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Source lines covered by the node, when known.
    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }
}
