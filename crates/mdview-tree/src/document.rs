//! Document arena and read-only tree queries.

use crate::node::{Checkbox, ColumnAlignment, Node, NodeId, NodeKind, SourceRange};

/// Deepest node level renderers and the tree dump descend into. Anything
/// below is flattened to its text.
pub const MAX_NESTING: usize = 64;

/// Parsed markdown document stored as an arena of nodes.
///
/// Nodes own their children by index; the parent index is a non-owning
/// back reference used only for ancestor queries (nesting depth, enclosing
/// table). The root is always [`Document::root`] and has kind
/// [`NodeKind::Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        DocumentBuilder::new().finish()
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no content besides the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Get a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Kind of the node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Children of the node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    /// Parent of the node, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Source range of the node.
    #[must_use]
    pub fn range(&self, id: NodeId) -> Option<SourceRange> {
        self.node(id).range
    }

    /// Ancestors of the node, nearest first. The node itself is excluded.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&current| self.parent(current))
    }

    /// All nodes below `id` in pre-order, `id` included.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    /// Position of the node among its siblings (0 for the root).
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> usize {
        self.parent(id)
            .and_then(|parent| self.children(parent).iter().position(|&c| c == id))
            .unwrap_or(0)
    }

    /// Concatenated text content of the node and its descendants.
    ///
    /// Breaks contribute a single space; code contributes its raw source.
    #[must_use]
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            match self.kind(node) {
                NodeKind::Text(text) | NodeKind::InlineCode(text) => out.push_str(text),
                NodeKind::CodeBlock { code, .. } => out.push_str(code),
                NodeKind::SoftBreak | NodeKind::LineBreak => out.push(' '),
                _ => {}
            }
        }
        out
    }

    /// Raw code of an inline code span or code block.
    #[must_use]
    pub fn code(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::InlineCode(code) | NodeKind::CodeBlock { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Language identifier of a code block.
    #[must_use]
    pub fn language(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::CodeBlock { language, .. } => language.as_deref(),
            _ => None,
        }
    }

    /// Destination of a link.
    #[must_use]
    pub fn destination(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Link { destination, .. } => destination.as_deref(),
            _ => None,
        }
    }

    /// Source URL of an image.
    #[must_use]
    pub fn source(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Image { source, .. } => source.as_deref(),
            _ => None,
        }
    }

    /// Checkbox state of a task list item.
    #[must_use]
    pub fn checkbox(&self, id: NodeId) -> Option<Checkbox> {
        match self.kind(id) {
            NodeKind::ListItem { checkbox } => *checkbox,
            _ => None,
        }
    }

    /// Column alignments of a table. Empty for non-table nodes.
    #[must_use]
    pub fn column_alignments(&self, id: NodeId) -> &[Option<ColumnAlignment>] {
        match self.kind(id) {
            NodeKind::Table { alignments } => alignments,
            _ => &[],
        }
    }

    /// Nearest table enclosing the node.
    #[must_use]
    pub fn enclosing_table(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| matches!(self.kind(a), NodeKind::Table { .. }))
    }

    /// Whether the node sits inside a table header row.
    #[must_use]
    pub fn is_in_table_head(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .any(|a| matches!(self.kind(a), NodeKind::TableHead))
    }

    /// Number of list containers enclosing the node.
    #[must_use]
    pub fn list_depth(&self, id: NodeId) -> usize {
        self.ancestors(id)
            .filter(|&a| self.kind(a).is_list())
            .count()
    }

    /// Number of block quotes enclosing the node.
    #[must_use]
    pub fn blockquote_depth(&self, id: NodeId) -> usize {
        self.ancestors(id)
            .filter(|&a| matches!(self.kind(a), NodeKind::BlockQuote))
            .count()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Incremental document constructor.
///
/// Nodes are appended to the currently open container, so the resulting
/// tree is always finite and acyclic. Parsers other than the built-in
/// `pulldown-cmark` bridge can use this to produce documents.
///
/// ```
/// use mdview_tree::{DocumentBuilder, NodeKind};
///
/// let mut builder = DocumentBuilder::new();
/// builder.open(NodeKind::Paragraph, None);
/// builder.text("Hello", None);
/// builder.close();
/// let document = builder.finish();
/// assert_eq!(document.plain_text(document.root()), "Hello");
/// ```
#[derive(Debug)]
pub struct DocumentBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl DocumentBuilder {
    /// Create a builder with an open document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                range: None,
            }],
            open: vec![NodeId(0)],
        }
    }

    /// Currently open container.
    #[must_use]
    pub fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId(0))
    }

    /// Append a container node and make it current.
    pub fn open(&mut self, kind: NodeKind, range: Option<SourceRange>) -> NodeId {
        let id = self.push(kind, range);
        self.open.push(id);
        id
    }

    /// Close the current container. The root is never closed.
    pub fn close(&mut self) -> Option<NodeId> {
        if self.open.len() > 1 {
            self.open.pop()
        } else {
            None
        }
    }

    /// Append a node that will not receive children.
    pub fn leaf(&mut self, kind: NodeKind, range: Option<SourceRange>) -> NodeId {
        self.push(kind, range)
    }

    /// Append text, merging into an immediately preceding text sibling.
    pub fn text(&mut self, content: &str, range: Option<SourceRange>) -> NodeId {
        let parent = self.current();
        if let Some(&last) = self.nodes[parent.0].children.last() {
            let node = &mut self.nodes[last.0];
            if let NodeKind::Text(existing) = &mut node.kind {
                existing.push_str(content);
                node.range = match (node.range, range) {
                    (Some(a), Some(b)) => Some(SourceRange::new(a.start_line, b.end_line)),
                    (a, b) => a.or(b),
                };
                return last;
            }
        }
        self.push(NodeKind::Text(content.to_owned()), range)
    }

    /// Mutable access to the kind of an already appended node.
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// Innermost open container matching the predicate.
    pub fn find_open(&self, predicate: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.open
            .iter()
            .rev()
            .copied()
            .find(|id| predicate(&self.nodes[id.0].kind))
    }

    /// Close all open containers and return the document.
    #[must_use]
    pub fn finish(self) -> Document {
        Document { nodes: self.nodes }
    }

    fn push(&mut self, kind: NodeKind, range: Option<SourceRange>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.current();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            range,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_lists() -> (Document, NodeId) {
        let mut builder = DocumentBuilder::new();
        builder.open(NodeKind::UnorderedList, None);
        builder.open(NodeKind::ListItem { checkbox: None }, None);
        builder.open(NodeKind::OrderedList { start: 1 }, None);
        let inner = builder.open(NodeKind::ListItem { checkbox: None }, None);
        builder.text("deep", None);
        (builder.finish(), inner)
    }

    #[test]
    fn test_empty_document() {
        let document = Document::new();
        assert!(document.is_empty());
        assert_eq!(document.len(), 1);
        assert_eq!(document.kind(document.root()), &NodeKind::Document);
        assert_eq!(document.parent(document.root()), None);
    }

    #[test]
    fn test_builder_parent_links() {
        let mut builder = DocumentBuilder::new();
        let paragraph = builder.open(NodeKind::Paragraph, Some(SourceRange::new(1, 1)));
        let text = builder.text("Hello", None);
        builder.close();
        let document = builder.finish();

        assert_eq!(document.parent(text), Some(paragraph));
        assert_eq!(document.parent(paragraph), Some(document.root()));
        assert_eq!(document.children(document.root()), &[paragraph]);
        assert_eq!(document.range(paragraph), Some(SourceRange::new(1, 1)));
    }

    #[test]
    fn test_builder_coalesces_text() {
        let mut builder = DocumentBuilder::new();
        builder.open(NodeKind::Paragraph, None);
        let first = builder.text("Hello", Some(SourceRange::new(1, 1)));
        let second = builder.text(", world", Some(SourceRange::new(2, 2)));
        let document = builder.finish();

        assert_eq!(first, second);
        assert_eq!(document.kind(first), &NodeKind::Text("Hello, world".to_owned()));
        assert_eq!(document.range(first), Some(SourceRange::new(1, 2)));
    }

    #[test]
    fn test_builder_never_closes_root() {
        let mut builder = DocumentBuilder::new();
        assert_eq!(builder.close(), None);
        assert_eq!(builder.current(), NodeId(0));
    }

    #[test]
    fn test_depth_queries() {
        let (document, inner) = nested_lists();
        assert_eq!(document.list_depth(inner), 2);
        assert_eq!(document.blockquote_depth(inner), 0);
        assert_eq!(document.ancestors(inner).count(), 4);
    }

    #[test]
    fn test_index_in_parent() {
        let mut builder = DocumentBuilder::new();
        builder.open(NodeKind::OrderedList { start: 1 }, None);
        let a = builder.leaf(NodeKind::ListItem { checkbox: None }, None);
        let b = builder.leaf(NodeKind::ListItem { checkbox: None }, None);
        let document = builder.finish();
        assert_eq!(document.index_in_parent(a), 0);
        assert_eq!(document.index_in_parent(b), 1);
        assert_eq!(document.index_in_parent(document.root()), 0);
    }

    #[test]
    fn test_plain_text_includes_code_and_breaks() {
        let mut builder = DocumentBuilder::new();
        let heading = builder.open(NodeKind::Heading { level: 2 }, None);
        builder.text("Install", None);
        builder.leaf(NodeKind::SoftBreak, None);
        builder.leaf(NodeKind::InlineCode("npm".to_owned()), None);
        let document = builder.finish();
        assert_eq!(document.plain_text(heading), "Install npm");
    }

    #[test]
    fn test_plain_text_of_deep_tree() {
        let mut builder = DocumentBuilder::new();
        for _ in 0..100_000 {
            builder.open(NodeKind::BlockQuote, None);
        }
        builder.text("deep", None);
        let document = builder.finish();
        assert_eq!(document.plain_text(document.root()), "deep");
    }

    #[test]
    fn test_enclosing_table() {
        let mut builder = DocumentBuilder::new();
        let table = builder.open(
            NodeKind::Table {
                alignments: vec![Some(ColumnAlignment::Left), None],
            },
            None,
        );
        builder.open(NodeKind::TableHead, None);
        let cell = builder.open(NodeKind::TableCell { column: 1 }, None);
        let document = builder.finish();

        assert_eq!(document.enclosing_table(cell), Some(table));
        assert!(document.is_in_table_head(cell));
        assert_eq!(
            document.column_alignments(table),
            &[Some(ColumnAlignment::Left), None]
        );
    }

    #[test]
    fn test_descendants_pre_order() {
        let (document, inner) = nested_lists();
        let order: Vec<NodeId> = document.descendants(document.root()).collect();
        assert_eq!(order.len(), document.len());
        assert_eq!(order[0], document.root());
        let inner_pos = order.iter().position(|&id| id == inner).unwrap();
        assert_eq!(order.len() - 1, inner_pos + 1);
    }
}
