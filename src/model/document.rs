//! Document-level types.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{HeadingNode, Node, NodeKind, TableNode};
use crate::table::{ProcessedTable, TableConfig, TableProcessor};

/// A parsed filing document.
///
/// The node sequence is built once by the parser and is read through the
/// [`headings`](Document::headings), [`tables`](Document::tables) and
/// [`nodes`](Document::nodes) views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Nodes in document order
    pub nodes: Vec<Node>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let page_count = nodes.iter().filter(|n| n.is_page_break()).count() as u32;
        Self {
            metadata: Metadata {
                page_count,
                ..Default::default()
            },
            nodes,
        }
    }

    /// The full ordered node sequence.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &HeadingNode> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Heading(h) => Some(h),
            _ => None,
        })
    }

    /// All tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Table(t) => Some(t),
            _ => None,
        })
    }

    /// All nodes of one kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// Count nodes of one kind.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes_of_kind(kind).count()
    }

    /// Number of pages, or 0 when page tracking was disabled.
    pub fn page_count(&self) -> u32 {
        self.metadata.page_count
    }

    /// Check if the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .map(Node::plain_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Run every table through the structural processor.
    ///
    /// The result has one entry per table in document order; `None` marks a
    /// table with no content after pruning. Tables share no state, so with
    /// `parallel` set they are processed on the rayon pool.
    pub fn process_tables(&self, config: &TableConfig, parallel: bool) -> Vec<Option<ProcessedTable>> {
        let processor = TableProcessor::new(config.clone());
        let tables: Vec<&TableNode> = self.tables().collect();

        if parallel {
            tables.par_iter().map(|t| processor.process(t)).collect()
        } else {
            tables.iter().map(|t| processor.process(t)).collect()
        }
    }

    /// Build a nested outline from the heading levels.
    ///
    /// Each heading nests under the closest preceding heading with a lower
    /// level. Page numbers are attached when page breaks were emitted.
    pub fn outline(&self) -> Outline {
        let mut flat = Vec::new();
        let mut page = None;
        for node in &self.nodes {
            match node {
                Node::PageBreak(pb) => page = Some(pb.page_number),
                Node::Heading(h) => flat.push(OutlineItem::new(h.text.clone(), page, h.level)),
                _ => {}
            }
        }

        let mut outline = Outline::new();
        let mut open: Vec<OutlineItem> = Vec::new();
        for item in flat {
            while open.last().is_some_and(|top| top.level >= item.level) {
                close_item(&mut open, &mut outline);
            }
            open.push(item);
        }
        while !open.is_empty() {
            close_item(&mut open, &mut outline);
        }
        outline
    }
}

/// Pop the innermost open outline item and attach it to its parent.
fn close_item(open: &mut Vec<OutlineItem>, outline: &mut Outline) {
    if let Some(item) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(item),
            None => outline.items.push(item),
        }
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Contents of the `<title>` element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Total number of pages (0 when page tracking is disabled)
    pub page_count: u32,
}

/// Heading outline of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level outline items
    pub items: Vec<OutlineItem>,
}

impl Outline {
    /// Create a new empty outline.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the total number of items (including nested).
    pub fn total_items(&self) -> usize {
        fn count_items(items: &[OutlineItem]) -> usize {
            items
                .iter()
                .map(|item| 1 + count_items(&item.children))
                .sum()
        }
        count_items(&self.items)
    }
}

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineItem {
    /// Heading text
    pub title: String,

    /// Page the heading sits on (0-based)
    pub page: Option<u32>,

    /// Heading level (1-4)
    pub level: u8,

    /// Child items
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Create a new outline item.
    pub fn new(title: impl Into<String>, page: Option<u32>, level: u8) -> Self {
        Self {
            title: title.into(),
            page,
            level,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BreakSource, PageBreakNode, StyleRecord, TableRow, TextBlockNode};

    fn heading(text: &str, level: u8) -> Node {
        Node::Heading(HeadingNode::new(text, StyleRecord::default(), level))
    }

    #[test]
    fn test_document_views() {
        let doc = Document::from_nodes(vec![
            heading("PART I", 1),
            Node::TextBlock(TextBlockNode::new("Body", StyleRecord::default())),
            Node::Table(TableNode::with_rows(vec![TableRow::from_strings(["a", "1"])])),
        ]);

        assert_eq!(doc.headings().count(), 1);
        assert_eq!(doc.tables().count(), 1);
        assert_eq!(doc.nodes().len(), 3);
        assert_eq!(doc.count(NodeKind::TextBlock), 1);
    }

    #[test]
    fn test_page_count_from_breaks() {
        let doc = Document::from_nodes(vec![
            Node::PageBreak(PageBreakNode::new(0, BreakSource::DocumentStart)),
            heading("PART I", 1),
            Node::PageBreak(PageBreakNode::new(1, BreakSource::ClassName)),
        ]);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_outline_nesting() {
        let doc = Document::from_nodes(vec![
            Node::PageBreak(PageBreakNode::new(0, BreakSource::DocumentStart)),
            heading("PART I", 1),
            heading("ITEM 1. Business", 2),
            heading("Competition", 4),
            Node::PageBreak(PageBreakNode::new(1, BreakSource::ExplicitStyle)),
            heading("ITEM 1A. Risk Factors", 2),
            heading("PART II", 1),
        ]);

        let outline = doc.outline();
        assert_eq!(outline.items.len(), 2);
        assert_eq!(outline.total_items(), 5);

        let part1 = &outline.items[0];
        assert_eq!(part1.children.len(), 2);
        assert_eq!(part1.children[0].children[0].title, "Competition");
        assert_eq!(part1.children[1].page, Some(1));
    }

    #[test]
    fn test_process_tables_parallel_matches_serial() {
        let table = TableNode::with_rows(vec![
            TableRow::from_strings(["Revenue", "100"]),
            TableRow::from_strings(["Cost", "(40)"]),
        ]);
        let doc = Document::from_nodes(vec![Node::Table(table.clone()), Node::Table(table)]);

        let config = TableConfig::default();
        assert_eq!(
            doc.process_tables(&config, true),
            doc.process_tables(&config, false)
        );
    }
}
