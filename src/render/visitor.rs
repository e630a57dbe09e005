//! Visitor pattern for filtering and rewriting document nodes.
//!
//! A visitor sees every node of a [`Document`] in order and decides whether
//! to keep it, drop it, or replace it with plain text. [`apply_visitor`]
//! produces the rewritten document; the source is left untouched.
//!
//! # Example
//!
//! ```
//! use sechtml::model::TableNode;
//! use sechtml::render::visitor::{DocumentVisitor, VisitorAction};
//!
//! struct DropTables;
//!
//! impl DocumentVisitor for DropTables {
//!     fn visit_table(&mut self, _table: &TableNode) -> VisitorAction {
//!         VisitorAction::Skip
//!     }
//! }
//! ```

use crate::model::{
    Document, HeadingNode, Node, PageBreakNode, StyleRecord, TableNode, TextBlockNode,
};

/// Action returned by visitor methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Keep the node as it is.
    #[default]
    Continue,

    /// Replace the node with a text block holding this text.
    Replace(String),

    /// Drop the node.
    Skip,
}

impl VisitorAction {
    /// Check if this action indicates the node should be skipped.
    pub fn should_skip(&self) -> bool {
        matches!(self, VisitorAction::Skip)
    }

    /// Check if this action provides replacement content.
    pub fn is_replace(&self) -> bool {
        matches!(self, VisitorAction::Replace(_))
    }

    /// Get replacement content if available.
    pub fn replacement(&self) -> Option<&str> {
        match self {
            VisitorAction::Replace(s) => Some(s),
            _ => None,
        }
    }
}

/// Trait for visiting document nodes.
///
/// One method per node kind. All methods return `VisitorAction::Continue`
/// by default.
pub trait DocumentVisitor: Send + Sync {
    /// Called for each heading.
    fn visit_heading(&mut self, heading: &HeadingNode) -> VisitorAction {
        let _ = heading;
        VisitorAction::Continue
    }

    /// Called for each text block.
    fn visit_text_block(&mut self, block: &TextBlockNode) -> VisitorAction {
        let _ = block;
        VisitorAction::Continue
    }

    /// Called for each table.
    fn visit_table(&mut self, table: &TableNode) -> VisitorAction {
        let _ = table;
        VisitorAction::Continue
    }

    /// Called for each page break.
    fn visit_page_break(&mut self, page_break: &PageBreakNode) -> VisitorAction {
        let _ = page_break;
        VisitorAction::Continue
    }

    /// Called when a page begins, before its page break is visited.
    ///
    /// # Arguments
    /// * `page_number` - The 0-based page number
    fn on_page_start(&mut self, page_number: u32) {
        let _ = page_number;
    }
}

/// Dispatch one node to the matching visitor method.
pub fn visit_node<V: DocumentVisitor + ?Sized>(visitor: &mut V, node: &Node) -> VisitorAction {
    match node {
        Node::Heading(h) => visitor.visit_heading(h),
        Node::TextBlock(t) => visitor.visit_text_block(t),
        Node::Table(t) => visitor.visit_table(t),
        Node::PageBreak(p) => {
            visitor.on_page_start(p.page_number);
            visitor.visit_page_break(p)
        }
    }
}

/// Run a visitor over a document and collect the rewritten nodes.
///
/// Replacement text blocks keep the annotations of the node they replace.
/// Metadata is copied unchanged, so `page_count` still describes the source
/// even when page breaks were skipped.
pub fn apply_visitor<V: DocumentVisitor + ?Sized>(doc: &Document, visitor: &mut V) -> Document {
    let mut nodes = Vec::with_capacity(doc.nodes.len());

    for node in &doc.nodes {
        match visit_node(visitor, node) {
            VisitorAction::Continue => nodes.push(node.clone()),
            VisitorAction::Skip => {}
            VisitorAction::Replace(text) => {
                let mut block = TextBlockNode::new(text, replacement_style(node));
                block.annotations = node.annotations().clone();
                nodes.push(Node::TextBlock(block));
            }
        }
    }

    Document {
        metadata: doc.metadata.clone(),
        nodes,
    }
}

fn replacement_style(node: &Node) -> StyleRecord {
    match node {
        Node::Heading(h) => h.style.clone(),
        Node::TextBlock(t) => t.style.clone(),
        Node::Table(_) | Node::PageBreak(_) => StyleRecord::default(),
    }
}

/// Default visitor that performs no customization.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    /// Create a new default visitor.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentVisitor for DefaultVisitor {}

/// Visitor that drops all page breaks.
#[derive(Debug, Clone, Default)]
pub struct SkipPageBreaksVisitor;

impl DocumentVisitor for SkipPageBreaksVisitor {
    fn visit_page_break(&mut self, _page_break: &PageBreakNode) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that flattens tables into pipe-separated text.
#[derive(Debug, Clone, Default)]
pub struct SimpleTableVisitor;

impl DocumentVisitor for SimpleTableVisitor {
    fn visit_table(&mut self, table: &TableNode) -> VisitorAction {
        let lines: Vec<String> = table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|c| c.plain_text())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect();
        VisitorAction::Replace(lines.join("\n"))
    }
}

/// Visitor that demotes headings deeper than a maximum level to text.
#[derive(Debug, Clone)]
pub struct MaxHeadingDepthVisitor {
    max_level: u8,
}

impl MaxHeadingDepthVisitor {
    /// Create a visitor that keeps headings up to the specified level.
    pub fn new(max_level: u8) -> Self {
        Self {
            max_level: max_level.clamp(1, 4),
        }
    }
}

impl DocumentVisitor for MaxHeadingDepthVisitor {
    fn visit_heading(&mut self, heading: &HeadingNode) -> VisitorAction {
        if heading.level > self.max_level {
            VisitorAction::Replace(heading.text.clone())
        } else {
            VisitorAction::Continue
        }
    }
}

/// Visitor that counts nodes per page.
#[derive(Debug, Clone, Default)]
pub struct PageCounter {
    /// Node counts indexed by page number; page breaks are not counted
    pub nodes_per_page: Vec<usize>,
}

impl DocumentVisitor for PageCounter {
    fn on_page_start(&mut self, page_number: u32) {
        let index = page_number as usize;
        if self.nodes_per_page.len() <= index {
            self.nodes_per_page.resize(index + 1, 0);
        }
    }

    fn visit_heading(&mut self, _heading: &HeadingNode) -> VisitorAction {
        self.count();
        VisitorAction::Continue
    }

    fn visit_text_block(&mut self, _block: &TextBlockNode) -> VisitorAction {
        self.count();
        VisitorAction::Continue
    }

    fn visit_table(&mut self, _table: &TableNode) -> VisitorAction {
        self.count();
        VisitorAction::Continue
    }
}

impl PageCounter {
    fn count(&mut self) {
        match self.nodes_per_page.last_mut() {
            Some(n) => *n += 1,
            None => self.nodes_per_page.push(1),
        }
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Visitors are called in order. The first visitor that returns
/// a non-Continue action determines the result.
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn DocumentVisitor>>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: DocumentVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    fn first_action(
        &mut self,
        mut visit: impl FnMut(&mut (dyn DocumentVisitor + 'static)) -> VisitorAction,
    ) -> VisitorAction {
        for visitor in &mut self.visitors {
            let action = visit(visitor.as_mut());
            if action != VisitorAction::Continue {
                return action;
            }
        }
        VisitorAction::Continue
    }
}

impl Default for CompositeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentVisitor for CompositeVisitor {
    fn visit_heading(&mut self, heading: &HeadingNode) -> VisitorAction {
        self.first_action(|v| v.visit_heading(heading))
    }

    fn visit_text_block(&mut self, block: &TextBlockNode) -> VisitorAction {
        self.first_action(|v| v.visit_text_block(block))
    }

    fn visit_table(&mut self, table: &TableNode) -> VisitorAction {
        self.first_action(|v| v.visit_table(table))
    }

    fn visit_page_break(&mut self, page_break: &PageBreakNode) -> VisitorAction {
        self.first_action(|v| v.visit_page_break(page_break))
    }

    fn on_page_start(&mut self, page_number: u32) {
        for visitor in &mut self.visitors {
            visitor.on_page_start(page_number);
        }
    }
}
