//! Integration tests for the visitor pattern.

use sechtml::render::visitor::{
    apply_visitor, visit_node, CompositeVisitor, DefaultVisitor, DocumentVisitor,
    MaxHeadingDepthVisitor, PageCounter, SimpleTableVisitor, SkipPageBreaksVisitor,
    VisitorAction,
};
use sechtml::{Document, HeadingNode, Node, NodeKind, PageBreakNode, TableNode, TextBlockNode};

const FILING: &str = r#"<html><body><p style="font-weight:bold">PART I</p><p style="font-weight:bold">Competition</p><p>We compete with many firms.</p><hr class="page-break"><table><tr><td>Revenue</td><td>100</td></tr></table></body></html>"#;

fn filing() -> Document {
    sechtml::parse_html(FILING).expect("fixture has a body")
}

/// Custom visitor that tracks visit counts.
#[derive(Default)]
struct CountingVisitor {
    heading_count: usize,
    text_block_count: usize,
    table_count: usize,
    page_break_count: usize,
    pages_started: Vec<u32>,
}

impl DocumentVisitor for CountingVisitor {
    fn visit_heading(&mut self, _heading: &HeadingNode) -> VisitorAction {
        self.heading_count += 1;
        VisitorAction::Continue
    }

    fn visit_text_block(&mut self, _block: &TextBlockNode) -> VisitorAction {
        self.text_block_count += 1;
        VisitorAction::Continue
    }

    fn visit_table(&mut self, _table: &TableNode) -> VisitorAction {
        self.table_count += 1;
        VisitorAction::Continue
    }

    fn visit_page_break(&mut self, _page_break: &PageBreakNode) -> VisitorAction {
        self.page_break_count += 1;
        VisitorAction::Continue
    }

    fn on_page_start(&mut self, page_number: u32) {
        self.pages_started.push(page_number);
    }
}

/// Visitor that redacts annotated text blocks.
struct RedactAnnotated;

impl DocumentVisitor for RedactAnnotated {
    fn visit_text_block(&mut self, block: &TextBlockNode) -> VisitorAction {
        if block.annotations.is_empty() {
            VisitorAction::Continue
        } else {
            VisitorAction::Replace("[redacted]".to_string())
        }
    }
}

#[test]
fn test_counting_visitor() {
    let mut visitor = CountingVisitor::default();
    apply_visitor(&filing(), &mut visitor);

    assert_eq!(visitor.heading_count, 2);
    assert_eq!(visitor.text_block_count, 1);
    assert_eq!(visitor.table_count, 1);
    assert_eq!(visitor.page_break_count, 2);
    assert_eq!(visitor.pages_started, vec![0, 1]);
}

#[test]
fn test_default_visitor_is_identity() {
    let doc = filing();
    assert_eq!(apply_visitor(&doc, &mut DefaultVisitor::new()), doc);
}

#[test]
fn test_visit_node_dispatch() {
    let doc = filing();
    let mut visitor = SkipPageBreaksVisitor;

    for node in doc.nodes() {
        let action = visit_node(&mut visitor, node);
        assert_eq!(action.should_skip(), node.is_page_break());
    }
}

#[test]
fn test_skip_page_breaks_keeps_page_count() {
    let out = apply_visitor(&filing(), &mut SkipPageBreaksVisitor);

    assert_eq!(out.count(NodeKind::PageBreak), 0);
    assert_eq!(out.nodes().len(), 4);
    assert_eq!(out.page_count(), 2);
}

#[test]
fn test_max_heading_depth_visitor() {
    let out = apply_visitor(&filing(), &mut MaxHeadingDepthVisitor::new(2));

    let headings: Vec<&str> = out.headings().map(|h| h.text.as_str()).collect();
    assert_eq!(headings, vec!["PART I"]);
    assert!(out
        .nodes()
        .iter()
        .any(|n| matches!(n, Node::TextBlock(t) if t.text == "Competition")));
}

#[test]
fn test_simple_table_visitor() {
    let out = apply_visitor(&filing(), &mut SimpleTableVisitor);

    assert_eq!(out.count(NodeKind::Table), 0);
    assert_eq!(out.nodes().last().unwrap().plain_text(), "Revenue | 100");
}

#[test]
fn test_replacement_keeps_annotations() {
    let doc = sechtml::parse_html(
        r#"<html><body><ix:nonNumeric name="dei:DocumentType" contextRef="c0"><p>10-K</p></ix:nonNumeric></body></html>"#,
    )
    .unwrap();
    let out = apply_visitor(&doc, &mut RedactAnnotated);

    let block = out
        .nodes()
        .iter()
        .find(|n| n.kind() == NodeKind::TextBlock)
        .unwrap();
    assert_eq!(block.plain_text(), "[redacted]");
    assert_eq!(block.annotations()["annotation_name"], "dei:DocumentType");
}

#[test]
fn test_page_counter() {
    let mut counter = PageCounter::default();
    apply_visitor(&filing(), &mut counter);
    assert_eq!(counter.nodes_per_page, vec![3, 1]);
}

#[test]
fn test_composite_visitor_chaining() {
    let mut composite = CompositeVisitor::new()
        .with_visitor(SkipPageBreaksVisitor)
        .with_visitor(MaxHeadingDepthVisitor::new(1))
        .with_visitor(SimpleTableVisitor)
        .with_visitor(DefaultVisitor);

    let out = apply_visitor(&filing(), &mut composite);

    assert_eq!(out.count(NodeKind::PageBreak), 0);
    assert_eq!(out.count(NodeKind::Heading), 1);
    assert_eq!(out.count(NodeKind::Table), 0);
    assert_eq!(out.count(NodeKind::TextBlock), 3);
}

#[test]
fn test_visitor_action_methods() {
    let continue_action = VisitorAction::Continue;
    assert!(!continue_action.should_skip());
    assert!(!continue_action.is_replace());
    assert!(continue_action.replacement().is_none());

    let skip_action = VisitorAction::Skip;
    assert!(skip_action.should_skip());
    assert!(skip_action.replacement().is_none());

    let replace_action = VisitorAction::Replace("replaced".to_string());
    assert!(replace_action.is_replace());
    assert_eq!(replace_action.replacement(), Some("replaced"));
}
