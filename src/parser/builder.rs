//! Tree-walking node builder.
//!
//! One depth-first walk over the body turns the raw element tree into the
//! flat [`Node`] sequence. The walk uses an explicit work stack, so
//! arbitrarily deep markup cannot exhaust the call stack. Every entered
//! element pushes a `Leave` step before its children, which keeps the
//! style stack and the tag-context tracker balanced.

use std::collections::{HashMap, HashSet};

use crate::model::{
    Annotations, BreakSource, CellContent, HeadingNode, Node, PageBreakNode, StyleRecord,
    TableCell, TableNode, TableRow, TextBlockNode,
};

use super::dom::{is_skipped_tag, DomNode};
use super::heading::{HeadingClassifier, HeadingContext};
use super::merge::merge_text_blocks;
use super::options::ParseOptions;
use super::page_break::{PageBreakDetector, PageBreakMarks};
use super::style::{declarations, StyleResolver};
use super::tag_context::{is_annotation_tag, TagContextTracker};
use super::text::{collect_text, collect_text_within};

/// Largest colspan honored; wider spans are clamped.
pub const MAX_COLSPAN: usize = 100;

/// Tags whose defaults make an inline child count as styled.
const STYLED_INLINE_TAGS: &[&str] = &["b", "strong", "u", "ins", "font", "big"];

/// Builds the node sequence of a document body.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    page_breaks: bool,
    merge_text_blocks: bool,
    max_table_depth: usize,
    resolver: StyleResolver,
    classifier: HeadingClassifier,
    detector: PageBreakDetector,
}

impl NodeBuilder {
    /// Create a builder from parse options.
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            page_breaks: options.page_breaks,
            merge_text_blocks: options.merge_text_blocks,
            max_table_depth: options.max_table_depth,
            resolver: StyleResolver::new(),
            classifier: HeadingClassifier::new(options.heading.clone()),
            detector: PageBreakDetector::new(options.page_break.clone()),
        }
    }

    /// Walk `body` and return its nodes in document order.
    pub fn build<N: DomNode>(&self, body: N) -> Vec<Node> {
        let marks = if self.page_breaks {
            self.detector.detect(body)
        } else {
            PageBreakMarks::empty()
        };

        let mut walk = Walk {
            builder: self,
            flags: descendant_flags(body),
            marks,
            styles: Vec::new(),
            tracker: TagContextTracker::new(),
            consumed: HashSet::new(),
            stack: vec![Step::Visit(body)],
            out: Vec::new(),
        };
        walk.run();

        let mut nodes = walk.out;
        if self.merge_text_blocks {
            nodes = merge_text_blocks(nodes);
        }
        if self.page_breaks {
            nodes = number_pages(nodes);
        }
        nodes
    }

    /// Extract the raw rows of a `<table>` element.
    ///
    /// Tables nested in cells become [`CellContent::Table`] up to the
    /// configured depth; deeper ones are flattened to text.
    pub fn extract_table<N: DomNode>(&self, table: N) -> TableNode {
        self.extract_table_at(table, 0)
    }

    fn extract_table_at<N: DomNode>(&self, table: N, depth: usize) -> TableNode {
        let rows = direct_rows(table)
            .into_iter()
            .map(|row| {
                let cells = direct_cells(row)
                    .into_iter()
                    .map(|cell| self.extract_cell(cell, depth))
                    .collect();
                TableRow::new(cells)
            })
            .collect();
        TableNode::with_rows(rows)
    }

    fn extract_cell<N: DomNode>(&self, cell: N, depth: usize) -> TableCell {
        let colspan = cell
            .attr("colspan")
            .and_then(extract_num)
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN) as u16;

        let alignment = cell
            .attr("align")
            .map(|a| a.trim().to_ascii_lowercase())
            .filter(|a| !a.is_empty())
            .or_else(|| {
                cell.attr("style")
                    .and_then(|s| self.resolver.parse(s).text_align)
            });

        let children = cell.children();
        let content = match cell.find_tag("table") {
            Some(inner) if depth + 1 < self.max_table_depth => {
                let inner_key = inner.key();
                let outside = collect_text(&children, |n| {
                    is_hidden(n) || n.key() == inner_key
                });
                if outside.is_empty() {
                    CellContent::Table(Box::new(self.extract_table_at(inner, depth + 1)))
                } else {
                    CellContent::Text(collect_text(&children, is_hidden))
                }
            }
            Some(_) => {
                log::warn!(
                    "nested table depth limit ({}) reached, flattening to text",
                    self.max_table_depth
                );
                CellContent::Text(collect_text(&children, is_hidden))
            }
            None => CellContent::Text(collect_text(&children, is_hidden)),
        };

        TableCell {
            content,
            colspan,
            alignment,
        }
    }

    fn declared_style<N: DomNode>(&self, node: &N) -> StyleRecord {
        match node.tag_name() {
            Some(tag) => self
                .resolver
                .resolve_element(tag, node.attr("style"), node.attr("align")),
            None => StyleRecord::new(),
        }
    }
}

/// Work item of the walk.
enum Step<N> {
    /// Enter an element
    Visit(N),
    /// Emit a run of inline siblings as text, splitting out inline headings
    Run(Vec<N>),
    /// Release the innermost element's style and tag context
    Leave { after: Option<BreakSource> },
}

/// Whether an element has block or table descendants.
#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    block: bool,
    table: bool,
}

/// Per-document walk state.
struct Walk<'b, N: DomNode> {
    builder: &'b NodeBuilder,
    flags: HashMap<N::Key, Flags>,
    marks: PageBreakMarks<N::Key>,
    styles: Vec<StyleRecord>,
    tracker: TagContextTracker,
    consumed: HashSet<N::Key>,
    stack: Vec<Step<N>>,
    out: Vec<Node>,
}

impl<'b, N: DomNode> Walk<'b, N> {
    fn run(&mut self) {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Visit(node) => self.visit(node),
                Step::Run(nodes) => self.emit_run(&nodes),
                Step::Leave { after } => {
                    self.styles.pop();
                    self.tracker.exit();
                    if let Some(source) = after {
                        self.push_break(source);
                    }
                }
            }
        }
    }

    fn visit(&mut self, node: N) {
        let Some(tag) = node.tag_name() else {
            if node.is_content_text() {
                self.emit_run(&[node]);
            }
            return;
        };
        if is_hidden(&node) {
            return;
        }

        let key = node.key();
        let mark = self.marks.get(key).unwrap_or_default();
        if let Some(source) = mark.before {
            self.push_break(source);
        }

        let style = self.builder.declared_style(&node).merge(self.styles.last());
        self.styles.push(style);
        self.tracker.enter(&node);
        self.stack.push(Step::Leave { after: mark.after });

        if tag == "table" {
            self.emit_table(node);
            return;
        }

        let flags = self.flags(&node);
        let marked_inside = self.marks.has_marked_descendant(key);

        if !marked_inside && !flags.block && self.try_heading(node) {
            return;
        }

        if !marked_inside && !flags.block && !flags.table {
            self.stack.push(Step::Run(node.children()));
        } else {
            self.partition(node);
        }
    }

    /// Queue children: inline runs are grouped, everything else is visited.
    fn partition(&mut self, node: N) {
        let mut steps = Vec::new();
        let mut run = Vec::new();

        for child in node.children() {
            if self.joins_run(&child) {
                run.push(child);
                continue;
            }
            if !run.is_empty() {
                steps.push(Step::Run(std::mem::take(&mut run)));
            }
            steps.push(Step::Visit(child));
        }
        if !run.is_empty() {
            steps.push(Step::Run(run));
        }

        self.stack.extend(steps.into_iter().rev());
    }

    fn joins_run(&self, child: &N) -> bool {
        let Some(tag) = child.tag_name() else {
            return true;
        };
        if is_hidden(child) {
            return true;
        }
        if child.is_block() || tag == "table" {
            return false;
        }
        let key = child.key();
        let flags = self.flags(child);
        let marked = self.marks.get(key).is_some_and(|m| m.is_marked())
            || self.marks.has_marked_descendant(key);
        !marked && !flags.block && !flags.table
    }

    /// Classify the element itself as a heading, emitting it on success.
    fn try_heading(&mut self, node: N) -> bool {
        let style = self.styles.last().cloned().unwrap_or_default();
        let context = HeadingContext {
            suppressed: self.consumed.contains(&node.key()),
        };
        let children = node.children();

        if let Some(parts) = self.split_heading_parts(&children) {
            let Some((text, combined)) = self.combine_parts(&parts, &style) else {
                return false;
            };
            let Some(level) = self.builder.classifier.classify(&combined, &text, context) else {
                return false;
            };
            log::debug!("merged {} styled spans into heading {text:?}", parts.len());
            self.consumed.extend(parts.iter().map(|p| p.key()));
            let annotations = self.annotations_for(&children);
            self.push_heading(text, combined, level, annotations);
            return true;
        }

        let text_style = self.text_style(node, style);
        let limit = self.builder.classifier.config().max_length;
        // Too long to be a heading; the children are walked instead.
        let Some(text) = collect_text_within(&children, limit, is_hidden) else {
            return false;
        };
        match self.builder.classifier.classify(&text_style, &text, context) {
            Some(level) => {
                let annotations = self.annotations_for(&children);
                self.push_heading(text, text_style, level, annotations);
                true
            }
            None => false,
        }
    }

    /// Children of a heading split across several styled spans.
    ///
    /// Applies when the container has no loose text and more than one of its
    /// inline children carries styling.
    fn split_heading_parts(&self, children: &[N]) -> Option<Vec<N>> {
        if children.iter().any(|c| c.is_content_text()) {
            return None;
        }
        let parts: Vec<N> = children
            .iter()
            .copied()
            .filter(|c| c.is_element() && !is_hidden(c) && c.tag_name() != Some("br"))
            .collect();
        let styled = parts
            .iter()
            .filter(|c| {
                c.attr("style").is_some_and(|s| !s.trim().is_empty())
                    || c.tag_name().is_some_and(|t| STYLED_INLINE_TAGS.contains(&t))
            })
            .count();
        (styled > 1).then_some(parts)
    }

    fn combine_parts(&self, parts: &[N], base: &StyleRecord) -> Option<(String, StyleRecord)> {
        let limit = self.builder.classifier.config().max_length;
        let mut texts = Vec::new();
        let mut combined = base.clone();

        for part in parts {
            let text = collect_text_within(&[*part], limit, is_hidden)?;
            if text.is_empty() {
                continue;
            }
            let style = self.text_style(*part, self.builder.declared_style(part).merge(Some(base)));
            if style.is_bold() {
                combined.font_weight = Some("bold".to_string());
            }
            let larger = match (style.font_size_pt(), combined.font_size_pt()) {
                (Some(part_pt), Some(current)) => part_pt > current,
                (Some(_), None) => true,
                _ => false,
            };
            if larger {
                combined.font_size = style.font_size;
            }
            texts.push(text);
        }

        Some((texts.join(" "), combined))
    }

    /// Follow single-child wrappers (`<p><b><font>..`) down to the text.
    fn text_style(&self, node: N, base: StyleRecord) -> StyleRecord {
        let mut style = base;
        let mut current = node;
        loop {
            let children = current.children();
            if children.iter().any(|c| c.is_content_text()) {
                break;
            }
            let mut elements = children.iter().filter(|c| c.is_element() && !is_hidden(*c));
            let (Some(only), None) = (elements.next(), elements.next()) else {
                break;
            };
            if only.tag_name() == Some("br") {
                break;
            }
            style = self.builder.declared_style(only).merge(Some(&style));
            current = *only;
        }
        style
    }

    /// Emit a run of inline siblings.
    ///
    /// Inline children on their own line that classify as headings are
    /// emitted as headings; the rest becomes text blocks.
    fn emit_run(&mut self, nodes: &[N]) {
        let style = self.styles.last().cloned().unwrap_or_default();
        let mut pending: Vec<N> = Vec::new();

        for (index, node) in nodes.iter().enumerate() {
            if node.is_element() && !is_hidden(node) && on_own_line(nodes, index) {
                if let Some((text, heading_style, level)) = self.inline_heading(*node, &style) {
                    self.flush_text(&mut pending, &style);
                    self.consumed.insert(node.key());
                    let annotations = self.annotations_for(&[*node]);
                    self.push_heading(text, heading_style, level, annotations);
                    continue;
                }
            }
            pending.push(*node);
        }

        self.flush_text(&mut pending, &style);
    }

    fn inline_heading(&self, node: N, base: &StyleRecord) -> Option<(String, StyleRecord, u8)> {
        let context = HeadingContext {
            suppressed: self.consumed.contains(&node.key()),
        };
        let style = self.text_style(node, self.builder.declared_style(&node).merge(Some(base)));
        let limit = self.builder.classifier.config().max_length;
        let text = collect_text_within(&[node], limit, is_hidden)?;
        let level = self.builder.classifier.classify(&style, &text, context)?;
        Some((text, style, level))
    }

    fn flush_text(&mut self, pending: &mut Vec<N>, style: &StyleRecord) {
        if pending.is_empty() {
            return;
        }
        let text = collect_text(pending, is_hidden);
        let annotations = self.annotations_for(pending);
        pending.clear();
        if text.is_empty() {
            return;
        }
        let mut block = TextBlockNode::new(text, style.clone());
        block.annotations = annotations;
        self.out.push(Node::TextBlock(block));
    }

    /// Annotation map for content made of `nodes`.
    ///
    /// Runs are emitted without entering their elements, so when the content
    /// is a single annotation element its frame is applied here.
    fn annotations_for(&mut self, nodes: &[N]) -> Annotations {
        match sole_annotation(nodes) {
            Some(element) => {
                self.tracker.enter(&element);
                let annotations = self.tracker.current_context();
                self.tracker.exit();
                annotations
            }
            None => self.tracker.current_context(),
        }
    }

    fn emit_table(&mut self, node: N) {
        let mut table = self.builder.extract_table(node);
        if !table.has_content() {
            log::debug!("skipping table without content");
            return;
        }
        table.annotations = self.tracker.current_context();
        self.out.push(Node::Table(table));
    }

    fn push_heading(&mut self, text: String, style: StyleRecord, level: u8, annotations: Annotations) {
        let mut heading = HeadingNode::new(text, style, level);
        heading.annotations = annotations;
        self.out.push(Node::Heading(heading));
    }

    fn push_break(&mut self, source: BreakSource) {
        // Numbers are assigned once the final order is known.
        self.out.push(Node::PageBreak(PageBreakNode::new(0, source)));
    }

    fn flags(&self, node: &N) -> Flags {
        self.flags.get(&node.key()).copied().unwrap_or_default()
    }
}

/// Whether an element is never rendered: skipped tags and `display: none`.
fn is_hidden<N: DomNode>(node: &N) -> bool {
    let Some(tag) = node.tag_name() else {
        return false;
    };
    if is_skipped_tag(tag) {
        return true;
    }
    node.attr("style").is_some_and(|style| {
        declarations(style).any(|(key, value)| key == "display" && value == "none")
    })
}

/// Whether the sibling at `index` is bounded by run edges or `<br>`.
fn on_own_line<N: DomNode>(nodes: &[N], index: usize) -> bool {
    let is_boundary = |node: Option<&N>| match node {
        None => true,
        Some(n) => n.tag_name() == Some("br"),
    };
    let is_content = |n: &&N| n.is_content_text() || (n.is_element() && !is_hidden(*n));

    let before = nodes[..index].iter().rev().find(is_content);
    let after = nodes[index + 1..].iter().find(is_content);
    is_boundary(before) && is_boundary(after)
}

/// The one annotation element that makes up `nodes`, looking through
/// single-child wrappers such as `<span><ix:nonNumeric ..>`.
fn sole_annotation<N: DomNode>(nodes: &[N]) -> Option<N> {
    let mut current = nodes.to_vec();
    loop {
        let mut content = current.iter().filter(|n| {
            n.is_content_text() || (n.is_element() && !is_hidden(*n) && n.tag_name() != Some("br"))
        });
        let (Some(&only), None) = (content.next(), content.next()) else {
            return None;
        };
        if is_annotation_tag(only.tag_name()?) {
            return Some(only);
        }
        current = only.children();
    }
}

/// Descendant flags of every element under `root`, in one pass.
fn descendant_flags<N: DomNode>(root: N) -> HashMap<N::Key, Flags> {
    let mut order: Vec<(N, Option<usize>)> = Vec::new();
    let mut stack = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        if !node.is_element() {
            continue;
        }
        let index = order.len();
        order.push((node, parent));
        stack.extend(node.children().into_iter().map(|c| (c, Some(index))));
    }

    // Children always come after their parent in `order`.
    let mut flags = vec![Flags::default(); order.len()];
    for index in (0..order.len()).rev() {
        let (node, parent) = order[index];
        if let Some(parent) = parent {
            let own = flags[index];
            flags[parent].block |= own.block || node.is_block();
            flags[parent].table |= own.table || node.tag_name() == Some("table");
        }
    }

    order
        .into_iter()
        .zip(flags)
        .map(|((node, _), f)| (node.key(), f))
        .collect()
}

/// Direct rows of a table, looking through `thead`/`tbody`/`tfoot`.
fn direct_rows<N: DomNode>(table: N) -> Vec<N> {
    let mut rows = Vec::new();
    for child in table.children() {
        match child.tag_name() {
            Some("tr") => rows.push(child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                child
                    .children()
                    .into_iter()
                    .filter(|c| c.tag_name() == Some("tr")),
            ),
            _ => {}
        }
    }
    rows
}

/// Direct `td`/`th` cells of a row.
fn direct_cells<N: DomNode>(row: N) -> Vec<N> {
    row.children()
        .into_iter()
        .filter(|c| matches!(c.tag_name(), Some("td" | "th")) && !is_hidden(c))
        .collect()
}

/// Leading integer of an attribute value (`"3"`, `"3px"`).
fn extract_num(value: &str) -> Option<usize> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Collapse, frame and number page breaks.
///
/// Consecutive breaks collapse into the first, trailing breaks are dropped,
/// a `document_start` break opens the first page when content comes first,
/// and breaks are numbered from 0 in order.
pub fn number_pages(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len() + 1);
    for node in nodes {
        if node.is_page_break() && out.last().is_some_and(Node::is_page_break) {
            continue;
        }
        out.push(node);
    }
    while out.last().is_some_and(Node::is_page_break) {
        out.pop();
    }
    if out.first().is_some_and(|n| !n.is_page_break()) {
        out.insert(
            0,
            Node::PageBreak(PageBreakNode::new(0, BreakSource::DocumentStart)),
        );
    }

    let mut page = 0;
    for node in &mut out {
        if let Node::PageBreak(pb) = node {
            pb.page_number = page;
            page += 1;
        }
    }
    log::debug!("numbered {page} pages");
    out
}
