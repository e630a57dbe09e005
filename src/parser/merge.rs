//! Merging of adjacent compatible text blocks.

use crate::model::{Length, Node, StyleRecord, TextBlockNode};

/// Merge every run of adjacent compatible text blocks.
///
/// Two blocks are compatible when neither is annotated and both resolve to
/// the same alignment. Merged text is separated by a blank line.
pub fn merge_text_blocks(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());

    for node in nodes {
        if let (Some(Node::TextBlock(prev)), Node::TextBlock(next)) = (out.last_mut(), &node) {
            if let Some(merged) = merge_pair(prev, next) {
                *prev = merged;
                continue;
            }
        }
        out.push(node);
    }

    out
}

/// Merge two blocks, or `None` if they are incompatible.
pub fn merge_pair(first: &TextBlockNode, second: &TextBlockNode) -> Option<TextBlockNode> {
    if !first.annotations.is_empty() || !second.annotations.is_empty() {
        return None;
    }
    if first.style.alignment() != second.style.alignment() {
        return None;
    }

    Some(TextBlockNode {
        text: format!("{}\n\n{}", first.text, second.text),
        style: merge_styles(&first.style, &second.style),
        annotations: Default::default(),
    })
}

fn merge_styles(first: &StyleRecord, second: &StyleRecord) -> StyleRecord {
    StyleRecord {
        display: first.display.clone().or_else(|| second.display.clone()),
        margin_top: first.margin_top,
        margin_bottom: second.margin_bottom,
        font_size: second.font_size.or(first.font_size),
        font_weight: second
            .font_weight
            .clone()
            .or_else(|| first.font_weight.clone()),
        text_align: first.text_align.clone().or_else(|| second.text_align.clone()),
        line_height: first.line_height.or(second.line_height),
        width: reconcile_width(first.width, second.width),
        text_decoration: first
            .text_decoration
            .clone()
            .or_else(|| second.text_decoration.clone()),
    }
}

/// Pick the width of a merged block.
///
/// The larger width wins. A width under 30% of the other is decorative and
/// is replaced by the other, which lands on the same choice. Widths in
/// units that cannot be compared keep the first block's width.
fn reconcile_width(first: Option<Length>, second: Option<Length>) -> Option<Length> {
    match (first, second) {
        (Some(a), Some(b)) if a.comparable(&b) => {
            if b.to_points() > a.to_points() {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some(a), Some(_)) => Some(a),
        (a, b) => a.or(b),
    }
}
