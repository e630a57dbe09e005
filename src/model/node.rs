//! Semantic node types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{StyleRecord, TableNode};
use crate::error::Error;

/// Open key/value annotation map attached to every node.
pub type Annotations = BTreeMap<String, String>;

/// A node of the inferred document structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// A section heading
    Heading(HeadingNode),
    /// A block of prose
    TextBlock(TextBlockNode),
    /// A table
    Table(TableNode),
    /// A page boundary
    PageBreak(PageBreakNode),
}

impl Node {
    /// Get the kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Heading(_) => NodeKind::Heading,
            Node::TextBlock(_) => NodeKind::TextBlock,
            Node::Table(_) => NodeKind::Table,
            Node::PageBreak(_) => NodeKind::PageBreak,
        }
    }

    /// Get the annotation map of this node.
    pub fn annotations(&self) -> &Annotations {
        match self {
            Node::Heading(h) => &h.annotations,
            Node::TextBlock(t) => &t.annotations,
            Node::Table(t) => &t.annotations,
            Node::PageBreak(p) => &p.annotations,
        }
    }

    /// Get a mutable reference to the annotation map.
    pub fn annotations_mut(&mut self) -> &mut Annotations {
        match self {
            Node::Heading(h) => &mut h.annotations,
            Node::TextBlock(t) => &mut t.annotations,
            Node::Table(t) => &mut t.annotations,
            Node::PageBreak(p) => &mut p.annotations,
        }
    }

    /// Get the plain text of this node. Page breaks have no text.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Heading(h) => h.text.clone(),
            Node::TextBlock(t) => t.text.clone(),
            Node::Table(t) => t.plain_text(),
            Node::PageBreak(_) => String::new(),
        }
    }

    /// Check if this node is a page break.
    pub fn is_page_break(&self) -> bool {
        matches!(self, Node::PageBreak(_))
    }
}

/// A heading inferred from style and text shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingNode {
    /// Heading text
    pub text: String,
    /// Resolved style of the heading element
    pub style: StyleRecord,
    /// Heading level (1-4)
    pub level: u8,
    /// Inline annotation context
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl HeadingNode {
    /// Create a heading. The level is clamped to 1-4.
    pub fn new(text: impl Into<String>, style: StyleRecord, level: u8) -> Self {
        Self {
            text: text.into(),
            style,
            level: level.clamp(1, 4),
            annotations: Annotations::new(),
        }
    }
}

/// A block of text, possibly spanning several source paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlockNode {
    /// Text content; may contain line breaks
    pub text: String,
    /// Resolved style
    pub style: StyleRecord,
    /// Inline annotation context
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl TextBlockNode {
    /// Create a text block.
    pub fn new(text: impl Into<String>, style: StyleRecord) -> Self {
        Self {
            text: text.into(),
            style,
            annotations: Annotations::new(),
        }
    }
}

/// Where a page break was inferred from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakSource {
    /// `page-break-before` / `page-break-after` style
    ExplicitStyle,
    /// Known page-break class name
    ClassName,
    /// Thin horizontal rule marker
    HorizontalRule,
    /// Block sized like a physical page
    PageDiv,
    /// Synthetic break opening the first page
    DocumentStart,
}

impl fmt::Display for BreakSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BreakSource::ExplicitStyle => "explicit_style",
            BreakSource::ClassName => "class_name",
            BreakSource::HorizontalRule => "horizontal_rule",
            BreakSource::PageDiv => "page_div",
            BreakSource::DocumentStart => "document_start",
        };
        f.write_str(name)
    }
}

/// A page boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBreakNode {
    /// Number of the page that starts here (0-based)
    pub page_number: u32,
    /// Signal the break was inferred from
    pub source: BreakSource,
    /// Inline annotation context
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl PageBreakNode {
    /// Create a page break.
    pub fn new(page_number: u32, source: BreakSource) -> Self {
        Self {
            page_number,
            source,
            annotations: Annotations::new(),
        }
    }
}

/// Discriminant of [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// [`Node::Heading`]
    Heading,
    /// [`Node::TextBlock`]
    TextBlock,
    /// [`Node::Table`]
    Table,
    /// [`Node::PageBreak`]
    PageBreak,
}

impl NodeKind {
    /// All node kinds in declaration order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Heading,
        NodeKind::TextBlock,
        NodeKind::Table,
        NodeKind::PageBreak,
    ];

    /// Canonical name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Heading => "heading",
            NodeKind::TextBlock => "text_block",
            NodeKind::Table => "table",
            NodeKind::PageBreak => "page_break",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "heading" => Ok(NodeKind::Heading),
            "text_block" | "textblock" => Ok(NodeKind::TextBlock),
            "table" => Ok(NodeKind::Table),
            "page_break" | "pagebreak" => Ok(NodeKind::PageBreak),
            _ => Err(Error::UnknownNodeKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_round_trip_names() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_node_kind_fails_loudly() {
        let err = "paragraph".parse::<NodeKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownNodeKind(ref k) if k == "paragraph"));
    }

    #[test]
    fn test_heading_level_clamped() {
        let h = HeadingNode::new("Title", StyleRecord::default(), 9);
        assert_eq!(h.level, 4);
        let h = HeadingNode::new("Title", StyleRecord::default(), 0);
        assert_eq!(h.level, 1);
    }

    #[test]
    fn test_node_serializes_with_type_tag() {
        let node = Node::PageBreak(PageBreakNode::new(0, BreakSource::DocumentStart));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"page_break\""));
        assert!(json.contains("\"source\":\"document_start\""));
    }

    #[test]
    fn test_annotations_accessor() {
        let mut node = Node::TextBlock(TextBlockNode::new("x", StyleRecord::default()));
        assert!(node.annotations().is_empty());
        node.annotations_mut()
            .insert("annotation_name".to_string(), "dei:EntityName".to_string());
        assert_eq!(node.annotations().len(), 1);
        assert_eq!(node.kind(), NodeKind::TextBlock);
    }
}
