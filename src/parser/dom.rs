//! DOM capability trait and the scraper adapter.
//!
//! The structural passes only need to read tag names, attributes, children
//! and text. [`DomNode`] captures that so any tree library can feed the
//! parser; [`ScraperNode`] adapts the `scraper` crate.

use std::fmt::Debug;
use std::hash::Hash;

use ego_tree::{NodeId, NodeRef};
use scraper::Node as ScraperRaw;

/// Elements that start a new block of text.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "center",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Subtrees that never contribute content.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "head", "title", "noscript", "template", "ix:header",
];

/// Whether `tag` is a block-level element.
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Whether `tag` heads a subtree that is never rendered.
pub fn is_skipped_tag(tag: &str) -> bool {
    SKIPPED_TAGS.contains(&tag)
}

/// Read access to a node of a parsed HTML tree.
///
/// Handles are cheap to copy. Tag and attribute names are lowercase.
pub trait DomNode: Copy {
    /// Stable identity of a node within its tree.
    type Key: Copy + Eq + Hash + Debug;

    /// Identity of this node.
    fn key(&self) -> Self::Key;

    /// Tag name for elements, `None` for text and other nodes.
    fn tag_name(&self) -> Option<&str>;

    /// Attribute value by lowercase name.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Character data for text nodes.
    fn text(&self) -> Option<&str>;

    /// Child nodes in document order.
    fn children(&self) -> Vec<Self>;

    /// Whether this node is an element.
    fn is_element(&self) -> bool {
        self.tag_name().is_some()
    }

    /// Whether this element is block-level.
    fn is_block(&self) -> bool {
        self.tag_name().is_some_and(is_block_tag)
    }

    /// Whether this node is a text node with non-whitespace content.
    fn is_content_text(&self) -> bool {
        self.text().is_some_and(|t| !t.trim().is_empty())
    }

    /// Whether the `class` attribute contains `name` (ASCII case-insensitive).
    fn has_class(&self, name: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t.eq_ignore_ascii_case(name)))
    }

    /// Find the first descendant (not self) matching `pred`, depth first.
    fn find_descendant(&self, pred: impl Fn(&Self) -> bool) -> Option<Self> {
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if pred(&node) {
                return Some(node);
            }
            stack.extend(node.children().into_iter().rev());
        }
        None
    }

    /// First descendant element with the given tag.
    fn find_tag(&self, tag: &str) -> Option<Self> {
        self.find_descendant(|n| n.tag_name() == Some(tag))
    }
}

/// [`DomNode`] over a `scraper` tree.
#[derive(Debug, Clone, Copy)]
pub struct ScraperNode<'a>(pub NodeRef<'a, ScraperRaw>);

impl<'a> ScraperNode<'a> {
    /// Wrap a scraper node reference.
    pub fn new(node: NodeRef<'a, ScraperRaw>) -> Self {
        Self(node)
    }

    /// The `<body>` element of a parsed document, if any.
    pub fn body(html: &'a scraper::Html) -> Option<Self> {
        ScraperNode(html.tree.root()).find_tag("body")
    }

    /// The `<title>` text of a parsed document, if any.
    pub fn title(html: &'a scraper::Html) -> Option<String> {
        let title = ScraperNode(html.tree.root()).find_tag("title")?;
        let text: String = title
            .children()
            .iter()
            .filter_map(|c| c.text())
            .collect();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }
}

impl<'a> DomNode for ScraperNode<'a> {
    type Key = NodeId;

    fn key(&self) -> NodeId {
        self.0.id()
    }

    fn tag_name(&self) -> Option<&str> {
        match self.0.value() {
            ScraperRaw::Element(el) => Some(el.name()),
            _ => None,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match self.0.value() {
            ScraperRaw::Element(el) => el.attr(name),
            _ => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self.0.value() {
            ScraperRaw::Text(text) => Some(&**text),
            _ => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().map(ScraperNode).collect()
    }
}
