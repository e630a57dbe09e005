//! Page boundary detection.
//!
//! Filing HTML is usually a print layout flattened into one document. Page
//! boundaries survive as one of four signals:
//!
//! - an explicit `page-break-before` / `page-break-after` style
//! - a known page-break class name
//! - a thin `<hr>` used as a page marker
//! - a block sized and positioned like a physical page
//!
//! [`PageBreakDetector::detect`] runs once over the body before the node
//! builder walks it. Marks are additive; the marked elements are still
//! walked normally.

use std::collections::{HashMap, HashSet};

use crate::model::BreakSource;

use super::dom::DomNode;
use super::options::PageBreakConfig;
use super::style::{declarations, StyleResolver};

/// Where a break applies relative to the marked element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakMark {
    /// Break emitted before the element's content
    pub before: Option<BreakSource>,
    /// Break emitted after the element's content
    pub after: Option<BreakSource>,
}

impl BreakMark {
    /// Whether either side is marked.
    pub fn is_marked(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }
}

/// Result of the detection pre-pass.
#[derive(Debug, Clone)]
pub struct PageBreakMarks<K> {
    marks: HashMap<K, BreakMark>,
    ancestors: HashSet<K>,
}

impl<K: Copy + Eq + std::hash::Hash> PageBreakMarks<K> {
    /// No marks at all.
    pub fn empty() -> Self {
        Self {
            marks: HashMap::new(),
            ancestors: HashSet::new(),
        }
    }

    /// Mark for an element, if any.
    pub fn get(&self, key: K) -> Option<BreakMark> {
        self.marks.get(&key).copied()
    }

    /// Whether some descendant of the element is marked.
    pub fn has_marked_descendant(&self, key: K) -> bool {
        self.ancestors.contains(&key)
    }

    /// Number of marked elements.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Detects page-break elements.
#[derive(Debug, Clone)]
pub struct PageBreakDetector {
    config: PageBreakConfig,
    resolver: StyleResolver,
}

impl PageBreakDetector {
    /// Create a detector.
    pub fn new(config: PageBreakConfig) -> Self {
        Self {
            config,
            resolver: StyleResolver::new(),
        }
    }

    /// Mark every page-break element under `root`.
    pub fn detect<N: DomNode>(&self, root: N) -> PageBreakMarks<N::Key> {
        let mut result = PageBreakMarks::empty();
        // Path of element keys from the root down to the current node.
        let mut path: Vec<N::Key> = Vec::new();
        let mut stack: Vec<(N, usize)> = vec![(root, 0)];

        while let Some((node, depth)) = stack.pop() {
            if !node.is_element() {
                continue;
            }
            path.truncate(depth);

            let mark = self.classify(&node);
            if mark.is_marked() {
                result.ancestors.extend(path.iter().copied());
                result.marks.insert(node.key(), mark);
            }

            path.push(node.key());
            stack.extend(node.children().into_iter().rev().map(|c| (c, depth + 1)));
        }

        if !result.is_empty() {
            log::debug!("detected {} page-break elements", result.len());
        }
        result
    }

    /// Classify a single element.
    pub fn classify<N: DomNode>(&self, node: &N) -> BreakMark {
        let Some(tag) = node.tag_name() else {
            return BreakMark::default();
        };
        let style = node.attr("style").unwrap_or_default();

        if matches!(tag, "p" | "br" | "hr") || node.is_block() {
            let mark = explicit_style_mark(style);
            if mark.is_marked() {
                return mark;
            }
        }

        let before = if self
            .config
            .class_names
            .iter()
            .any(|name| node.has_class(name))
        {
            Some(BreakSource::ClassName)
        } else if tag == "hr" && self.is_rule_marker(style) {
            Some(BreakSource::HorizontalRule)
        } else if tag != "hr" && node.is_block() && self.is_page_div(style) {
            Some(BreakSource::PageDiv)
        } else {
            None
        };

        BreakMark {
            before,
            after: None,
        }
    }

    fn is_rule_marker(&self, style: &str) -> bool {
        declarations(style)
            .find(|(key, _)| key == "height")
            .and_then(|(_, value)| self.resolver.parse_length(&value))
            .is_some_and(|h| {
                let px = h.to_points() / 0.75;
                (px - self.config.rule_height_px).abs() <= self.config.rule_tolerance_px
            })
    }

    fn is_page_div(&self, style: &str) -> bool {
        let mut height = None;
        let mut width = None;
        let mut positioned = false;

        for (key, value) in declarations(style) {
            match key.as_str() {
                "height" => height = self.resolver.parse_length(&value),
                "width" => width = self.resolver.parse_length(&value),
                "position" => positioned |= value == "relative" || value == "absolute",
                "overflow" => positioned |= value == "hidden",
                _ => {}
            }
        }

        let near = |value: f64, known: &[f64]| {
            known
                .iter()
                .any(|k| (value - k).abs() <= self.config.page_tolerance_pt)
        };
        let page_height = height
            .filter(|h| h.unit.is_absolute())
            .is_some_and(|h| near(h.to_points(), &self.config.page_heights_pt));
        let page_width = width
            .filter(|w| w.unit.is_absolute())
            .is_some_and(|w| near(w.to_points(), &self.config.page_widths_pt));

        page_height && page_width && positioned
    }
}

impl Default for PageBreakDetector {
    fn default() -> Self {
        Self::new(PageBreakConfig::default())
    }
}

/// Break sides requested by `page-break-*` / `break-*` declarations.
fn explicit_style_mark(style: &str) -> BreakMark {
    let mut mark = BreakMark::default();
    for (key, value) in declarations(style) {
        let forced = match key.as_str() {
            "page-break-before" | "page-break-after" => value == "always",
            "break-before" | "break-after" => value == "page",
            _ => false,
        };
        if !forced {
            continue;
        }
        if key.ends_with("before") {
            mark.before = Some(BreakSource::ExplicitStyle);
        } else {
            mark.after = Some(BreakSource::ExplicitStyle);
        }
    }
    mark
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::dom::ScraperNode;
    use scraper::Html;

    fn first<'a>(doc: &'a Html, tag: &str) -> ScraperNode<'a> {
        ScraperNode::body(doc).unwrap().find_tag(tag).unwrap()
    }

    #[test]
    fn test_explicit_style() {
        let doc = Html::parse_document(
            r#"<body><p style="PAGE-BREAK-AFTER: Always">a</p><div style="break-before: page">b</div></body>"#,
        );
        let detector = PageBreakDetector::default();

        let mark = detector.classify(&first(&doc, "p"));
        assert_eq!(mark.after, Some(BreakSource::ExplicitStyle));
        assert_eq!(mark.before, None);

        let mark = detector.classify(&first(&doc, "div"));
        assert_eq!(mark.before, Some(BreakSource::ExplicitStyle));
    }

    #[test]
    fn test_explicit_style_ignored_on_inline() {
        let doc = Html::parse_document(
            r#"<body><span style="page-break-before:always">a</span></body>"#,
        );
        let mark = PageBreakDetector::default().classify(&first(&doc, "span"));
        assert!(!mark.is_marked());
    }

    #[test]
    fn test_class_names() {
        let doc = Html::parse_document(r#"<body><div class="x PageBreak"></div></body>"#);
        let mark = PageBreakDetector::default().classify(&first(&doc, "div"));
        assert_eq!(mark.before, Some(BreakSource::ClassName));
    }

    #[test]
    fn test_rule_marker() {
        let doc = Html::parse_document(
            r#"<body><hr style="height:3px;color:#999"><hr style="height:1px"></body>"#,
        );
        let body = ScraperNode::body(&doc).unwrap();
        let rules: Vec<_> = body.children();
        let detector = PageBreakDetector::default();

        assert_eq!(
            detector.classify(&rules[0]).before,
            Some(BreakSource::HorizontalRule)
        );
        assert!(!detector.classify(&rules[1]).is_marked());
    }

    #[test]
    fn test_page_div() {
        let doc = Html::parse_document(
            r#"<body><div style="position:relative; width:612pt; height:792pt">page</div></body>"#,
        );
        let mark = PageBreakDetector::default().classify(&first(&doc, "div"));
        assert_eq!(mark.before, Some(BreakSource::PageDiv));

        let doc = Html::parse_document(
            r#"<body><div style="width:612pt; height:792pt">page</div></body>"#,
        );
        let mark = PageBreakDetector::default().classify(&first(&doc, "div"));
        assert!(!mark.is_marked());
    }

    #[test]
    fn test_marked_descendants() {
        let doc = Html::parse_document(
            r#"<body><div id="outer"><section><hr class="page-break"></section></div><p>x</p></body>"#,
        );
        let body = ScraperNode::body(&doc).unwrap();
        let marks = PageBreakDetector::default().detect(body);

        let outer = first(&doc, "div");
        let p = first(&doc, "p");
        assert_eq!(marks.len(), 1);
        assert!(marks.has_marked_descendant(body.key()));
        assert!(marks.has_marked_descendant(outer.key()));
        assert!(!marks.has_marked_descendant(p.key()));
    }
}
