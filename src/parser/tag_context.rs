//! Inline XBRL annotation context.
//!
//! Inline XBRL wraps facts in `ix:*` elements. While the walk is inside
//! one, every emitted node carries the fact's name, context reference and
//! formatting attributes. A fact may be split across the document with
//! `ix:continuation` elements; those resolve back to the frame that started
//! the chain.

use std::collections::HashMap;

use crate::model::Annotations;

use super::dom::DomNode;

/// Elements that open an annotation frame.
const ANNOTATION_TAGS: &[&str] = &["ix:nonfraction", "ix:nonnumeric", "ix:fraction", "ix:footnote"];

/// Element that continues a frame opened elsewhere.
const CONTINUATION_TAG: &str = "ix:continuation";

/// Attributes copied into a frame besides name, context and id.
const EXTRA_ATTRIBUTES: &[&str] = &["unitref", "format", "scale", "decimals", "sign"];

/// Whether `tag` is an inline annotation or continuation element.
pub fn is_annotation_tag(tag: &str) -> bool {
    tag == CONTINUATION_TAG || ANNOTATION_TAGS.contains(&tag)
}

/// Prefix of every annotation key.
pub const ANNOTATION_PREFIX: &str = "annotation_";

/// One inline annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationFrame {
    /// Tag name (`ix:nonfraction`, ...)
    pub tag: String,
    /// Concept name (`name` attribute)
    pub name: Option<String>,
    /// Context reference (`contextref` attribute)
    pub context_ref: Option<String>,
    /// Element id
    pub id: Option<String>,
    /// Formatting attributes (unitref, format, scale, decimals, sign)
    pub extras: Vec<(String, String)>,
}

impl AnnotationFrame {
    fn from_element<N: DomNode>(node: &N, tag: &str) -> Self {
        let owned = |name: &str| node.attr(name).map(str::to_string);
        Self {
            tag: tag.to_string(),
            name: owned("name"),
            context_ref: owned("contextref"),
            id: owned("id"),
            extras: EXTRA_ATTRIBUTES
                .iter()
                .filter_map(|&attr| node.attr(attr).map(|v| (attr.to_string(), v.to_string())))
                .collect(),
        }
    }

    /// The frame's fields as `annotation_*` entries.
    pub fn to_annotations(&self) -> Annotations {
        let mut map = Annotations::new();
        map.insert(format!("{ANNOTATION_PREFIX}tag"), self.tag.clone());
        let fields = [
            ("name", &self.name),
            ("contextref", &self.context_ref),
            ("id", &self.id),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(format!("{ANNOTATION_PREFIX}{key}"), value.clone());
            }
        }
        for (key, value) in &self.extras {
            map.insert(format!("{ANNOTATION_PREFIX}{key}"), value.clone());
        }
        map
    }
}

/// How an element affected the tracker, undone by [`TagContextTracker::exit`].
#[derive(Debug, Clone)]
enum Scope {
    /// Not an annotation element
    Neutral,
    /// Pushed a frame
    Frame,
    /// Continuation resolved to a frame (or to nothing if unknown)
    Continuation(Option<AnnotationFrame>),
}

/// Stack of inline annotation frames.
#[derive(Debug, Default)]
pub struct TagContextTracker {
    frames: Vec<AnnotationFrame>,
    scopes: Vec<Scope>,
    continuations: HashMap<String, AnnotationFrame>,
}

impl TagContextTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element. Every call must be paired with [`exit`](Self::exit).
    pub fn enter<N: DomNode>(&mut self, node: &N) {
        let scope = match node.tag_name() {
            Some(CONTINUATION_TAG) => {
                let frame = node
                    .attr("id")
                    .and_then(|id| self.continuations.get(id))
                    .cloned();
                match &frame {
                    Some(frame) => self.register_continuation(node, frame.clone()),
                    None => log::debug!(
                        "continuation {:?} has no originating annotation",
                        node.attr("id")
                    ),
                }
                Scope::Continuation(frame)
            }
            Some(tag) if ANNOTATION_TAGS.contains(&tag) => {
                let frame = AnnotationFrame::from_element(node, tag);
                self.register_continuation(node, frame.clone());
                self.frames.push(frame);
                Scope::Frame
            }
            _ => Scope::Neutral,
        };
        self.scopes.push(scope);
    }

    /// Leave the most recently entered element.
    pub fn exit(&mut self) {
        if let Some(Scope::Frame) = self.scopes.pop() {
            self.frames.pop();
        }
    }

    /// The frame in effect: the innermost continuation or pushed frame.
    pub fn current_frame(&self) -> Option<&AnnotationFrame> {
        let mut frames = self.frames.iter().rev();
        for scope in self.scopes.iter().rev() {
            match scope {
                Scope::Neutral | Scope::Continuation(None) => {}
                Scope::Continuation(Some(frame)) => return Some(frame),
                Scope::Frame => return frames.next(),
            }
        }
        None
    }

    /// Annotation map of the frame in effect; empty when none is active.
    pub fn current_context(&self) -> Annotations {
        self.current_frame()
            .map(AnnotationFrame::to_annotations)
            .unwrap_or_default()
    }

    fn register_continuation<N: DomNode>(&mut self, node: &N, frame: AnnotationFrame) {
        if let Some(next) = node.attr("continuedat") {
            self.continuations.insert(next.to_string(), frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::dom::ScraperNode;
    use scraper::Html;

    fn find<'a>(doc: &'a Html, tag: &str, nth: usize) -> ScraperNode<'a> {
        let body = ScraperNode::body(doc).unwrap();
        let mut found = Vec::new();
        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            if node.tag_name() == Some(tag) {
                found.push(node);
            }
            stack.extend(node.children().into_iter().rev());
        }
        found[nth]
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = TagContextTracker::new();
        assert!(tracker.current_context().is_empty());
    }

    #[test]
    fn test_enter_and_exit_frame() {
        let doc = Html::parse_document(
            r#"<body><ix:nonFraction name="us-gaap:Revenues" contextRef="FY2023" unitRef="usd" decimals="-6" scale="6">1,234</ix:nonFraction><p>x</p></body>"#,
        );
        let fact = find(&doc, "ix:nonfraction", 0);
        let p = find(&doc, "p", 0);

        let mut tracker = TagContextTracker::new();
        tracker.enter(&fact);
        let ctx = tracker.current_context();
        assert_eq!(ctx["annotation_name"], "us-gaap:Revenues");
        assert_eq!(ctx["annotation_contextref"], "FY2023");
        assert_eq!(ctx["annotation_unitref"], "usd");
        assert_eq!(ctx["annotation_scale"], "6");

        tracker.enter(&p);
        assert_eq!(tracker.current_context(), ctx);
        tracker.exit();
        tracker.exit();
        assert!(tracker.current_frame().is_none());
    }

    #[test]
    fn test_continuation_chain() {
        let doc = Html::parse_document(
            r#"<body>
            <ix:nonNumeric name="us-gaap:PolicyTextBlock" contextRef="c1" continuedAt="k1">Part one</ix:nonNumeric>
            <ix:continuation id="k1" continuedAt="k2">Part two</ix:continuation>
            <ix:continuation id="k2">Part three</ix:continuation>
            <ix:continuation id="orphan">Lost</ix:continuation>
            </body>"#,
        );
        let start = find(&doc, "ix:nonnumeric", 0);
        let second = find(&doc, "ix:continuation", 0);
        let third = find(&doc, "ix:continuation", 1);
        let orphan = find(&doc, "ix:continuation", 2);

        let mut tracker = TagContextTracker::new();
        tracker.enter(&start);
        tracker.exit();

        tracker.enter(&second);
        assert_eq!(
            tracker.current_context()["annotation_name"],
            "us-gaap:PolicyTextBlock"
        );
        tracker.exit();
        assert!(tracker.current_frame().is_none());

        tracker.enter(&third);
        assert_eq!(tracker.current_context()["annotation_contextref"], "c1");
        tracker.exit();

        tracker.enter(&orphan);
        assert!(tracker.current_context().is_empty());
        tracker.exit();
    }

    #[test]
    fn test_nested_frames_use_innermost() {
        let doc = Html::parse_document(
            r#"<body><ix:nonNumeric name="outer" contextRef="c1"><ix:nonFraction name="inner" contextRef="c2">5</ix:nonFraction></ix:nonNumeric></body>"#,
        );
        let outer = find(&doc, "ix:nonnumeric", 0);
        let inner = find(&doc, "ix:nonfraction", 0);

        let mut tracker = TagContextTracker::new();
        tracker.enter(&outer);
        tracker.enter(&inner);
        assert_eq!(tracker.current_context()["annotation_name"], "inner");
        tracker.exit();
        assert_eq!(tracker.current_context()["annotation_name"], "outer");
        tracker.exit();
    }
}
