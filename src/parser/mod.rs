//! Filing HTML parsing module.

mod builder;
pub mod dom;
mod heading;
mod html_parser;
mod merge;
mod options;
mod page_break;
mod style;
mod tag_context;
pub mod text;

pub use builder::{number_pages, NodeBuilder, MAX_COLSPAN};
pub use dom::{DomNode, ScraperNode};
pub use heading::{HeadingClassifier, HeadingContext};
pub use html_parser::{parse_dom, HtmlParser};
pub use merge::{merge_pair, merge_text_blocks};
pub use options::{HeadingConfig, PageBreakConfig, ParseOptions, DEFAULT_MAX_TABLE_DEPTH};
pub use page_break::{BreakMark, PageBreakDetector, PageBreakMarks};
pub use style::{declarations, StyleResolver};
pub use tag_context::{AnnotationFrame, TagContextTracker, ANNOTATION_PREFIX};
