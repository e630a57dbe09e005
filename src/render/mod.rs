//! Rendering module for exporting and rewriting documents.

mod json;
pub mod visitor;

pub use json::{tables_to_json, to_json, JsonFormat};
pub use visitor::{
    apply_visitor, CompositeVisitor, DefaultVisitor, DocumentVisitor, MaxHeadingDepthVisitor,
    PageCounter, SimpleTableVisitor, SkipPageBreaksVisitor, VisitorAction,
};
