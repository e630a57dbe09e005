//! Document model types for filing structure.
//!
//! This module defines the node tree the parser produces from filing HTML:
//! headings, text blocks, tables and page breaks, each carrying the
//! resolved style and inline annotation context it was found in.

mod document;
mod node;
mod style;
mod table;

pub use document::{Document, Metadata, Outline, OutlineItem};
pub use node::{
    Annotations, BreakSource, HeadingNode, Node, NodeKind, PageBreakNode, TextBlockNode,
};
pub use style::{Length, StyleRecord, Unit, BASE_FONT_SIZE_PT};
pub use table::{CellContent, TableCell, TableNode, TableRow};
