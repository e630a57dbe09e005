//! Table structure processing and layout.
//!
//! Raw tables extracted by the node builder are irregular: spanned cells,
//! spacer columns, `$` signs in their own cells and headers that drift one
//! column left of their data. [`TableProcessor`] turns a raw [`TableNode`]
//! into a rectangular [`ProcessedTable`], and [`ColumnWidthOptimizer`] fits
//! one into a character budget.
//!
//! [`TableNode`]: crate::model::TableNode

mod processor;
pub mod values;
mod width;

pub use processor::{Alignment, ProcessedTable, TableConfig, TableProcessor};
pub use width::{ColumnWidthConfig, ColumnWidthOptimizer, SizedTable};
