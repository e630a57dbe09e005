//! Raw table types, as extracted from the markup.

use super::Annotations;
use serde::{Deserialize, Serialize};

/// A table as it appears in the source markup.
///
/// Rows are ragged and cells keep their colspans. Use
/// [`TableProcessor`](crate::table::TableProcessor) to obtain a rectangular
/// [`ProcessedTable`](crate::table::ProcessedTable).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Inline annotation context active where the table was found
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl TableNode {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows.
    pub fn with_rows(rows: Vec<TableRow>) -> Self {
        Self {
            rows,
            annotations: Annotations::new(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of virtual columns (widest row, colspans expanded).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(TableRow::span_width).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if any cell carries non-blank content.
    pub fn has_content(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| !c.is_empty())
    }

    /// Get plain text representation of the table.
    ///
    /// Rows are separated by newlines and cells by a single space, which is
    /// also how nested tables are flattened into their parent cell.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Sum of the colspans in this row.
    pub fn span_width(&self) -> usize {
        self.cells.iter().map(|c| c.colspan.max(1) as usize).sum()
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Content of a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellContent {
    /// Plain text (may contain line breaks)
    Text(String),
    /// A nested table
    Table(Box<TableNode>),
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Text(String::new())
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    pub content: CellContent,

    /// Number of columns this cell spans (at least 1)
    pub colspan: u16,

    /// Alignment hint from the markup (`align` attribute or `text-align`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(text.into()),
            colspan: 1,
            alignment: None,
        }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::text(String::new())
    }

    /// Create a cell holding a nested table.
    pub fn nested(table: TableNode) -> Self {
        Self {
            content: CellContent::Table(Box::new(table)),
            colspan: 1,
            alignment: None,
        }
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u16) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set alignment hint and return self.
    pub fn align(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = Some(alignment.into());
        self
    }

    /// Get plain text content, flattening nested tables.
    pub fn plain_text(&self) -> String {
        match &self.content {
            CellContent::Text(text) => text.clone(),
            CellContent::Table(table) => table.plain_text(),
        }
    }

    /// Check if the cell is blank.
    pub fn is_empty(&self) -> bool {
        match &self.content {
            CellContent::Text(text) => text.trim().is_empty(),
            CellContent::Table(table) => !table.has_content(),
        }
    }
}
