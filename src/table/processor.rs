//! Raw table to rectangular table conversion.

use serde::{Deserialize, Serialize};

use crate::model::TableNode;

use super::values::{
    is_data_value, is_financial_value, is_lone_dollar, normalize_negative, PeriodPatterns,
};

/// Table processor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Rows scanned for a reporting-period header
    pub header_scan_rows: usize,
    /// Data rows sampled when checking header alignment
    pub repair_sample_rows: usize,
    /// Upper bound on virtual columns per table
    pub max_columns: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 3,
            repair_sample_rows: 3,
            max_columns: 100,
        }
    }
}

/// Horizontal alignment of a processed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
}

impl Alignment {
    /// Alignment name as used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
        }
    }
}

/// A rectangular table with an optional merged header.
///
/// Every data row has exactly [`column_count`](Self::column_count) cells,
/// as does the header when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTable {
    /// Merged header row; multi-row headers are joined with `\n` per column
    pub header: Option<Vec<String>>,
    /// Data rows
    pub data_rows: Vec<Vec<String>>,
    /// One alignment per column
    pub alignments: Vec<Alignment>,
}

impl ProcessedTable {
    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.alignments.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.data_rows.len()
    }

    /// Check if the table has a header row.
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Header row followed by the data rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.header.iter().chain(self.data_rows.iter())
    }
}

/// Converts raw tables into [`ProcessedTable`]s.
///
/// The processor holds no per-table state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct TableProcessor {
    config: TableConfig,
    patterns: PeriodPatterns,
}

impl TableProcessor {
    /// Create a processor with the given configuration.
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            patterns: PeriodPatterns::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Process a raw table.
    ///
    /// Returns `None` when nothing but blank cells remain.
    pub fn process(&self, table: &TableNode) -> Option<ProcessedTable> {
        let grid = prune_empty_columns(self.virtualize(table))?;

        let rows: Vec<Vec<String>> = grid
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .collect();
        if rows.is_empty() {
            return None;
        }
        let width = rows[0].len();

        let header_len = self.split_header(&rows);
        let mut data_rows = rows;
        let mut header_rows: Vec<Vec<String>> = data_rows.drain(..header_len).collect();

        if let Some(last) = header_rows.last_mut() {
            self.repair_misalignment(last, &data_rows);
        }
        let header = merge_header_rows(&header_rows);
        let alignments = infer_alignments(&data_rows, width);

        for row in &mut data_rows {
            for cell in row.iter_mut().skip(1) {
                *cell = normalize_negative(cell);
            }
        }

        Some(ProcessedTable {
            header,
            data_rows,
            alignments,
        })
    }

    /// Expand colspans into a grid of equal-length rows.
    ///
    /// A spanned cell's text lands in the last slot it covers.
    fn virtualize(&self, table: &TableNode) -> Vec<Vec<String>> {
        let width = table.column_count().min(self.config.max_columns);

        table
            .rows
            .iter()
            .map(|row| {
                let mut slots = Vec::with_capacity(width);
                for cell in &row.cells {
                    let span = usize::from(cell.colspan.max(1));
                    slots.extend(std::iter::repeat(String::new()).take(span - 1));
                    slots.push(cell.plain_text().trim().to_string());
                }
                slots.resize(width, String::new());
                slots
            })
            .collect()
    }

    /// Number of leading rows that form the header.
    fn split_header(&self, rows: &[Vec<String>]) -> usize {
        for (i, row) in rows.iter().enumerate().take(self.config.header_scan_rows) {
            let has_data = row.iter().any(|c| is_data_value(c) || is_lone_dollar(c));
            if !has_data && self.patterns.is_period_header(row) {
                let extended = rows
                    .get(i + 1)
                    .is_some_and(|next| next.iter().any(|c| self.patterns.is_bare_period(c)));
                let len = if extended { i + 2 } else { i + 1 };
                log::debug!("table header: period row {i}, {len} header rows");
                return len;
            }
        }

        for (k, row) in rows.iter().enumerate().skip(1) {
            let mut filled = row.iter().filter(|c| !c.is_empty()).peekable();
            if filled.peek().is_some() && filled.all(|c| is_lone_dollar(c)) {
                log::debug!("table header: dollar row {k}");
                return k;
            }
        }

        for (i, pair) in rows.windows(2).enumerate() {
            let (label, values) = (&pair[0], &pair[1]);
            if !label.iter().any(|c| is_data_value(c))
                && values.iter().any(|c| is_data_value(c))
                && values.iter().any(|c| is_lone_dollar(c))
            {
                log::debug!("table header: label row {i} above first priced row");
                return i + 1;
            }
        }

        log::debug!("table header: none");
        0
    }

    /// Shift a header row one column right when its date columns sit one
    /// column left of the numbers they label.
    ///
    /// Applies only when every date column has numeric data in the next
    /// column, the first date column has none of its own, and the header's
    /// last cell is blank. Column 0 is the label column and never counts as
    /// a date column.
    fn repair_misalignment(&self, header: &mut Vec<String>, data: &[Vec<String>]) -> bool {
        let date_columns: Vec<usize> = header
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| self.patterns.has_date_token(c))
            .map(|(j, _)| j)
            .collect();
        let Some(&first) = date_columns.first() else {
            return false;
        };
        if !header.last().is_some_and(|c| c.is_empty()) {
            return false;
        }

        let sample = &data[..data.len().min(self.config.repair_sample_rows)];
        let numeric = |j: usize| {
            sample
                .iter()
                .any(|row| row.get(j).is_some_and(|c| is_data_value(c)))
        };
        if numeric(first) || !date_columns.iter().all(|&c| numeric(c + 1)) {
            return false;
        }

        header.pop();
        header.insert(0, String::new());
        log::debug!("shifted header right over {} date columns", date_columns.len());
        true
    }
}

impl Default for TableProcessor {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

/// Drop empty columns.
///
/// Leading and trailing empty columns go; inside the table a single empty
/// column is removed and a run of two or more shrinks to one. Returns `None`
/// when every column is empty.
fn prune_empty_columns(grid: Vec<Vec<String>>) -> Option<Vec<Vec<String>>> {
    let width = grid.first().map_or(0, Vec::len);
    let empty: Vec<bool> = (0..width)
        .map(|j| grid.iter().all(|row| row[j].is_empty()))
        .collect();

    let first = empty.iter().position(|e| !e)?;
    let last = empty.iter().rposition(|e| !e)?;

    let mut keep = vec![false; width];
    let mut j = first;
    while j <= last {
        if !empty[j] {
            keep[j] = true;
            j += 1;
            continue;
        }
        let run_end = (j..=last).find(|&k| !empty[k]).unwrap_or(last + 1);
        if run_end - j >= 2 {
            keep[j] = true;
        }
        j = run_end;
    }

    Some(
        grid.into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, &k)| k.then_some(cell))
                    .collect()
            })
            .collect(),
    )
}

/// Merge header rows column by column, skipping blanks and bare `$`.
fn merge_header_rows(rows: &[Vec<String>]) -> Option<Vec<String>> {
    let width = rows.first()?.len();
    let merged: Vec<String> = (0..width)
        .map(|j| {
            rows.iter()
                .filter_map(|row| row.get(j))
                .filter(|c| !c.is_empty() && !is_lone_dollar(c))
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    if merged.iter().all(String::is_empty) {
        None
    } else {
        Some(merged)
    }
}

fn infer_alignments(data: &[Vec<String>], width: usize) -> Vec<Alignment> {
    (0..width)
        .map(|j| {
            if j > 0 && data.iter().any(|row| is_financial_cell(row, j)) {
                Alignment::Right
            } else {
                Alignment::Left
            }
        })
        .collect()
}

/// A cell is financial when it parses as a value or when the nearest
/// non-blank cell to its left is a lone `$`.
fn is_financial_cell(row: &[String], j: usize) -> bool {
    let cell = row[j].as_str();
    if cell.is_empty() || is_lone_dollar(cell) {
        return false;
    }
    if is_financial_value(cell) {
        return true;
    }
    row[..j]
        .iter()
        .rev()
        .find(|c| !c.is_empty())
        .is_some_and(|c| is_lone_dollar(c))
}
