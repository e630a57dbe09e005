//! Column width allocation and text wrapping for processed tables.

use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::processor::ProcessedTable;

/// Column width optimizer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidthConfig {
    /// Total width budget in display columns
    pub budget: usize,
    /// Minimum width of a data column
    pub min_data_width: usize,
    /// Share of the budget the label column may take at its natural width
    pub label_target_ratio: f64,
    /// Hard cap on the label column's share of the budget
    pub label_max_ratio: f64,
}

impl Default for ColumnWidthConfig {
    fn default() -> Self {
        Self {
            budget: 100,
            min_data_width: 15,
            label_target_ratio: 0.4,
            label_max_ratio: 0.5,
        }
    }
}

impl ColumnWidthConfig {
    /// Set the total width budget.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }
}

/// A processed table fitted to a width budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedTable {
    /// Table with wrapped label and header text
    pub table: ProcessedTable,
    /// Width of each column
    pub widths: Vec<usize>,
}

impl SizedTable {
    /// Sum of the column widths.
    pub fn total_width(&self) -> usize {
        self.widths.iter().sum()
    }
}

/// Fits processed tables into a character budget.
#[derive(Debug, Clone, Default)]
pub struct ColumnWidthOptimizer {
    config: ColumnWidthConfig,
}

impl ColumnWidthOptimizer {
    /// Create an optimizer with the given configuration.
    pub fn new(config: ColumnWidthConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ColumnWidthConfig {
        &self.config
    }

    /// Compute column widths and wrap the table to them.
    ///
    /// The label column and header cells are word-wrapped; data cells are
    /// left as they are. The input table is not modified.
    pub fn optimize(&self, table: &ProcessedTable) -> SizedTable {
        let widths = self.compute_widths(table);
        let mut sized = table.clone();

        if let Some(&label_width) = widths.first() {
            for row in &mut sized.data_rows {
                if let Some(cell) = row.first_mut() {
                    *cell = wrap_text(cell, label_width);
                }
            }
        }
        if let Some(header) = &mut sized.header {
            for (cell, &width) in header.iter_mut().zip(&widths) {
                *cell = wrap_text(cell, width);
            }
        }

        SizedTable {
            table: sized,
            widths,
        }
    }

    /// Compute one width per column.
    pub fn compute_widths(&self, table: &ProcessedTable) -> Vec<usize> {
        let columns = table
            .all_rows()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(table.column_count());
        if columns == 0 {
            return Vec::new();
        }

        let natural: Vec<usize> = (0..columns)
            .map(|j| {
                table
                    .all_rows()
                    .filter_map(|row| row.get(j))
                    .map(|cell| cell_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let budget = self.config.budget;
        let min_data = self.config.min_data_width;
        let mut widths: Vec<usize> = natural
            .iter()
            .enumerate()
            .map(|(j, &w)| if j == 0 { w } else { w.max(min_data) })
            .collect();

        let target = ratio_of(budget, self.config.label_target_ratio);
        let max = ratio_of(budget, self.config.label_max_ratio).max(target);
        if natural[0] > target {
            let data_total: usize = widths[1..].iter().sum();
            let remaining = budget.saturating_sub(data_total);
            widths[0] = remaining.clamp(target, max).min(natural[0]);
        }

        let total: usize = widths.iter().sum();
        if total > budget && columns > 1 {
            let share = (total - budget).div_ceil(columns - 1);
            for width in &mut widths[1..] {
                *width = width.saturating_sub(share).max(min_data);
            }
            log::debug!("shrank {} data columns by {share}", columns - 1);
        }

        widths
    }
}

fn ratio_of(budget: usize, ratio: f64) -> usize {
    (budget as f64 * ratio).floor() as usize
}

/// Display width of the widest line in a cell.
fn cell_width(text: &str) -> usize {
    text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0)
}

/// Word-wrap text to a display width.
///
/// Text that already contains line breaks is returned verbatim. Words wider
/// than the column are broken with a trailing hyphen.
pub fn wrap_text(text: &str, width: usize) -> String {
    if text.contains('\n') || text.width() <= width {
        return text.to_string();
    }
    let width = width.max(2);

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let mut pieces = hyphen_break(word, width);
            let tail = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            line_width = tail.width();
            line = tail;
            continue;
        }

        if !line.is_empty() && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += word_width;
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// Split a word into hyphen-terminated pieces no wider than `width`.
fn hyphen_break(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = word;

    while rest.width() > width {
        let mut taken = 0;
        let mut split = 0;
        for (idx, ch) in rest.char_indices() {
            let w = ch.width().unwrap_or(0);
            if taken + w > width - 1 {
                break;
            }
            taken += w;
            split = idx + ch.len_utf8();
        }
        if split == 0 {
            split = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        pieces.push(format!("{}-", &rest[..split]));
        rest = &rest[split..];
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }

    pieces
}
