//! Parsing options and configuration.

use crate::table::TableConfig;

/// Default nesting depth for tables inside table cells.
pub const DEFAULT_MAX_TABLE_DEPTH: usize = 32;

/// Options for parsing filing documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Whether to detect and emit page breaks
    pub page_breaks: bool,

    /// Whether to merge adjacent compatible text blocks
    pub merge_text_blocks: bool,

    /// Whether to use parallel processing for per-table work
    pub parallel: bool,

    /// Tables nested deeper than this are flattened to text
    pub max_table_depth: usize,

    /// Heading classifier thresholds
    pub heading: HeadingConfig,

    /// Page-break detector thresholds
    pub page_break: PageBreakConfig,

    /// Table structural processor settings
    pub table: TableConfig,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable page-break detection and emission.
    pub fn with_page_breaks(mut self, enabled: bool) -> Self {
        self.page_breaks = enabled;
        self
    }

    /// Disable page-break detection.
    pub fn without_page_breaks(mut self) -> Self {
        self.page_breaks = false;
        self
    }

    /// Enable or disable merging of adjacent text blocks.
    pub fn with_text_block_merge(mut self, enabled: bool) -> Self {
        self.merge_text_blocks = enabled;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the nested table depth limit.
    pub fn with_max_table_depth(mut self, depth: usize) -> Self {
        self.max_table_depth = depth;
        self
    }

    /// Set heading classifier thresholds.
    pub fn with_heading_config(mut self, config: HeadingConfig) -> Self {
        self.heading = config;
        self
    }

    /// Set page-break detector thresholds.
    pub fn with_page_break_config(mut self, config: PageBreakConfig) -> Self {
        self.page_break = config;
        self
    }

    /// Set table processor settings.
    pub fn with_table_config(mut self, config: TableConfig) -> Self {
        self.table = config;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            page_breaks: true,
            merge_text_blocks: true,
            parallel: true,
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
            heading: HeadingConfig::default(),
            page_break: PageBreakConfig::default(),
            table: TableConfig::default(),
        }
    }
}

/// Thresholds for heading classification.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingConfig {
    /// Longest text (in characters) that can still be a heading
    pub max_length: usize,

    /// Font-size ratio to the base font that counts as a large font
    pub large_font_ratio: f64,

    /// Top margin (points) that lets bold or centered caps text pass the trait gate
    pub gate_margin_top_pt: f64,

    /// Centered all-caps text must be longer than this to pass the trait gate
    pub caps_min_length: usize,

    /// Font-size ratio above which text is prominent
    pub prominent_font_ratio: f64,

    /// Top margin (points) at which text is prominent
    pub prominent_margin_top_pt: f64,

    /// Length range for the generic section-heading check
    pub section_length: (usize, usize),

    /// Level-4 headings must be shorter than this
    pub minor_max_length: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            max_length: 100,
            large_font_ratio: 1.1,
            gate_margin_top_pt: 12.0,
            caps_min_length: 4,
            prominent_font_ratio: 1.2,
            prominent_margin_top_pt: 18.0,
            section_length: (8, 60),
            minor_max_length: 50,
        }
    }
}

/// Thresholds for page-break detection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBreakConfig {
    /// Class names that mark a page break (matched case-insensitively)
    pub class_names: Vec<String>,

    /// Height (pixels) of a horizontal rule used as a page marker
    pub rule_height_px: f64,

    /// Allowed deviation from `rule_height_px`
    pub rule_tolerance_px: f64,

    /// Known full-page heights in points (A4, Letter, Legal)
    pub page_heights_pt: Vec<f64>,

    /// Known full-page widths in points (A4, Letter)
    pub page_widths_pt: Vec<f64>,

    /// Allowed deviation from a known page dimension, in points
    pub page_tolerance_pt: f64,
}

impl Default for PageBreakConfig {
    fn default() -> Self {
        Self {
            class_names: ["page-break-area", "page-break", "pagebreak", "page_break", "pagebreakarea"]
                .into_iter()
                .map(String::from)
                .collect(),
            rule_height_px: 3.0,
            rule_tolerance_px: 0.5,
            page_heights_pt: vec![842.4, 792.0, 1008.0],
            page_widths_pt: vec![597.6, 612.0],
            page_tolerance_pt: 2.0,
        }
    }
}
