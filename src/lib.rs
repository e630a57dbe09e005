//! # sechtml
//!
//! Structural inference for SEC filing HTML.
//!
//! Filing documents are produced by many different filing-agent tools and
//! carry almost no semantic markup. This library infers an ordered sequence
//! of headings, text blocks, tables and page breaks from inline styles, text
//! shape and table geometry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sechtml::{parse_file, render};
//!
//! fn main() -> sechtml::Result<()> {
//!     let Some(doc) = parse_file("aapl-20230930.htm")? else {
//!         eprintln!("no <body> element");
//!         return Ok(());
//!     };
//!
//!     for heading in doc.headings() {
//!         println!("{} {}", "#".repeat(heading.level as usize), heading.text);
//!     }
//!     println!("{}", render::to_json(&doc, render::JsonFormat::Compact)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Heading inference**: four levels from weight, size, margins and text shape
//! - **Page tracking**: explicit styles, class names, rules and page-sized blocks
//! - **Inline XBRL context**: annotations carried onto the nodes they cover
//! - **Financial tables**: header detection, column repair, alignment, width fitting
//! - **Parallel processing**: Uses Rayon for per-table processing

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod table;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_html, InputFormat};
pub use error::{Error, Result};
pub use model::{
    Annotations, BreakSource, CellContent, Document, HeadingNode, Metadata, Node, NodeKind,
    Outline, OutlineItem, PageBreakNode, StyleRecord, TableCell, TableNode, TableRow,
    TextBlockNode,
};
pub use parser::{HeadingConfig, HtmlParser, PageBreakConfig, ParseOptions};
pub use render::JsonFormat;
pub use table::{
    Alignment, ColumnWidthConfig, ColumnWidthOptimizer, ProcessedTable, SizedTable, TableConfig,
    TableProcessor,
};

use std::io::Read;
use std::path::Path;

/// Parse filing HTML held in memory.
///
/// Returns `None` when the markup has no `<body>` element.
///
/// # Example
///
/// ```
/// let doc = sechtml::parse_html("<html><body><p><b>PART I</b></p></body></html>").unwrap();
/// assert_eq!(doc.headings().count(), 1);
/// ```
pub fn parse_html(html: &str) -> Option<Document> {
    HtmlParser::from_html(html).parse()
}

/// Parse filing HTML held in memory with custom options.
///
/// # Example
///
/// ```
/// use sechtml::{parse_html_with_options, ParseOptions};
///
/// let options = ParseOptions::new().without_page_breaks();
/// let doc = parse_html_with_options("<body><p>Text</p></body>", options).unwrap();
/// assert_eq!(doc.page_count(), 0);
/// ```
pub fn parse_html_with_options(html: &str, options: ParseOptions) -> Option<Document> {
    HtmlParser::from_html(html).with_options(options).parse()
}

/// Parse a filing file and return a structured document.
///
/// # Arguments
///
/// * `path` - Path to the filing document (`.htm`, `.html` or an EDGAR `.txt` submission)
///
/// # Returns
///
/// `Ok(None)` when the file is markup without a `<body>` element.
///
/// # Example
///
/// ```no_run
/// use sechtml::parse_file;
///
/// let doc = parse_file("filing.htm").unwrap().expect("document body");
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Option<Document>> {
    let parser = HtmlParser::open(path)?;
    Ok(parser.parse())
}

/// Parse a filing file with custom options.
///
/// # Example
///
/// ```no_run
/// use sechtml::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .without_page_breaks()
///     .sequential();
/// let doc = parse_file_with_options("filing.htm", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Option<Document>> {
    let parser = HtmlParser::open_with_options(path, options)?;
    Ok(parser.parse())
}

/// Parse a filing from bytes.
///
/// # Example
///
/// ```no_run
/// use sechtml::parse_bytes;
///
/// let data = std::fs::read("filing.htm").unwrap();
/// let doc = parse_bytes(&data).unwrap();
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Option<Document>> {
    let parser = HtmlParser::from_bytes(data)?;
    Ok(parser.parse())
}

/// Parse a filing from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Option<Document>> {
    let parser = HtmlParser::from_bytes_with_options(data, options)?;
    Ok(parser.parse())
}

/// Parse a filing from a reader.
///
/// # Example
///
/// ```no_run
/// use sechtml::parse_reader;
/// use std::fs::File;
///
/// let file = File::open("filing.htm").unwrap();
/// let doc = parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<Option<Document>> {
    let parser = HtmlParser::from_reader(reader)?;
    Ok(parser.parse())
}

/// Parse a filing from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(
    reader: R,
    options: ParseOptions,
) -> Result<Option<Document>> {
    let parser = HtmlParser::from_reader_with_options(reader, options)?;
    Ok(parser.parse())
}

/// Read and parse a filing file on the tokio runtime.
///
/// The file is read asynchronously; parsing runs on a blocking thread.
#[cfg(feature = "async")]
pub async fn parse_file_async<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Option<Document>> {
    let data = tokio::fs::read(path.as_ref()).await?;
    let parser = HtmlParser::from_bytes_with_options(&data, options)?;
    tokio::task::spawn_blocking(move || parser.parse())
        .await
        .map_err(|e| Error::Other(format!("parse task failed: {e}")))
}

/// Extract plain text from a filing file.
///
/// # Example
///
/// ```no_run
/// use sechtml::extract_text;
///
/// if let Some(text) = extract_text("filing.htm").unwrap() {
///     println!("{}", text);
/// }
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    Ok(parse_file(path)?.map(|doc| doc.plain_text()))
}

/// Convert a filing file to JSON.
///
/// # Example
///
/// ```no_run
/// use sechtml::{to_json, JsonFormat};
///
/// let json = to_json("filing.htm", JsonFormat::Pretty).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<Option<String>> {
    match parse_file(path)? {
        Some(doc) => render::to_json(&doc, format).map(Some),
        None => Ok(None),
    }
}

/// Builder for parsing filings and post-processing their tables.
///
/// # Example
///
/// ```no_run
/// use sechtml::Sechtml;
///
/// let result = Sechtml::new()
///     .without_page_breaks()
///     .with_width_budget(80)
///     .parse("filing.htm")?
///     .expect("document body");
///
/// for table in result.sized_tables().into_iter().flatten() {
///     println!("{:?}", table.widths);
/// }
/// # Ok::<(), sechtml::Error>(())
/// ```
pub struct Sechtml {
    parse_options: ParseOptions,
    width_config: ColumnWidthConfig,
}

impl Sechtml {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            width_config: ColumnWidthConfig::default(),
        }
    }

    /// Do not detect or emit page breaks.
    pub fn without_page_breaks(mut self) -> Self {
        self.parse_options = self.parse_options.without_page_breaks();
        self
    }

    /// Keep adjacent text blocks separate.
    pub fn without_text_block_merge(mut self) -> Self {
        self.parse_options = self.parse_options.with_text_block_merge(false);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Set the table processor configuration.
    pub fn with_table_config(mut self, config: TableConfig) -> Self {
        self.parse_options = self.parse_options.with_table_config(config);
        self
    }

    /// Set the total width budget for sized tables.
    pub fn with_width_budget(mut self, budget: usize) -> Self {
        self.width_config = self.width_config.with_budget(budget);
        self
    }

    /// Parse a filing file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<Option<SechtmlResult>> {
        let parser = HtmlParser::open_with_options(path, self.parse_options.clone())?;
        Ok(self.wrap(parser.parse()))
    }

    /// Parse a filing from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<Option<SechtmlResult>> {
        let parser = HtmlParser::from_bytes_with_options(data, self.parse_options.clone())?;
        Ok(self.wrap(parser.parse()))
    }

    fn wrap(self, document: Option<Document>) -> Option<SechtmlResult> {
        document.map(|document| SechtmlResult {
            document,
            parse_options: self.parse_options,
            width_config: self.width_config,
        })
    }
}

impl Default for Sechtml {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a filing document.
pub struct SechtmlResult {
    /// The parsed document
    pub document: Document,
    parse_options: ParseOptions,
    width_config: ColumnWidthConfig,
}

impl SechtmlResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Process every table; `None` entries mark tables with no content.
    pub fn processed_tables(&self) -> Vec<Option<ProcessedTable>> {
        self.document
            .process_tables(&self.parse_options.table, self.parse_options.parallel)
    }

    /// Process every table and fit it to the width budget.
    pub fn sized_tables(&self) -> Vec<Option<SizedTable>> {
        let optimizer = ColumnWidthOptimizer::new(self.width_config.clone());
        self.processed_tables()
            .into_iter()
            .map(|t| t.map(|t| optimizer.optimize(&t)))
            .collect()
    }

    /// Get plain text.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
