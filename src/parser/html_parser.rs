//! Filing HTML parser using scraper.

use std::io::Read;
use std::path::Path;

use scraper::Html;

use crate::detect::{prepare_input, InputFormat};
use crate::error::Result;
use crate::model::Document;

use super::builder::NodeBuilder;
use super::dom::{DomNode, ScraperNode};
use super::options::ParseOptions;

/// Filing document parser.
#[derive(Debug, Clone)]
pub struct HtmlParser {
    source: String,
    format: InputFormat,
    options: ParseOptions,
}

impl HtmlParser {
    /// Open a filing document.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a filing document with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse a document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a document from bytes with custom options.
    ///
    /// EDGAR SGML submissions are unwrapped to their first document.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let (format, source) = prepare_input(data)?;
        log::debug!("detected {format} input ({} bytes)", source.len());
        Ok(Self {
            source,
            format,
            options,
        })
    }

    /// Parse a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a document from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Wrap an HTML string without format detection.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            source: html.into(),
            format: InputFormat::Html,
            options: ParseOptions::default(),
        }
    }

    /// Replace the parse options.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Detected input format.
    pub fn format(&self) -> InputFormat {
        self.format
    }

    /// Parse the document.
    ///
    /// Returns `None` when the markup has no `<body>` element.
    pub fn parse(&self) -> Option<Document> {
        let html = Html::parse_document(&self.source);
        let mut document = parse_dom(ScraperNode::new(html.tree.root()), &self.options)?;
        document.metadata.title = ScraperNode::title(&html);
        Some(document)
    }
}

/// Build a document from any DOM.
///
/// `root` may be the body itself or any ancestor of it. Returns `None` when
/// no `<body>` element exists.
pub fn parse_dom<N: DomNode>(root: N, options: &ParseOptions) -> Option<Document> {
    let body = if root.tag_name() == Some("body") {
        root
    } else {
        let Some(body) = root.find_tag("body") else {
            log::debug!("document has no <body> element");
            return None;
        };
        body
    };

    let nodes = NodeBuilder::new(options).build(body);
    Some(Document::from_nodes(nodes))
}
