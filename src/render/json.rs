//! JSON rendering for filing documents.

use serde::Serialize;

use crate::error::Result;
use crate::model::Document;
use crate::table::{ProcessedTable, TableConfig};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Run every table through the processor and render the results as JSON.
///
/// Tables with no content are rendered as `null` so indices line up with
/// [`Document::tables`].
pub fn tables_to_json(
    doc: &Document,
    config: &TableConfig,
    parallel: bool,
    format: JsonFormat,
) -> Result<String> {
    let tables: Vec<Option<ProcessedTable>> = doc.process_tables(config, parallel);
    serialize(&tables, format)
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BreakSource, HeadingNode, Node, PageBreakNode, StyleRecord, TableNode, TableRow,
    };

    fn sample() -> Document {
        let mut doc = Document::from_nodes(vec![
            Node::PageBreak(PageBreakNode::new(0, BreakSource::DocumentStart)),
            Node::Heading(HeadingNode::new("PART I", StyleRecord::default(), 1)),
            Node::Table(TableNode::with_rows(vec![
                TableRow::from_strings(["Revenue", "(600)"]),
                TableRow::from_strings(["", ""]),
            ])),
            Node::Table(TableNode::with_rows(vec![TableRow::from_strings(["", ""])])),
        ]);
        doc.metadata.title = Some("10-K".to_string());
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"10-K\""));
        assert!(json.contains("\"type\": \"heading\""));
        assert!(json.contains("\"source\": \"document_start\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_json_round_trip() {
        let doc = sample();
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_tables_to_json() {
        let json =
            tables_to_json(&sample(), &TableConfig::default(), false, JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let tables = value.as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0]["data_rows"][0][1], "-600");
        assert_eq!(tables[0]["alignments"][1], "right");
        assert!(tables[1].is_null());
    }
}
