//! Input format detection and EDGAR submission unwrapping.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Number of leading bytes inspected when sniffing a format.
const SNIFF_LEN: usize = 4096;

/// Kind of filing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Plain (X)HTML filing document
    Html,
    /// XHTML with inline XBRL tagging
    InlineXbrl,
    /// EDGAR SGML submission wrapping one or more documents
    SgmlSubmission,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Html => "HTML",
            InputFormat::InlineXbrl => "inline XBRL",
            InputFormat::SgmlSubmission => "SGML submission",
        };
        f.write_str(name)
    }
}

/// Detect the input format of a file.
///
/// # Example
/// ```no_run
/// use sechtml::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("filing.htm").unwrap();
/// println!("format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    BufReader::new(file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the input format from the leading bytes of a document.
///
/// # Returns
/// * `Ok(InputFormat)` if the data looks like markup
/// * `Err(Error::UnknownFormat)` for binary data or text without tags
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    let head = &data[..data.len().min(SNIFF_LEN)];
    if head.starts_with(b"%PDF") || head.contains(&0) {
        return Err(Error::UnknownFormat);
    }

    let text = String::from_utf8_lossy(head).to_ascii_lowercase();
    let text = text.trim_start_matches('\u{feff}').trim_start();

    if text.starts_with("<sec-document>")
        || text.starts_with("<sec-header>")
        || text.starts_with("<ims-document>")
        || (text.starts_with("<document>") && text.contains("<type>"))
    {
        return Ok(InputFormat::SgmlSubmission);
    }
    if text.contains("xmlns:ix=") || text.contains("<ix:header") {
        return Ok(InputFormat::InlineXbrl);
    }
    if text.contains('<') {
        return Ok(InputFormat::Html);
    }

    Err(Error::UnknownFormat)
}

/// Check if a file looks like a filing document.
pub fn is_html<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes look like a filing document.
pub fn is_html_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Decode input bytes and unwrap SGML submissions.
///
/// Invalid UTF-8 is replaced rather than rejected; filing agents emit
/// Latin-1 and Windows-1252 bytes freely.
pub fn prepare_input(data: &[u8]) -> Result<(InputFormat, String)> {
    let format = detect_format_from_bytes(data)?;
    let text = String::from_utf8_lossy(data);

    let source = match format {
        InputFormat::SgmlSubmission => match first_text_payload(&text) {
            Some(payload) => payload.to_string(),
            None => {
                log::warn!("SGML submission without a <TEXT> payload");
                text.into_owned()
            }
        },
        _ => text.into_owned(),
    };
    Ok((format, source))
}

/// Contents of the first `<TEXT>...</TEXT>` block of a submission.
///
/// A payload wrapped in `<XBRL>` or `<XML>` keeps its inner markup.
pub fn first_text_payload(submission: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = submission.to_ascii_lowercase();
    let start = lower.find("<text>")? + "<text>".len();
    let end = lower[start..]
        .find("</text>")
        .map_or(submission.len(), |i| start + i);

    let payload = submission[start..end].trim();
    let lower_payload = payload.to_ascii_lowercase();
    for wrapper in ["xbrl", "xml"] {
        let open = format!("<{wrapper}>");
        let close = format!("</{wrapper}>");
        if lower_payload.starts_with(&open) && lower_payload.ends_with(&close) {
            return Some(payload[open.len()..payload.len() - close.len()].trim());
        }
    }
    Some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMISSION: &str = "<SEC-DOCUMENT>0000320193-23-000106.txt\n<SEC-HEADER>\nCONFORMED SUBMISSION TYPE: 10-K\n</SEC-HEADER>\n<DOCUMENT>\n<TYPE>10-K\n<TEXT>\n<html><body><p>Filing body</p></body></html>\n</TEXT>\n</DOCUMENT>\n<DOCUMENT>\n<TYPE>EX-21\n<TEXT>\nsecond\n</TEXT>\n</DOCUMENT>";

    #[test]
    fn test_detect_html() {
        let format = detect_format_from_bytes(b"<!DOCTYPE html><html><body></body></html>").unwrap();
        assert_eq!(format, InputFormat::Html);
    }

    #[test]
    fn test_detect_inline_xbrl() {
        let data = br#"<?xml version="1.0"?><html xmlns="http://www.w3.org/1999/xhtml" xmlns:ix="http://www.xbrl.org/2013/inlineXBRL">"#;
        assert_eq!(
            detect_format_from_bytes(data).unwrap(),
            InputFormat::InlineXbrl
        );
    }

    #[test]
    fn test_detect_sgml_submission() {
        assert_eq!(
            detect_format_from_bytes(SUBMISSION.as_bytes()).unwrap(),
            InputFormat::SgmlSubmission
        );
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-1.7\n"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"plain text, no markup"),
            Err(Error::UnknownFormat)
        ));
        assert!(!is_html_bytes(b"\x00\x01\x02<"));
    }

    #[test]
    fn test_unwrap_first_document() {
        let (format, source) = prepare_input(SUBMISSION.as_bytes()).unwrap();
        assert_eq!(format, InputFormat::SgmlSubmission);
        assert_eq!(source, "<html><body><p>Filing body</p></body></html>");
    }

    #[test]
    fn test_unwrap_xbrl_wrapper() {
        let submission = "<DOCUMENT>\n<TYPE>10-Q\n<TEXT>\n<XBRL>\n<html><body>x</body></html>\n</XBRL>\n</TEXT>";
        assert_eq!(
            first_text_payload(submission),
            Some("<html><body>x</body></html>")
        );
    }

    #[test]
    fn test_lossy_decoding() {
        let (_, source) = prepare_input(b"<p>Caf\xe9</p>").unwrap();
        assert!(source.starts_with("<p>Caf"));
        assert!(source.contains('\u{FFFD}'));
    }
}
