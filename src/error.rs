//! Error types for sechtml library.

use std::io;
use thiserror::Error;

/// Result type alias for sechtml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or exporting filing documents.
///
/// Malformed markup is never an error: a missing `<body>` or a table with no
/// content is reported as `None` by the parser so batch callers can skip the
/// input without special handling.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as HTML.
    #[error("Unknown file format: not an HTML filing document")]
    UnknownFormat,

    /// A node kind name outside heading/text_block/table/page_break was requested.
    ///
    /// This indicates a bug in the caller's dispatch logic, not messy input.
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// Error while serializing a document.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
