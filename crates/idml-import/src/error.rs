//! Error types for idml-import
use thiserror::Error;

/// A specialized Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that can occur while importing an IDML package
///
/// Only container-level problems abort an import. Per-document parse
/// failures, classification gaps and asset misses are reported through
/// [`crate::ImportResult::warnings`] instead.
#[derive(Error, Debug)]
pub enum ImportError {
    /// I/O error (file not found, read error, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a readable ZIP archive
    #[error("Invalid IDML container: {0}")]
    InvalidContainer(#[from] zip::result::ZipError),

    /// A named entry does not exist in the container
    #[error("Entry not found in container: {0}")]
    EntryNotFound(String),

    /// The container holds no spread documents
    #[error("No spread documents found in container")]
    NoSpreads,

    /// XML parsing failed for a single document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration or manifest could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),
}
