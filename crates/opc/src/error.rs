//! Error types for package operations

use thiserror::Error;

/// Errors that can occur while opening, mutating, or saving a package
#[derive(Debug, Error)]
pub enum PackError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive is not a readable ZIP package
    #[error("malformed package: {0}")]
    MalformedPackage(String),

    /// ZIP error during serialization
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required part
    #[error("missing required part: {0}")]
    MissingPart(String),

    /// XML parsing error within a part
    #[error("XML parse error in {part}: {message}")]
    XmlParse { part: String, message: String },

    /// A part could not be re-serialized
    #[error("serialization failure for {part}: {message}")]
    Serialization { part: String, message: String },

    /// Invalid package structure (bad rels, bad content types)
    #[error("invalid package structure: {0}")]
    InvalidStructure(String),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl PackError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        PackError::XmlParse {
            part: part.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn ser(part: &str, err: impl std::fmt::Display) -> Self {
        PackError::Serialization {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for package operations
pub type PackResult<T> = std::result::Result<T, PackError>;
