//! Error types for bindery operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while composing an EPUB.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid book options or output path. Raised before any I/O.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A source image, cover or other resource could not be read.
    #[error("failed to load resource `{reference}`: {source}")]
    Resource {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    /// An image extension with no known manifest media type.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Writing or finalizing the archive failed. The staging file is kept.
    #[error("failed to write package (staging file kept at {}): {source}", staging.display())]
    Packaging {
        staging: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The same path was added to an archive twice.
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML writing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn resource(reference: impl Into<String>, source: std::io::Error) -> Self {
        Error::Resource {
            reference: reference.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
