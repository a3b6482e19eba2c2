//! Error types for `CardLens`

use thiserror::Error;

/// The error type for `CardLens` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Container Errors ====================
    /// The data does not start with the PNG signature.
    #[error("not a PNG container: signature mismatch")]
    NotContainerFormat,

    /// A chunk declared more data than the buffer holds.
    ///
    /// The scanner never returns this; it stops and keeps what it has. The
    /// variant exists so reports and writers can describe the condition.
    #[error("chunk at offset {offset} declares {declared_len} bytes but only {available} remain")]
    TruncatedOrMalformedChunk {
        /// Byte offset of the chunk's length field.
        offset: usize,
        /// Length the chunk header declared.
        declared_len: usize,
        /// Bytes actually remaining after the chunk header.
        available: usize,
    },

    /// A text chunk keyword is empty, too long, or contains a NUL.
    #[error("invalid text keyword: {0:?}")]
    KeywordInvalid(String),

    /// Text for a Latin-1 chunk contains characters outside Latin-1.
    #[error("text for keyword {keyword:?} is not representable in Latin-1; use iTXt")]
    TextNotLatin1 {
        /// Keyword of the chunk being written.
        keyword: String,
    },

    // ==================== Compression Errors ====================
    /// Every configured inflate backend rejected the payload.
    #[error("decompression failed: {message}")]
    DecompressionFailed {
        /// Messages from each backend that was tried.
        message: String,
    },

    /// Deflate compression failed while writing a chunk.
    #[error("compression failed: {0}")]
    CompressionError(String),

    // ==================== Card Errors ====================
    /// No candidate text parsed as a JSON object.
    #[error("no structured card data found")]
    NoStructuredDataFound,

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== Configuration Errors ====================
    /// TOML configuration could not be parsed.
    #[error("config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error means the input was not a PNG at all.
    ///
    /// Callers use this to tell "unsupported file" apart from "image with no card".
    pub fn is_not_container(&self) -> bool {
        matches!(self, Error::NotContainerFormat)
    }
}

/// A specialized Result type for `CardLens` operations.
pub type Result<T> = std::result::Result<T, Error>;
