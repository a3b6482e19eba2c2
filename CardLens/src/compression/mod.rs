//! Compression utilities
//!
//! PNG compressed text uses zlib-wrapped deflate. Inflation goes through an
//! ordered list of interchangeable backends: the first one that succeeds wins,
//! and a single [`Error::DecompressionFailed`] is reported when all of them fail.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod bundled;
pub mod stream;

pub use bundled::BundledInflate;
pub use stream::StreamInflate;

/// Default cap on inflated output per chunk (64 MiB)
pub const DEFAULT_MAX_INFLATED_SIZE: usize = 64 * 1024 * 1024;

/// A deflate implementation that can inflate a zlib stream.
pub trait InflateBackend {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Inflate `compressed`, producing at most `limit` bytes.
    ///
    /// Any resources the backend holds are dropped before this returns, on
    /// success and on failure alike.
    fn inflate(&self, compressed: &[u8], limit: usize) -> std::result::Result<Vec<u8>, String>;
}

/// Selectable inflate backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Streaming decoder (`flate2`)
    Stream,
    /// One-shot bundled library (`libdeflate`)
    Bundled,
}

impl BackendKind {
    /// Default try order: streaming first, bundled library second
    pub const DEFAULT_ORDER: [BackendKind; 2] = [BackendKind::Stream, BackendKind::Bundled];

    fn backend(self) -> &'static dyn InflateBackend {
        match self {
            BackendKind::Stream => &StreamInflate,
            BackendKind::Bundled => &BundledInflate,
        }
    }
}

/// Inflates compressed chunk payloads by trying each backend in order.
#[derive(Debug, Clone)]
pub struct Inflater {
    backends: Vec<BackendKind>,
    max_output: usize,
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new(BackendKind::DEFAULT_ORDER.to_vec(), DEFAULT_MAX_INFLATED_SIZE)
    }
}

impl Inflater {
    /// Create an inflater with an explicit backend order and output cap.
    pub fn new(backends: Vec<BackendKind>, max_output: usize) -> Self {
        Self {
            backends,
            max_output,
        }
    }

    /// Inflate a zlib stream.
    ///
    /// # Errors
    /// Returns [`Error::DecompressionFailed`] if every backend fails, or if no
    /// backend is configured.
    pub fn inflate(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut failures = Vec::with_capacity(self.backends.len());

        for kind in &self.backends {
            let backend = kind.backend();
            match backend.inflate(compressed, self.max_output) {
                Ok(data) => return Ok(data),
                Err(e) => {
                    tracing::debug!("{} inflate failed, trying next backend: {}", backend.name(), e);
                    failures.push(format!("{}: {e}", backend.name()));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no inflate backend configured".to_string());
        }

        Err(Error::DecompressionFailed {
            message: failures.join("; "),
        })
    }
}

/// Compress data into a zlib stream
///
/// # Errors
/// Returns [`Error::CompressionError`] if the encoder fails.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::CompressionError(format!("zlib: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::CompressionError(format!("zlib: {e}")))
}
