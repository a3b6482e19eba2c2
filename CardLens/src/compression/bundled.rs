//! One-shot zlib inflate via the bundled `libdeflate` library

use libdeflater::{DecompressionError, Decompressor};

use super::InflateBackend;

/// Smallest output buffer tried first
const MIN_INITIAL_SIZE: usize = 1024;

/// Bundled library backend.
///
/// `libdeflate` needs the whole output buffer up front, so the buffer starts
/// at four times the input and doubles on `InsufficientSpace` until `limit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledInflate;

impl InflateBackend for BundledInflate {
    fn name(&self) -> &'static str {
        "bundled"
    }

    fn inflate(&self, compressed: &[u8], limit: usize) -> Result<Vec<u8>, String> {
        let mut decompressor = Decompressor::new();
        let initial_size = compressed
            .len()
            .saturating_mul(4)
            .max(MIN_INITIAL_SIZE)
            .min(limit);
        let mut output = vec![0u8; initial_size];

        loop {
            match decompressor.zlib_decompress(compressed, &mut output) {
                Ok(size) => {
                    output.truncate(size);
                    return Ok(output);
                }
                Err(DecompressionError::InsufficientSpace) => {
                    if output.len() >= limit {
                        return Err(format!("inflated output exceeds {limit} bytes"));
                    }
                    let grown = output.len().saturating_mul(2).min(limit);
                    output.resize(grown, 0);
                }
                Err(_) => {
                    return Err("libdeflate rejected the data".to_string());
                }
            }
        }
    }
}
