//! Streaming zlib inflate via `flate2`

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::InflateBackend;

/// Streaming decoder backend.
///
/// Reads through a `ZlibDecoder` capped at `limit + 1` bytes so oversized
/// output is detected without buffering all of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamInflate;

impl InflateBackend for StreamInflate {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn inflate(&self, compressed: &[u8], limit: usize) -> Result<Vec<u8>, String> {
        let decoder = ZlibDecoder::new(compressed);
        let mut capped = decoder.take((limit as u64).saturating_add(1));
        let mut decompressed = Vec::with_capacity(compressed.len().saturating_mul(4).min(limit));

        capped
            .read_to_end(&mut decompressed)
            .map_err(|e| format!("zlib stream error: {e}"))?;

        if decompressed.len() > limit {
            return Err(format!("inflated output exceeds {limit} bytes"));
        }

        Ok(decompressed)
    }
}
