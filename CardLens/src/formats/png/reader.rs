//! PNG signature check and chunk scanning

use byteorder::{BigEndian, ByteOrder};

use super::{CHUNK_CRC_SIZE, CHUNK_HEADER_SIZE, IEND, PNG_SIGNATURE, TextVariant};
use crate::error::{Error, Result};

/// Why the chunk scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanStop {
    /// Reached the `IEND` chunk
    Terminated,
    /// A chunk's declared length ran past the end of the buffer
    Truncated {
        /// Offset of the offending chunk's length field
        offset: usize,
        /// Declared data length
        declared_len: usize,
        /// Bytes left after the chunk header
        available: usize,
    },
    /// Ran out of bytes without seeing `IEND`
    Exhausted,
}

impl ScanStop {
    /// Convert a truncation stop into the matching error value, for reporting.
    pub fn as_error(&self) -> Option<Error> {
        match *self {
            ScanStop::Truncated {
                offset,
                declared_len,
                available,
            } => Some(Error::TruncatedOrMalformedChunk {
                offset,
                declared_len,
                available,
            }),
            ScanStop::Terminated | ScanStop::Exhausted => None,
        }
    }
}

/// A text chunk found by the scanner, not yet decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTextChunk<'a> {
    /// Offset of the chunk's length field
    pub offset: usize,
    /// Which text chunk type this is
    pub variant: TextVariant,
    /// The chunk's data field
    pub data: &'a [u8],
}

/// Result of scanning a PNG's chunk stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkScan<'a> {
    /// Text chunks in file order
    pub chunks: Vec<RawTextChunk<'a>>,
    /// Number of non-text chunks skipped
    pub skipped: usize,
    /// Why scanning stopped
    pub stop: ScanStop,
}

/// Check the 8-byte PNG signature
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] if the data is shorter than the
/// signature or does not match it.
pub fn validate_signature(data: &[u8]) -> Result<()> {
    match data.get(..PNG_SIGNATURE.len()) {
        Some(magic) if magic == PNG_SIGNATURE => Ok(()),
        _ => Err(Error::NotContainerFormat),
    }
}

/// Walk the chunk stream and collect every text chunk.
///
/// The signature is validated first. Non-text chunks are skipped by offset
/// arithmetic. CRCs are not checked. A chunk whose length overruns the buffer
/// ends the scan without error; whatever was collected before it is kept.
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] if the signature does not match.
pub fn scan_text_chunks(data: &[u8]) -> Result<ChunkScan<'_>> {
    validate_signature(data)?;

    let mut chunks = Vec::new();
    let mut skipped = 0;
    let mut offset = PNG_SIGNATURE.len();

    let stop = loop {
        if offset + CHUNK_HEADER_SIZE > data.len() {
            break ScanStop::Exhausted;
        }

        let length = BigEndian::read_u32(&data[offset..offset + 4]) as usize;
        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(&data[offset + 4..offset + CHUNK_HEADER_SIZE]);

        if chunk_type == IEND {
            break ScanStop::Terminated;
        }

        let data_start = offset + CHUNK_HEADER_SIZE;
        let available = data.len() - data_start;
        if length > available {
            tracing::debug!(
                "Chunk {} at offset {} declares {} bytes, only {} remain; stopping scan",
                String::from_utf8_lossy(&chunk_type),
                offset,
                length,
                available
            );
            break ScanStop::Truncated {
                offset,
                declared_len: length,
                available,
            };
        }

        let data_end = data_start + length;
        if let Some(variant) = TextVariant::from_chunk_type(chunk_type) {
            tracing::debug!("Found {} chunk at offset {} ({} bytes)", variant, offset, length);
            chunks.push(RawTextChunk {
                offset,
                variant,
                data: &data[data_start..data_end],
            });
        } else {
            skipped += 1;
        }

        // The CRC may be cut off; the next iteration then reports exhaustion.
        offset = data_end + CHUNK_CRC_SIZE;
    };

    Ok(ChunkScan {
        chunks,
        skipped,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::png::write_chunk;

    fn png_with(chunks: &[([u8; 4], &[u8])]) -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        for (chunk_type, data) in chunks {
            write_chunk(&mut png, *chunk_type, data);
        }
        png
    }

    #[test]
    fn test_signature_rejects_short_input() {
        assert!(validate_signature(&PNG_SIGNATURE[..7]).unwrap_err().is_not_container());
        assert!(validate_signature(&[]).is_err());
    }

    #[test]
    fn test_signature_rejects_wrong_magic() {
        let mut data = PNG_SIGNATURE.to_vec();
        data[1] = b'J';
        assert!(matches!(validate_signature(&data), Err(Error::NotContainerFormat)));
    }

    #[test]
    fn test_scan_collects_text_chunks_in_order() {
        let png = png_with(&[
            (*b"IHDR", &[0u8; 13]),
            (*b"tEXt", b"chara\0one"),
            (*b"IDAT", &[1, 2, 3]),
            (*b"zTXt", b"chara\0\0xx"),
            (*b"iTXt", b"chara\0\0\0\0\0two"),
            (*b"IEND", &[]),
        ]);

        let scan = scan_text_chunks(&png).unwrap();
        assert_eq!(scan.stop, ScanStop::Terminated);
        assert_eq!(scan.skipped, 2);
        let variants: Vec<_> = scan.chunks.iter().map(|c| c.variant).collect();
        assert_eq!(
            variants,
            vec![TextVariant::Plain, TextVariant::Compressed, TextVariant::International]
        );
        assert_eq!(scan.chunks[0].data, b"chara\0one");
    }

    #[test]
    fn test_scan_stops_at_iend() {
        let png = png_with(&[
            (*b"tEXt", b"a\0first"),
            (*b"IEND", &[]),
            (*b"tEXt", b"b\0after end"),
        ]);

        let scan = scan_text_chunks(&png).unwrap();
        assert_eq!(scan.chunks.len(), 1);
        assert_eq!(scan.stop, ScanStop::Terminated);
    }

    #[test]
    fn test_scan_keeps_chunks_before_truncation() {
        let mut png = png_with(&[(*b"tEXt", b"chara\0{}")]);
        let truncated_at = png.len();
        // Declares 100 bytes, provides 3
        png.extend_from_slice(&100u32.to_be_bytes());
        png.extend_from_slice(b"tEXt");
        png.extend_from_slice(b"abc");

        let scan = scan_text_chunks(&png).unwrap();
        assert_eq!(scan.chunks.len(), 1);
        assert_eq!(
            scan.stop,
            ScanStop::Truncated {
                offset: truncated_at,
                declared_len: 100,
                available: 3,
            }
        );
        assert!(matches!(
            scan.stop.as_error(),
            Some(Error::TruncatedOrMalformedChunk { declared_len: 100, .. })
        ));
    }

    #[test]
    fn test_scan_without_iend_is_exhausted() {
        let png = png_with(&[(*b"tEXt", b"chara\0x")]);
        let scan = scan_text_chunks(&png).unwrap();
        assert_eq!(scan.chunks.len(), 1);
        assert_eq!(scan.stop, ScanStop::Exhausted);
    }

    #[test]
    fn test_signature_only_is_exhausted() {
        let scan = scan_text_chunks(&PNG_SIGNATURE).unwrap();
        assert!(scan.chunks.is_empty());
        assert_eq!(scan.stop, ScanStop::Exhausted);
    }
}
