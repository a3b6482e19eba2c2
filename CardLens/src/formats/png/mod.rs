//! PNG container support
//!
//! Only the parts of PNG needed to carry card metadata: the signature, the
//! chunk stream, and the three ancillary text chunk types.
//!
//! Every chunk is laid out as
//!
//! ```text
//! length: u32 BE | type: [u8; 4] | data: [u8; length] | crc: u32 BE
//! ```

mod reader;
mod text;
mod writer;

pub use reader::{ChunkScan, RawTextChunk, ScanStop, scan_text_chunks, validate_signature};
pub use text::{decode_chunk, decode_latin1};
pub use writer::{embed_text_chunk, encode_text_chunk, write_chunk};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Length field + type tag
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Trailing CRC32
pub const CHUNK_CRC_SIZE: usize = 4;

/// Terminal chunk
pub const IEND: [u8; 4] = *b"IEND";

/// Latin-1 text chunk
pub const TEXT: [u8; 4] = *b"tEXt";

/// International (UTF-8) text chunk
pub const ITXT: [u8; 4] = *b"iTXt";

/// Compressed Latin-1 text chunk
pub const ZTXT: [u8; 4] = *b"zTXt";

/// Keywords are 1-79 bytes
pub const MAX_KEYWORD_LEN: usize = 79;

/// The three text-bearing chunk variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextVariant {
    /// `tEXt`: `keyword \0 text`, Latin-1
    Plain,
    /// `iTXt`: keyword, compression flag/method, language, translated keyword, UTF-8 text
    International,
    /// `zTXt`: `keyword \0 method zlib(text)`
    Compressed,
}

impl TextVariant {
    /// Map a chunk type tag to its text variant.
    pub fn from_chunk_type(chunk_type: [u8; 4]) -> Option<Self> {
        match chunk_type {
            TEXT => Some(TextVariant::Plain),
            ITXT => Some(TextVariant::International),
            ZTXT => Some(TextVariant::Compressed),
            _ => None,
        }
    }

    /// The chunk type tag for this variant.
    pub fn chunk_type(self) -> [u8; 4] {
        match self {
            TextVariant::Plain => TEXT,
            TextVariant::International => ITXT,
            TextVariant::Compressed => ZTXT,
        }
    }

    /// Chunk type tag as a string (e.g., "tEXt")
    pub fn tag(self) -> &'static str {
        match self {
            TextVariant::Plain => "tEXt",
            TextVariant::International => "iTXt",
            TextVariant::Compressed => "zTXt",
        }
    }
}

impl std::fmt::Display for TextVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One decoded text chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    /// Byte offset of the chunk's length field in the container
    pub offset: usize,
    /// Keyword (Latin-1), read before anything else in the payload
    pub keyword: String,
    /// Which text chunk this came from
    pub variant: TextVariant,
    /// The chunk's data field, untouched
    pub raw_payload: Vec<u8>,
    /// Bytes the text was decoded from (inflated for compressed chunks)
    pub text_bytes: Option<Vec<u8>>,
    /// Decoded text, `None` if the chunk could not be decompressed
    pub decoded_text: Option<String>,
    /// `iTXt` language tag
    pub language: Option<String>,
    /// `iTXt` translated keyword
    pub translated_keyword: Option<String>,
    /// Why the text could not be decoded
    pub error: Option<String>,
}

impl ChunkRecord {
    /// Whether this record carries usable text.
    pub fn is_decoded(&self) -> bool {
        self.decoded_text.is_some()
    }
}
