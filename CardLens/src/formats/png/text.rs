//! Text chunk payload decoding

use super::{ChunkRecord, RawTextChunk, TextVariant};
use crate::compression::Inflater;

/// Decode bytes as Latin-1 (ISO 8859-1), one char per byte
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Split at the first NUL; without one, everything is the field and the rest is empty.
fn split_nul(bytes: &[u8]) -> (&[u8], &[u8]) {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => (&bytes[..pos], &bytes[pos + 1..]),
        None => (bytes, &[]),
    }
}

/// Decode a raw text chunk into a [`ChunkRecord`].
///
/// Decompression failures do not abort anything: the record comes back with
/// `decoded_text: None` and the failure in `error`, and selection skips it.
pub fn decode_chunk(raw: &RawTextChunk<'_>, inflater: &Inflater) -> ChunkRecord {
    let (keyword_bytes, rest) = split_nul(raw.data);
    let keyword = decode_latin1(keyword_bytes);

    let mut record = ChunkRecord {
        offset: raw.offset,
        keyword,
        variant: raw.variant,
        raw_payload: raw.data.to_vec(),
        text_bytes: None,
        decoded_text: None,
        language: None,
        translated_keyword: None,
        error: None,
    };

    match raw.variant {
        TextVariant::Plain => {
            record.decoded_text = Some(decode_latin1(rest));
            record.text_bytes = Some(rest.to_vec());
        }
        TextVariant::International => {
            let flag = rest.first().copied().unwrap_or(0);
            let method = rest.get(1).copied().unwrap_or(0);
            let after_method = rest.get(2..).unwrap_or(&[]);
            let (language, after_language) = split_nul(after_method);
            let (translated, text) = split_nul(after_language);

            record.language = Some(decode_latin1(language));
            record.translated_keyword = Some(String::from_utf8_lossy(translated).into_owned());

            // Only method 0 (zlib) is defined; any other method is read as stored text.
            if flag == 1 && method == 0 {
                apply_inflated(&mut record, text, inflater);
            } else {
                record.decoded_text = Some(String::from_utf8_lossy(text).into_owned());
                record.text_bytes = Some(text.to_vec());
            }
        }
        TextVariant::Compressed => {
            // First byte is the compression method, always 0.
            let compressed = rest.get(1..).unwrap_or(&[]);
            apply_inflated(&mut record, compressed, inflater);
        }
    }

    record
}

fn apply_inflated(record: &mut ChunkRecord, compressed: &[u8], inflater: &Inflater) {
    match inflater.inflate(compressed) {
        Ok(inflated) => {
            record.decoded_text = Some(String::from_utf8_lossy(&inflated).into_owned());
            record.text_bytes = Some(inflated);
        }
        Err(e) => {
            tracing::warn!(
                "Dropping {} chunk '{}' at offset {}: {}",
                record.variant,
                record.keyword,
                record.offset,
                e
            );
            record.error = Some(e.to_string());
        }
    }
}
