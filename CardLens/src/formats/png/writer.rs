//! Writing text chunks into PNG data

use byteorder::{BigEndian, ByteOrder};

use super::{CHUNK_CRC_SIZE, CHUNK_HEADER_SIZE, IEND, MAX_KEYWORD_LEN, PNG_SIGNATURE, TextVariant};
use super::reader::validate_signature;
use crate::compression::deflate;
use crate::error::{Error, Result};

/// Append one chunk (length, type, data, CRC) to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: [u8; 4], data: &[u8]) {
    let mut crc = crc32fast::Hasher::new();
    crc.update(&chunk_type);
    crc.update(data);

    out.reserve(CHUNK_HEADER_SIZE + data.len() + CHUNK_CRC_SIZE);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.finalize().to_be_bytes());
}

fn encode_latin1(keyword: &str, text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| Error::TextNotLatin1 {
            keyword: keyword.to_string(),
        })
}

fn validate_keyword(keyword: &str) -> Result<Vec<u8>> {
    let bytes = encode_latin1(keyword, keyword)
        .map_err(|_| Error::KeywordInvalid(keyword.to_string()))?;
    if bytes.is_empty() || bytes.len() > MAX_KEYWORD_LEN || bytes.contains(&0) {
        return Err(Error::KeywordInvalid(keyword.to_string()));
    }
    Ok(bytes)
}

/// Build the data field of a text chunk.
///
/// `iTXt` chunks are written compressed with an empty language tag and
/// translated keyword.
///
/// # Errors
/// Returns [`Error::KeywordInvalid`] for an empty, overlong, or non-Latin-1
/// keyword, and [`Error::TextNotLatin1`] if a `tEXt`/`zTXt` text cannot be
/// represented in Latin-1.
pub fn encode_text_chunk(keyword: &str, text: &str, variant: TextVariant) -> Result<Vec<u8>> {
    let mut data = validate_keyword(keyword)?;
    data.push(0);

    match variant {
        TextVariant::Plain => {
            data.extend(encode_latin1(keyword, text)?);
        }
        TextVariant::Compressed => {
            data.push(0); // method: zlib
            data.extend(deflate(&encode_latin1(keyword, text)?)?);
        }
        TextVariant::International => {
            data.extend_from_slice(&[1, 0]); // compressed, zlib
            data.push(0); // language tag
            data.push(0); // translated keyword
            data.extend(deflate(text.as_bytes())?);
        }
    }

    Ok(data)
}

/// Offset of the `IEND` chunk, or the end of the last complete chunk if there is none.
fn insertion_point(png: &[u8]) -> (usize, bool) {
    let mut offset = PNG_SIGNATURE.len();
    while offset + CHUNK_HEADER_SIZE <= png.len() {
        let length = BigEndian::read_u32(&png[offset..offset + 4]) as usize;
        if png[offset + 4..offset + CHUNK_HEADER_SIZE] == IEND {
            return (offset, true);
        }
        let next = offset + CHUNK_HEADER_SIZE + length + CHUNK_CRC_SIZE;
        if next > png.len() {
            break;
        }
        offset = next;
    }
    (offset, false)
}

/// Return a copy of `png` with a text chunk inserted just before `IEND`.
///
/// Since the extractor prefers the chunk nearest the end of the file, the
/// inserted card takes precedence over any earlier one with a recognised keyword.
/// A missing `IEND` is added; trailing bytes of a truncated chunk are dropped.
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] if `png` lacks the signature, plus any
/// error from [`encode_text_chunk`].
pub fn embed_text_chunk(png: &[u8], keyword: &str, text: &str, variant: TextVariant) -> Result<Vec<u8>> {
    validate_signature(png)?;
    let data = encode_text_chunk(keyword, text, variant)?;
    let (at, has_iend) = insertion_point(png);

    let mut out = Vec::with_capacity(png.len() + data.len() + CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE);
    out.extend_from_slice(&png[..at]);
    write_chunk(&mut out, variant.chunk_type(), &data);
    if has_iend {
        out.extend_from_slice(&png[at..]);
    } else {
        write_chunk(&mut out, IEND, &[]);
    }

    tracing::debug!("Embedded {} chunk '{}' at offset {}", variant, keyword, at);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Inflater;
    use crate::formats::png::{ScanStop, decode_chunk, scan_text_chunks};

    fn minimal_png() -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        write_chunk(&mut png, *b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
        write_chunk(&mut png, IEND, &[]);
        png
    }

    #[test]
    fn test_iend_crc_matches_png_constant() {
        let mut out = Vec::new();
        write_chunk(&mut out, IEND, &[]);
        assert_eq!(&out[8..], &[0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_embed_goes_before_iend() {
        let png = embed_text_chunk(&minimal_png(), "chara", "{}", TextVariant::Plain).unwrap();
        let scan = scan_text_chunks(&png).unwrap();
        assert_eq!(scan.stop, ScanStop::Terminated);
        assert_eq!(scan.chunks.len(), 1);
        assert!(png.ends_with(&[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]));
    }

    #[test]
    fn test_embed_adds_missing_iend() {
        let mut png = PNG_SIGNATURE.to_vec();
        write_chunk(&mut png, *b"IHDR", &[0; 13]);
        let png = embed_text_chunk(&png, "chara", "{}", TextVariant::Compressed).unwrap();
        assert_eq!(scan_text_chunks(&png).unwrap().stop, ScanStop::Terminated);
    }

    #[test]
    fn test_each_variant_decodes_back() {
        let text = r#"{"name":"Aria"}"#;
        for variant in [TextVariant::Plain, TextVariant::Compressed, TextVariant::International] {
            let png = embed_text_chunk(&minimal_png(), "chara", text, variant).unwrap();
            let scan = scan_text_chunks(&png).unwrap();
            let record = decode_chunk(&scan.chunks[0], &Inflater::default());
            assert_eq!(record.variant, variant);
            assert_eq!(record.decoded_text.as_deref(), Some(text));
        }
    }

    #[test]
    fn test_rejects_bad_keywords() {
        assert!(matches!(
            encode_text_chunk("", "x", TextVariant::Plain),
            Err(Error::KeywordInvalid(_))
        ));
        assert!(matches!(
            encode_text_chunk(&"k".repeat(80), "x", TextVariant::Plain),
            Err(Error::KeywordInvalid(_))
        ));
        assert!(matches!(
            encode_text_chunk("ch\u{2603}ra", "x", TextVariant::Plain),
            Err(Error::KeywordInvalid(_))
        ));
    }

    #[test]
    fn test_plain_text_must_be_latin1() {
        assert!(matches!(
            encode_text_chunk("chara", "\u{2603}", TextVariant::Plain),
            Err(Error::TextNotLatin1 { .. })
        ));
        assert!(encode_text_chunk("chara", "\u{2603}", TextVariant::International).is_ok());
    }

    #[test]
    fn test_embed_rejects_non_png() {
        assert!(embed_text_chunk(b"GIF89a", "chara", "{}", TextVariant::Plain)
            .unwrap_err()
            .is_not_container());
    }
}
