//! Candidate selection by keyword

use serde::Serialize;

use super::options::ExtractOptions;
use crate::formats::ChunkRecord;

/// Keywords used by card exporters (`SillyTavern`, CCv2/CCv3, and friends)
pub const KNOWN_KEYWORDS: [&str; 12] = [
    "chara",
    "chara_card",
    "chara_card_v2",
    "chara_card_v3",
    "json",
    "ai_character",
    "persona",
    "character",
    "v2card",
    "izk_v2_card",
    "story_plot",
    "world_setting",
];

/// Rank of entries whose keyword is recognised
pub const RANK_RECOGNIZED: u8 = 0;

/// Rank of entries tried only because nothing was recognised
pub const RANK_FALLBACK: u8 = 1;

/// A decoded text entry queued for JSON recovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateEntry {
    pub keyword: String,
    pub text: String,
    /// Bytes `text` was decoded from, re-decoded as UTF-8 if parsing fails
    #[serde(skip)]
    pub raw_bytes: Vec<u8>,
    /// [`RANK_RECOGNIZED`] or [`RANK_FALLBACK`]
    pub priority_rank: u8,
    /// Index of the source chunk among all text chunks, in file order
    pub scan_index: usize,
}

/// Order decoded chunks for recovery.
///
/// Chunks with a recognised keyword are the only candidates if there are any;
/// otherwise every decoded chunk is. The result is in reverse file order, so
/// the chunk nearest the end of the file comes first. Exporters append the
/// authoritative card last, so this keeps existing cards importing the same
/// way. It is a heuristic, not a quality ranking.
///
/// Records without decoded text (failed decompression) are never candidates.
pub fn select_candidates(records: &[ChunkRecord], options: &ExtractOptions) -> Vec<CandidateEntry> {
    let decoded: Vec<(usize, &ChunkRecord, &str)> = records
        .iter()
        .enumerate()
        .filter_map(|(index, r)| r.decoded_text.as_deref().map(|text| (index, r, text)))
        .collect();

    let recognized: Vec<_> = decoded
        .iter()
        .filter(|(_, record, _)| options.is_recognized(&record.keyword))
        .collect();

    let (pool, rank) = if recognized.is_empty() {
        tracing::debug!("No recognised keywords; trying all {} text chunks", decoded.len());
        (decoded.iter().collect::<Vec<_>>(), RANK_FALLBACK)
    } else {
        (recognized, RANK_RECOGNIZED)
    };

    pool.into_iter()
        .rev()
        .map(|(index, record, text)| CandidateEntry {
            keyword: record.keyword.clone(),
            text: (*text).to_string(),
            raw_bytes: record
                .text_bytes
                .clone()
                .unwrap_or_else(|| text.as_bytes().to_vec()),
            priority_rank: rank,
            scan_index: *index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::TextVariant;

    fn record(keyword: &str, text: Option<&str>) -> ChunkRecord {
        ChunkRecord {
            offset: 0,
            keyword: keyword.to_string(),
            variant: TextVariant::Plain,
            raw_payload: Vec::new(),
            text_bytes: text.map(|t| t.as_bytes().to_vec()),
            decoded_text: text.map(str::to_string),
            language: None,
            translated_keyword: None,
            error: None,
        }
    }

    fn keywords(candidates: &[CandidateEntry]) -> Vec<&str> {
        candidates.iter().map(|c| c.keyword.as_str()).collect()
    }

    #[test]
    fn test_recognised_only_in_reverse_order() {
        let records = vec![
            record("Software", Some("GIMP")),
            record("chara", Some("A")),
            record("Comment", Some("hi")),
            record("CHARA_CARD_V3", Some("B")),
        ];

        let candidates = select_candidates(&records, &ExtractOptions::default());
        assert_eq!(keywords(&candidates), vec!["CHARA_CARD_V3", "chara"]);
        assert!(candidates.iter().all(|c| c.priority_rank == RANK_RECOGNIZED));
        assert_eq!(candidates[0].scan_index, 3);
    }

    #[test]
    fn test_falls_back_to_everything() {
        let records = vec![record("Software", Some("GIMP")), record("Comment", Some("{}"))];

        let candidates = select_candidates(&records, &ExtractOptions::default());
        assert_eq!(keywords(&candidates), vec!["Comment", "Software"]);
        assert!(candidates.iter().all(|c| c.priority_rank == RANK_FALLBACK));
    }

    #[test]
    fn test_undecoded_records_are_skipped() {
        let records = vec![record("chara", Some("A")), record("chara", None)];

        let candidates = select_candidates(&records, &ExtractOptions::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "A");
        assert_eq!(candidates[0].scan_index, 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(select_candidates(&[], &ExtractOptions::default()).is_empty());
    }
}
