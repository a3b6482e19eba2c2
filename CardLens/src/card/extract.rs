//! The extraction pipeline: signature → scan → decode → select → recover
//!
//! Every step works on the caller's in-memory buffer and nothing is shared
//! between calls, so extractions of different files can run in parallel.

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::CardMetadata;
use super::options::ExtractOptions;
use super::recover::{RecoveryStage, recover_candidate};
use super::select::select_candidates;
use crate::error::{Error, Result};
use crate::formats::png::{ScanStop, TextVariant, decode_chunk, scan_text_chunks};

/// Summary of one text chunk for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    pub offset: usize,
    pub keyword: String,
    pub variant: TextVariant,
    /// Size of the chunk data field
    pub payload_len: usize,
    /// Length of the decoded text in bytes, if decoding worked
    pub text_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Why the chunk was dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened when a candidate was tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "stage", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// Parsed; this candidate supplied the card
    Recovered(RecoveryStage),
    /// No stage produced a JSON object
    Failed,
    /// An earlier candidate already succeeded
    NotTried,
}

/// One candidate in try order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub keyword: String,
    pub scan_index: usize,
    pub priority_rank: u8,
    pub outcome: CandidateOutcome,
}

/// Everything the pipeline saw on the way to (maybe) a card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Text chunks in file order
    pub chunks: Vec<ChunkSummary>,
    /// Non-text chunks skipped by the scanner
    pub skipped_chunks: usize,
    pub stop: ScanStop,
    /// Candidates in the order they were tried
    pub candidates: Vec<CandidateSummary>,
    pub card: Option<CardMetadata>,
}

impl ExtractionReport {
    /// The candidate that produced the card, if any.
    pub fn winner(&self) -> Option<&CandidateSummary> {
        self.candidates
            .iter()
            .find(|c| matches!(c.outcome, CandidateOutcome::Recovered(_)))
    }

    /// Chunks dropped because they could not be decompressed.
    pub fn dropped(&self) -> impl Iterator<Item = &ChunkSummary> {
        self.chunks.iter().filter(|c| c.error.is_some())
    }
}

/// Run the full pipeline and report on every step.
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] if `data` is not a PNG. Every other
/// problem (truncation, bad compressed data, unparseable text) is recorded in
/// the report instead.
pub fn inspect(data: &[u8], options: &ExtractOptions) -> Result<ExtractionReport> {
    let scan = scan_text_chunks(data)?;
    let inflater = options.inflater();

    let records: Vec<_> = scan
        .chunks
        .iter()
        .map(|raw| decode_chunk(raw, &inflater))
        .collect();

    let chunks = records
        .iter()
        .map(|r| ChunkSummary {
            offset: r.offset,
            keyword: r.keyword.clone(),
            variant: r.variant,
            payload_len: r.raw_payload.len(),
            text_len: r.decoded_text.as_ref().map(String::len),
            language: r.language.clone(),
            error: r.error.clone(),
        })
        .collect();

    let candidates = select_candidates(&records, options);
    let mut summaries = Vec::with_capacity(candidates.len());
    let mut card = None;

    for candidate in &candidates {
        let outcome = if card.is_some() {
            CandidateOutcome::NotTried
        } else if let Some((metadata, stage)) = recover_candidate(candidate, options.decode_base64) {
            tracing::debug!(
                "Recovered card from '{}' (chunk {}) via {:?}",
                candidate.keyword,
                candidate.scan_index,
                stage
            );
            card = Some(metadata);
            CandidateOutcome::Recovered(stage)
        } else {
            tracing::debug!("Candidate '{}' (chunk {}) did not parse", candidate.keyword, candidate.scan_index);
            CandidateOutcome::Failed
        };

        summaries.push(CandidateSummary {
            keyword: candidate.keyword.clone(),
            scan_index: candidate.scan_index,
            priority_rank: candidate.priority_rank,
            outcome,
        });
    }

    if card.is_none() {
        tracing::debug!("No structured data in {} candidates", candidates.len());
    }

    Ok(ExtractionReport {
        chunks,
        skipped_chunks: scan.skipped,
        stop: scan.stop,
        candidates: summaries,
        card,
    })
}

/// Extract a card using `options`.
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] if `data` is not a PNG.
pub fn extract_with(data: &[u8], options: &ExtractOptions) -> Result<Option<CardMetadata>> {
    Ok(inspect(data, options)?.card)
}

/// Extract a card with default options.
///
/// `Ok(None)` means a valid PNG without a recognisable card, the common case
/// for ordinary images.
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] if `data` is not a PNG.
///
/// # Example
///
/// ```
/// use cardlens::card::extract;
///
/// assert!(extract(b"not an image").unwrap_err().is_not_container());
/// ```
pub fn extract(data: &[u8]) -> Result<Option<CardMetadata>> {
    extract_with(data, &ExtractOptions::default())
}

/// Like [`extract`], but a missing card is an error.
///
/// # Errors
/// Returns [`Error::NotContainerFormat`] or [`Error::NoStructuredDataFound`].
pub fn require_card(data: &[u8], options: &ExtractOptions) -> Result<CardMetadata> {
    extract_with(data, options)?.ok_or(Error::NoStructuredDataFound)
}

/// Read a file and extract its card.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be read, or
/// [`Error::NotContainerFormat`] if it is not a PNG.
pub fn read_card<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Option<CardMetadata>> {
    let data = fs::read(path.as_ref())?;
    extract_with(&data, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::deflate;
    use crate::formats::png::{IEND, PNG_SIGNATURE, write_chunk};

    fn png(chunks: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        write_chunk(&mut out, *b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
        for (chunk_type, data) in chunks {
            write_chunk(&mut out, *chunk_type, data);
        }
        write_chunk(&mut out, IEND, &[]);
        out
    }

    fn text(keyword: &str, body: &str) -> ([u8; 4], Vec<u8>) {
        (*b"tEXt", format!("{keyword}\0{body}").into_bytes())
    }

    #[test]
    fn test_report_marks_winner_and_untried() {
        let data = png(&[
            text("chara", r#"{"name":"A"}"#),
            text("chara", "broken"),
            text("chara", r#"{"name":"C"}"#),
        ]);

        let report = inspect(&data, &ExtractOptions::default()).unwrap();
        let outcomes: Vec<_> = report.candidates.iter().map(|c| c.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                CandidateOutcome::Recovered(RecoveryStage::Strict),
                CandidateOutcome::NotTried,
                CandidateOutcome::NotTried,
            ]
        );
        assert_eq!(report.winner().unwrap().scan_index, 2);
        assert_eq!(report.card.unwrap().name(), Some("C"));
    }

    #[test]
    fn test_dropped_chunk_does_not_stop_extraction() {
        let mut bad = b"chara\0\x00".to_vec();
        bad.extend_from_slice(b"not zlib");
        let mut good = b"chara\0\x00".to_vec();
        good.extend(deflate(br#"{"name":"Z"}"#).unwrap());

        let data = png(&[(*b"zTXt", good), (*b"zTXt", bad)]);
        let report = inspect(&data, &ExtractOptions::default()).unwrap();

        assert_eq!(report.dropped().count(), 1);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.card.unwrap().name(), Some("Z"));
    }

    #[test]
    fn test_require_card_reports_missing_card() {
        let data = png(&[]);
        assert!(matches!(
            require_card(&data, &ExtractOptions::default()),
            Err(Error::NoStructuredDataFound)
        ));
    }

    #[test]
    fn test_custom_keywords() {
        let data = png(&[text("chara", r#"{"name":"default"}"#), text("ccv3", r#"{"name":"custom"}"#)]);
        let options = ExtractOptions::new().with_keywords(["ccv3"]);
        let card = extract_with(&data, &options).unwrap().unwrap();
        assert_eq!(card.name(), Some("custom"));
    }

    #[test]
    fn test_read_card_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aria.png");
        fs::write(&path, png(&[text("chara", r#"{"name":"Aria"}"#)])).unwrap();

        let card = read_card(&path, &ExtractOptions::default()).unwrap().unwrap();
        assert_eq!(card.name(), Some("Aria"));
    }

    #[test]
    fn test_report_serializes() {
        let data = png(&[text("chara", r#"{"name":"A"}"#)]);
        let report = inspect(&data, &ExtractOptions::default()).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["stop"]["kind"], "terminated");
        assert_eq!(value["candidates"][0]["outcome"]["result"], "recovered");
        assert_eq!(value["candidates"][0]["outcome"]["stage"], "strict");
        assert_eq!(value["chunks"][0]["variant"], "plain");
    }
}
