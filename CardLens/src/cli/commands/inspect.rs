//! CLI command for inspecting a PNG's text chunks

use std::path::Path;

use crate::card::{CandidateOutcome, ExtractOptions, ExtractionReport, inspect};
use crate::formats::png::ScanStop;

/// Format byte size for human-readable output
fn format_size(bytes: usize) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}

pub fn execute(source: &Path, options: &ExtractOptions, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read(source)?;
    let report = inspect(&data, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(source, &report);
    }

    Ok(())
}

fn print_report(source: &Path, report: &ExtractionReport) {
    println!("PNG: {}", source.display());
    println!(
        "Text chunks: {} (other chunks skipped: {})",
        report.chunks.len(),
        report.skipped_chunks
    );
    match report.stop.as_error() {
        Some(truncation) => println!("Scan: stopped early, {truncation}"),
        None if report.stop == ScanStop::Terminated => println!("Scan: reached IEND"),
        None => println!("Scan: ran out of data before IEND"),
    }
    println!();

    for (index, chunk) in report.chunks.iter().enumerate() {
        let status = match (&chunk.error, chunk.text_len) {
            (Some(e), _) => format!("dropped: {e}"),
            (None, Some(len)) => format!("{} text", format_size(len)),
            (None, None) => "no text".to_string(),
        };
        println!(
            "  #{index:<3} {:<5} {:<20} {:>8}  {status}",
            chunk.variant.tag(),
            chunk.keyword,
            format_size(chunk.payload_len)
        );
    }

    if !report.candidates.is_empty() {
        println!();
        println!("Candidates (in try order):");
        for candidate in &report.candidates {
            let outcome = match candidate.outcome {
                CandidateOutcome::Recovered(stage) => format!("recovered ({stage:?})"),
                CandidateOutcome::Failed => "no JSON object".to_string(),
                CandidateOutcome::NotTried => "not tried".to_string(),
            };
            println!("  #{:<3} {:<20} {outcome}", candidate.scan_index, candidate.keyword);
        }
    }

    println!();
    match (&report.card, report.winner()) {
        (Some(card), Some(winner)) => println!(
            "Card: {} ({} fields, from chunk #{} '{}')",
            card.name().unwrap_or("<unnamed>"),
            card.len(),
            winner.scan_index,
            winner.keyword
        ),
        _ => println!("Card: none found"),
    }
}
