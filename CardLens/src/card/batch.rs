//! Batch card extraction
//!
//! Finds PNG files under a directory and extracts their cards in parallel.
//! Each extraction is independent, so no coordination is needed beyond the
//! result counters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::CardMetadata;
use super::extract::read_card;
use super::options::ExtractOptions;
use crate::error::Error;

/// Progress for one file of a batch
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Files started so far (1-based)
    pub current: usize,
    pub total: usize,
    pub path: PathBuf,
}

/// Outcome of extracting one file in a batch
#[derive(Debug)]
pub enum FileOutcome {
    /// The file carried a card
    Card(CardMetadata),
    /// A valid PNG with no card
    NoCard,
    /// Not a PNG, unreadable, etc.
    Failed(Error),
}

/// Result of a batch extraction
#[derive(Debug)]
pub struct BatchCardResult {
    /// Files that yielded a card
    pub card_count: usize,
    /// Valid PNGs without a card
    pub empty_count: usize,
    /// Files that could not be processed
    pub fail_count: usize,
    /// Per-file outcomes, in input order
    pub results: Vec<(PathBuf, FileOutcome)>,
}

impl BatchCardResult {
    /// Iterate over the files that yielded a card.
    pub fn cards(&self) -> impl Iterator<Item = (&Path, &CardMetadata)> {
        self.results.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Card(card) => Some((path.as_path(), card)),
            _ => None,
        })
    }
}

/// Find all .png files in a directory recursively
///
/// # Returns
/// A sorted list of paths to .png files found in the directory tree.
pub fn find_png_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut png_files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    png_files.sort();
    png_files
}

/// Extract cards from many files in parallel
///
/// # Arguments
/// * `files` - PNG files to process
/// * `options` - Extraction options shared by every file
/// * `progress` - Callback invoked as each file starts
pub fn batch_extract<F>(files: &[PathBuf], options: &ExtractOptions, progress: F) -> BatchCardResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let card_counter = AtomicUsize::new(0);
    let empty_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<(PathBuf, FileOutcome)> = files
        .par_iter()
        .map(|path| {
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                path: path.clone(),
            });

            let outcome = match read_card(path, options) {
                Ok(Some(card)) => {
                    card_counter.fetch_add(1, Ordering::SeqCst);
                    FileOutcome::Card(card)
                }
                Ok(None) => {
                    empty_counter.fetch_add(1, Ordering::SeqCst);
                    FileOutcome::NoCard
                }
                Err(e) => {
                    tracing::warn!("Failed {}: {}", path.display(), e);
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    FileOutcome::Failed(e)
                }
            };
            (path.clone(), outcome)
        })
        .collect();

    BatchCardResult {
        card_count: card_counter.load(Ordering::SeqCst),
        empty_count: empty_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    }
}
