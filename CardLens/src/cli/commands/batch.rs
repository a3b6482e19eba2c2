//! CLI command for batch card extraction

use std::path::Path;
use std::time::Instant;

use crate::card::{ExtractOptions, FileOutcome, batch_extract, find_png_files};
use crate::cli::progress::{DISK, LOOKING_GLASS, PICTURE, file_bar, print_done, print_step};

pub fn execute(
    source: &Path,
    destination: Option<&Path>,
    options: &ExtractOptions,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let steps = if destination.is_some() { 3 } else { 2 };

    if !quiet {
        print_step(1, steps, LOOKING_GLASS, "Finding PNG files...");
    }
    let files = find_png_files(source);
    if files.is_empty() {
        println!("No PNG files found in {}", source.display());
        return Ok(());
    }

    if !quiet {
        print_step(2, steps, PICTURE, &format!("Extracting cards from {} files...", files.len()));
    }
    let result = if quiet {
        batch_extract(&files, options, |_| {})
    } else {
        let pb = file_bar(files.len(), "Extracting");
        let result = batch_extract(&files, options, |_| pb.inc(1));
        pb.finish_and_clear();
        result
    };

    if let Some(dest) = destination {
        if !quiet {
            print_step(3, steps, DISK, "Writing card JSON...");
        }
        std::fs::create_dir_all(dest)?;
        for (path, card) in result.cards() {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "card".to_string());
            let out = dest.join(format!("{stem}.json"));
            std::fs::write(&out, serde_json::to_string_pretty(&card.to_json_value())?)?;
        }
    }

    for (path, outcome) in &result.results {
        match outcome {
            FileOutcome::Card(card) => {
                println!("card   {}  {}", path.display(), card.name().unwrap_or("<unnamed>"));
            }
            FileOutcome::NoCard => println!("empty  {}", path.display()),
            FileOutcome::Failed(e) => println!("failed {}  {e}", path.display()),
        }
    }

    println!();
    println!(
        "{} with cards, {} without, {} failed",
        result.card_count, result.empty_count, result.fail_count
    );
    if !quiet {
        print_done(started.elapsed());
    }

    Ok(())
}
