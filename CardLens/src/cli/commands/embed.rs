//! CLI command for embedding a card into a PNG

use std::path::Path;

use crate::card::{CardMetadata, ExtractOptions, require_card};
use crate::formats::TextVariant;
use crate::formats::png::embed_text_chunk;

pub fn execute(
    source: &Path,
    card: &Path,
    destination: &Path,
    keyword: &str,
    variant: TextVariant,
    options: &ExtractOptions,
) -> anyhow::Result<()> {
    let png = std::fs::read(source)?;
    let card_json = std::fs::read_to_string(card)?;

    let metadata = match CardMetadata::from_json_str(&card_json) {
        Ok(metadata) => metadata,
        Err(crate::Error::NoStructuredDataFound) => {
            anyhow::bail!("Card file {} must contain a JSON object", card.display())
        }
        Err(e) => return Err(e.into()),
    };
    let compact = serde_json::to_string(&metadata)?;

    let output = embed_text_chunk(&png, keyword, &compact, variant)?;

    if options.is_recognized(keyword) {
        let recovered = require_card(&output, options)?;
        tracing::debug!("Verified embedded card ({} fields)", recovered.len());
    } else {
        tracing::warn!("Keyword '{}' is not in the recognised set; readers may ignore it", keyword);
    }

    std::fs::write(destination, output)?;
    println!(
        "Embedded {} chunk '{}' into {}",
        variant,
        keyword,
        destination.display()
    );

    Ok(())
}
