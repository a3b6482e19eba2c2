//! CLI command for extracting a single card

use std::path::Path;

use crate::card::{CardProfile, ExtractOptions, read_card};

pub fn execute(
    source: &Path,
    options: &ExtractOptions,
    profile: bool,
    compact: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let card = match read_card(source, options) {
        Ok(Some(card)) => card,
        Ok(None) => anyhow::bail!("No card data found in {}", source.display()),
        Err(e) if e.is_not_container() => {
            anyhow::bail!("{} is not a valid card image (not a PNG)", source.display())
        }
        Err(e) => return Err(e.into()),
    };

    let value = if profile {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        serde_json::to_value(CardProfile::from_metadata(&card, &file_name))?
    } else {
        card.to_json_value()
    };

    let json = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Wrote card to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
