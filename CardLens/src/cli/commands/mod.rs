use clap::Subcommand;
use std::path::PathBuf;
use std::str::FromStr;

use crate::card::ExtractOptions;
use crate::formats::TextVariant;

pub mod batch;
pub mod embed;
pub mod extract;
pub mod inspect;

/// Text chunk type for `embed`
#[derive(Debug, Clone, Copy)]
pub struct VariantArg(pub TextVariant);

impl FromStr for VariantArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "text" | "textual" | "plain" => Ok(VariantArg(TextVariant::Plain)),
            "ztxt" | "compressed" | "z" => Ok(VariantArg(TextVariant::Compressed)),
            "itxt" | "international" | "utf8" | "i" => Ok(VariantArg(TextVariant::International)),
            _ => Err(format!(
                "Invalid chunk type '{s}'. Valid values: tEXt/plain, zTXt/compressed, iTXt/international"
            )),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the card embedded in a PNG as JSON
    Extract {
        /// Source PNG file
        source: PathBuf,

        /// Print the application profile (title, tags, plot beats) instead of raw card fields
        #[arg(long)]
        profile: bool,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show every text chunk and how each candidate fared
    Inspect {
        /// Source PNG file
        source: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Embed a card JSON file into a PNG
    Embed {
        /// Source PNG file
        #[arg(short, long)]
        source: PathBuf,

        /// Card JSON file
        #[arg(short, long)]
        card: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        destination: PathBuf,

        /// Chunk keyword
        #[arg(short, long, default_value = "chara")]
        keyword: String,

        /// Chunk type (text, ztxt, itxt). Default: itxt
        #[arg(long = "chunk", default_value = "itxt")]
        variant: VariantArg,
    },

    /// Extract cards from every PNG under a directory
    Batch {
        /// Directory to search
        #[arg(short, long)]
        source: PathBuf,

        /// Write one <name>.json per card here
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, options: &ExtractOptions) -> anyhow::Result<()> {
        match self {
            Commands::Extract {
                source,
                profile,
                compact,
                output,
            } => extract::execute(source, options, *profile, *compact, output.as_deref()),
            Commands::Inspect { source, json } => inspect::execute(source, options, *json),
            Commands::Embed {
                source,
                card,
                destination,
                keyword,
                variant,
            } => embed::execute(source, card, destination, keyword, variant.0, options),
            Commands::Batch {
                source,
                destination,
                quiet,
            } => batch::execute(source, destination.as_deref(), options, *quiet),
        }
    }
}
