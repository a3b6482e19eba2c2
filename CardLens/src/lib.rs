//! # CardLens
//!
//! A pure-Rust library for recovering character cards embedded in PNG images.
//!
//! Card exporters hide a JSON document (persona, world setting, or story plot)
//! in a PNG text chunk. CardLens finds it: it scans `tEXt`, `iTXt` and `zTXt`
//! chunks, inflates compressed ones, picks the most likely candidate, and
//! recovers the JSON even when it is wrapped in noise or a `data` envelope.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardlens::card::{CardProfile, ExtractOptions, read_card};
//!
//! match read_card("aria.png", &ExtractOptions::default())? {
//!     Some(card) => {
//!         let profile = CardProfile::from_metadata(&card, "aria.png");
//!         println!("{} ({} tags)", profile.title, profile.tags.len());
//!     }
//!     None => println!("no card in this image"),
//! }
//! # Ok::<(), cardlens::Error>(())
//! ```
//!
//! ### Telling "not a PNG" from "no card"
//!
//! ```
//! use cardlens::card::extract;
//!
//! let err = extract(b"GIF89a...").unwrap_err();
//! assert!(err.is_not_container());
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `cardlens` command-line binary

pub mod card;
pub mod compression;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use card::{CardMetadata, CardValue, ExtractOptions, extract};
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::card::{
        BatchCardResult, CardMetadata, CardProfile, CardValue, ExtractOptions, ExtractionReport,
        PlotBeats, batch_extract, extract, extract_with, find_png_files, inspect, read_card,
        require_card,
    };
    pub use crate::compression::{BackendKind, Inflater};
    pub use crate::error::{Error, Result};
    pub use crate::formats::png::embed_text_chunk;
    pub use crate::formats::{ChunkRecord, TextVariant};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
