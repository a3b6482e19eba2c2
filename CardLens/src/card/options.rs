//! Extraction options
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! keywords = ["chara", "ccv3"]
//! max_inflated_size = 16777216
//! decode_base64 = false
//! backends = ["bundled", "stream"]
//! ```
//!
//! Missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::select::KNOWN_KEYWORDS;
use crate::compression::{BackendKind, DEFAULT_MAX_INFLATED_SIZE, Inflater};
use crate::error::Result;

/// File name looked up under the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

fn default_keywords() -> Vec<String> {
    KNOWN_KEYWORDS.iter().map(|k| (*k).to_string()).collect()
}
fn default_max_inflated_size() -> usize {
    DEFAULT_MAX_INFLATED_SIZE
}
fn default_true() -> bool {
    true
}
fn default_backends() -> Vec<BackendKind> {
    BackendKind::DEFAULT_ORDER.to_vec()
}

/// Options controlling card extraction.
///
/// # Example
///
/// ```
/// use cardlens::card::ExtractOptions;
/// use cardlens::compression::BackendKind;
///
/// let options = ExtractOptions::new()
///     .with_decode_base64(false)
///     .with_backends(vec![BackendKind::Bundled]);
/// assert!(!options.decode_base64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Recognised keywords, compared case-insensitively
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Cap on inflated output per compressed chunk
    #[serde(default = "default_max_inflated_size")]
    pub max_inflated_size: usize,

    /// Try base64-decoding candidate text once every other recovery stage failed
    #[serde(default = "default_true")]
    pub decode_base64: bool,

    /// Inflate backends in try order
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendKind>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            max_inflated_size: default_max_inflated_size(),
            decode_base64: true,
            backends: default_backends(),
        }
    }
}

impl ExtractOptions {
    /// Create options with the default keyword set and backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML text.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConfigError`] if the TOML is invalid.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be read, or
    /// [`crate::Error::ConfigError`] if it is not valid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Default config file location (`<config dir>/cardlens/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cardlens").join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, or fall back to defaults if there is no file.
    ///
    /// # Errors
    /// Returns an error only if a config file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Replace the recognised keyword set.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the inflated size cap.
    #[must_use]
    pub fn with_max_inflated_size(mut self, size: usize) -> Self {
        self.max_inflated_size = size;
        self
    }

    /// Set whether base64 payloads are decoded.
    #[must_use]
    pub fn with_decode_base64(mut self, decode: bool) -> Self {
        self.decode_base64 = decode;
        self
    }

    /// Set the inflate backend order.
    #[must_use]
    pub fn with_backends(mut self, backends: Vec<BackendKind>) -> Self {
        self.backends = backends;
        self
    }

    /// Whether `keyword` is in the recognised set (case-insensitive).
    pub fn is_recognized(&self, keyword: &str) -> bool {
        let lower = keyword.to_lowercase();
        self.keywords.iter().any(|k| k.to_lowercase() == lower)
    }

    pub(crate) fn inflater(&self) -> Inflater {
        Inflater::new(self.backends.clone(), self.max_inflated_size)
    }
}
