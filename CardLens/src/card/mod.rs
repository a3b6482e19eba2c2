//! Character card recovery
//!
//! Turns decoded text chunks into a [`CardMetadata`]: candidates are selected
//! by keyword ([`select`]), then parsed with a strict-then-tolerant JSON
//! recoverer ([`recover`]). [`extract`] wires the whole pipeline together.

pub mod batch;
pub mod extract;
pub mod options;
pub mod profile;
pub mod recover;
pub mod select;

pub use batch::{BatchCardResult, BatchProgress, FileOutcome, batch_extract, find_png_files};
pub use extract::{
    CandidateOutcome, CandidateSummary, ChunkSummary, ExtractionReport, extract, extract_with,
    inspect, read_card, require_card,
};
pub use options::ExtractOptions;
pub use profile::CardProfile;
pub use recover::RecoveryStage;
pub use select::{CandidateEntry, KNOWN_KEYWORDS};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A single value in a card's open field mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<CardValue>),
    Object(IndexMap<String, CardValue>),
}

impl CardValue {
    /// The string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CardValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The nested mapping, if this is an object
    pub fn as_object(&self) -> Option<&IndexMap<String, CardValue>> {
        match self {
            CardValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The elements, if this is an array
    pub fn as_array(&self) -> Option<&[CardValue]> {
        match self {
            CardValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Value> for CardValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CardValue::Null,
            Value::Bool(b) => CardValue::Bool(b),
            Value::Number(n) => CardValue::Number(n),
            Value::String(s) => CardValue::String(s),
            Value::Array(items) => CardValue::Array(items.into_iter().map(CardValue::from).collect()),
            Value::Object(map) => CardValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, CardValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<CardValue> for Value {
    fn from(value: CardValue) -> Self {
        match value {
            CardValue::Null => Value::Null,
            CardValue::Bool(b) => Value::Bool(b),
            CardValue::Number(n) => Value::Number(n),
            CardValue::String(s) => Value::String(s),
            CardValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            CardValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Story plot beats carried by story-plot cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotBeats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl PlotBeats {
    fn from_map(map: &IndexMap<String, CardValue>) -> Self {
        let beat = |key: &str| map.get(key).and_then(CardValue::as_str).map(str::to_string);
        Self {
            setup: beat("setup"),
            conflict: beat("conflict"),
            twist: beat("twist"),
            climax: beat("climax"),
            resolution: beat("resolution"),
        }
    }
}

/// A recovered card: an open mapping from field name to value.
///
/// Field order from the source JSON is preserved. Well-known fields have typed
/// accessors; everything else (vendor extensions included) is reachable via
/// [`CardMetadata::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardMetadata {
    fields: IndexMap<String, CardValue>,
}

impl CardMetadata {
    /// Build a card from a parsed JSON object.
    pub fn from_json_object(object: serde_json::Map<String, Value>) -> Self {
        Self {
            fields: object
                .into_iter()
                .map(|(k, v)| (k, CardValue::from(v)))
                .collect(),
        }
    }

    /// Parse a card from JSON text that must be a single object.
    ///
    /// No recovery is attempted; this is for card files written by hand or by
    /// an exporter, not for text pulled out of an image.
    ///
    /// # Errors
    /// Returns [`Error::JsonError`] if the text is not valid JSON, or
    /// [`Error::NoStructuredDataFound`] if it is valid JSON but not an object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self::from_json_object(map)),
            _ => Err(Error::NoStructuredDataFound),
        }
    }

    /// Convert back into a JSON value.
    pub fn to_json_value(&self) -> Value {
        Value::from(CardValue::Object(self.fields.clone()))
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&CardValue> {
        self.fields.get(key)
    }

    /// Look up a string field by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(CardValue::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    /// String entries of the `tags` array; non-string entries are ignored.
    pub fn tags(&self) -> Vec<String> {
        self.get("tags")
            .and_then(CardValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(CardValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `plot_beats` sub-mapping, if present and an object.
    pub fn plot_beats(&self) -> Option<PlotBeats> {
        self.get("plot_beats")
            .and_then(CardValue::as_object)
            .map(PlotBeats::from_map)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CardValue)> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a CardMetadata {
    type Item = (&'a String, &'a CardValue);
    type IntoIter = indexmap::map::Iter<'a, String, CardValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
