//! Application card records built from extracted metadata
//!
//! A chat front-end does not show raw card JSON; it shows a profile with a
//! title, a description, tags and so on. [`CardProfile::from_metadata`] fills
//! those in with the usual fallbacks (file name for a missing title,
//! `creator_notes` for a missing description).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CardMetadata, PlotBeats};

/// Tag added to story-plot cards
pub const STORY_PLOT_TAG: &str = "Story Plot";

/// Tag story-plot exporters put on the card itself
const STORY_PLOT_SOURCE_TAG: &str = "story_plot";

/// Name shown for cards without one
pub const UNKNOWN_NAME: &str = "Unknown";

/// A card ready to be selected in the chat UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardProfile {
    pub id: String,
    pub title: String,
    pub name: String,
    pub description: String,
    pub personality: String,
    pub first_mes: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_beats: Option<PlotBeats>,
    pub created_at: DateTime<Utc>,
    /// The full card, for anything the profile does not surface
    pub character_data: CardMetadata,
}

/// Strip a trailing `.png` (any case) from a file name.
fn title_from_file_name(file_name: &str) -> &str {
    let len = file_name.len();
    if len >= 4 && file_name.is_char_boundary(len - 4) && file_name[len - 4..].eq_ignore_ascii_case(".png") {
        &file_name[..len - 4]
    } else {
        file_name
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl CardProfile {
    /// Build a profile stamped with the current time.
    pub fn from_metadata(metadata: &CardMetadata, file_name: &str) -> Self {
        Self::from_metadata_at(metadata, file_name, Utc::now())
    }

    /// Build a profile with an explicit creation time.
    ///
    /// A card without an `id` gets the creation time in milliseconds.
    pub fn from_metadata_at(metadata: &CardMetadata, file_name: &str, now: DateTime<Utc>) -> Self {
        let name = non_empty(metadata.name());
        let field = |key: &str| non_empty(metadata.get_str(key)).unwrap_or_default().to_string();

        let plot_beats = metadata.plot_beats();
        let mut tags = metadata.tags();
        let is_story_plot = plot_beats.is_some() || tags.iter().any(|t| t == STORY_PLOT_SOURCE_TAG);
        if is_story_plot && !tags.iter().any(|t| t == STORY_PLOT_TAG) {
            tags.push(STORY_PLOT_TAG.to_string());
        }

        Self {
            id: non_empty(metadata.get_str("id"))
                .map_or_else(|| now.timestamp_millis().to_string(), str::to_string),
            title: name.unwrap_or_else(|| title_from_file_name(file_name)).to_string(),
            name: name.unwrap_or(UNKNOWN_NAME).to_string(),
            description: non_empty(metadata.description())
                .or_else(|| non_empty(metadata.get_str("creator_notes")))
                .unwrap_or_default()
                .to_string(),
            personality: field("personality"),
            first_mes: field("first_mes"),
            tags,
            plot_beats,
            created_at: now,
            character_data: metadata.clone(),
        }
    }

    /// Whether this profile was recognised as a story plot.
    pub fn is_story_plot(&self) -> bool {
        self.tags.iter().any(|t| t == STORY_PLOT_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn card(value: Value) -> CardMetadata {
        match value {
            Value::Object(map) => CardMetadata::from_json_object(map),
            _ => unreachable!(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_card() {
        let meta = card(json!({
            "id": "card-7",
            "name": "Aria",
            "description": "A bard",
            "personality": "cheerful",
            "first_mes": "Hello, traveller!",
            "tags": ["fantasy"]
        }));

        let profile = CardProfile::from_metadata_at(&meta, "aria.png", fixed_time());
        assert_eq!(profile.id, "card-7");
        assert_eq!(profile.title, "Aria");
        assert_eq!(profile.name, "Aria");
        assert_eq!(profile.description, "A bard");
        assert_eq!(profile.personality, "cheerful");
        assert_eq!(profile.first_mes, "Hello, traveller!");
        assert_eq!(profile.tags, vec!["fantasy".to_string()]);
        assert!(!profile.is_story_plot());
    }

    #[test]
    fn test_fallbacks() {
        let meta = card(json!({"creator_notes": "made by hand"}));

        let profile = CardProfile::from_metadata_at(&meta, "Mystery Guest.PNG", fixed_time());
        assert_eq!(profile.id, fixed_time().timestamp_millis().to_string());
        assert_eq!(profile.title, "Mystery Guest");
        assert_eq!(profile.name, UNKNOWN_NAME);
        assert_eq!(profile.description, "made by hand");
        assert_eq!(profile.personality, "");
        assert!(profile.tags.is_empty());
    }

    #[test]
    fn test_story_plot_from_beats() {
        let meta = card(json!({"name": "Heist", "plot_beats": {"setup": "A vault"}}));
        let profile = CardProfile::from_metadata_at(&meta, "heist.png", fixed_time());
        assert!(profile.is_story_plot());
        assert_eq!(profile.plot_beats.unwrap().setup.as_deref(), Some("A vault"));
    }

    #[test]
    fn test_story_plot_tag_added_once() {
        let meta = card(json!({"tags": ["story_plot", "Story Plot"]}));
        let profile = CardProfile::from_metadata_at(&meta, "x.png", fixed_time());
        assert_eq!(profile.tags, vec!["story_plot".to_string(), "Story Plot".to_string()]);
    }

    #[test]
    fn test_title_strip_only_png() {
        assert_eq!(title_from_file_name("card.png"), "card");
        assert_eq!(title_from_file_name("card.jpeg"), "card.jpeg");
        assert_eq!(title_from_file_name("png"), "png");
    }
}
