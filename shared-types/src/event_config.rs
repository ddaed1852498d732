use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Maximum number of activities shown on the event card.
pub const MAX_ACTIVITIES: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
pub struct EventConfig {
    pub title: String,
    pub description: String,
    /// Time-of-day range, e.g. "8:00 AM - 11:00 AM"
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    pub activities: Vec<String>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            title: "Saturday Run & Coffee Club".to_string(),
            description: "A mindful Saturday morning ritual combining 5km running, specialty coffee, and productive activities".to_string(),
            time: "8:00 AM - 11:00 AM".to_string(),
            location: Some("서울 한강공원 반포지구 (반포한강공원)".to_string()),
            announcement: None,
            activities: vec![
                "🏃‍♂️ 5km morning run at 8:00 AM".to_string(),
                "☕ Specialty coffee & light refreshments".to_string(),
                "📚 Productive activities: reading, journaling, planning".to_string(),
                "💬 Meaningful conversations & positive energy exchange".to_string(),
            ],
        }
    }
}

/// A partially specified configuration, as stored or as submitted by an admin.
/// Every field left out falls back to [`EventConfig::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
pub struct EventConfigPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub announcement: Option<String>,
    #[serde(default)]
    pub activities: Option<Vec<String>>,
}

impl From<EventConfig> for EventConfigPatch {
    fn from(config: EventConfig) -> Self {
        Self {
            title: Some(config.title),
            description: Some(config.description),
            time: Some(config.time),
            location: Some(config.location.unwrap_or_default()),
            announcement: Some(config.announcement.unwrap_or_default()),
            activities: Some(config.activities),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EventConfig {
    /// Merges `patch` over the defaults field by field.
    ///
    /// Blank title, description and time keep the default. A present but
    /// blank location or announcement clears it. Activities are trimmed,
    /// blanks dropped and capped at [`MAX_ACTIVITIES`]; an empty result keeps
    /// the default list.
    pub fn resolve(patch: EventConfigPatch) -> Self {
        let defaults = Self::default();

        let location = match patch.location {
            Some(value) => non_blank(Some(value)),
            None => defaults.location,
        };
        let announcement = match patch.announcement {
            Some(value) => non_blank(Some(value)),
            None => defaults.announcement,
        };

        let activities: Vec<String> = patch
            .activities
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| non_blank(Some(a)))
            .take(MAX_ACTIVITIES)
            .collect();

        Self {
            title: non_blank(patch.title).unwrap_or(defaults.title),
            description: non_blank(patch.description).unwrap_or(defaults.description),
            time: non_blank(patch.time).unwrap_or(defaults.time),
            location,
            announcement,
            activities: if activities.is_empty() {
                defaults.activities
            } else {
                activities
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventConfigResponse {
    pub success: bool,
    pub config: Option<EventConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaveEventConfigRequest {
    #[serde(default)]
    pub admin_key: Option<String>,
    #[serde(default)]
    pub config: Option<EventConfigPatch>,
}
