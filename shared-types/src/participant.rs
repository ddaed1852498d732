use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of trailing days a registration stays visible in list responses.
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
pub struct Participant {
    /// Opaque identifier. Records written by older clients may not carry one.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            timestamp,
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.timestamp > now - Duration::days(ACTIVE_WINDOW_DAYS)
    }
}

/// Outcome of [`register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    Refreshed,
}

/// Returns the trimmed name, or `None` when nothing is left after trimming.
pub fn normalize_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Adds `name` to the list, or refreshes the timestamp of the record whose
/// name matches case-insensitively. `name` must already be validated.
pub fn register(
    participants: &mut Vec<Participant>,
    name: &str,
    now: DateTime<Utc>,
) -> Registration {
    if let Some(existing) = participants.iter_mut().find(|p| p.matches_name(name)) {
        existing.timestamp = now;
        Registration::Refreshed
    } else {
        participants.push(Participant::new(name, now));
        Registration::Created
    }
}

/// Participants registered within the trailing window, in stored order.
pub fn active_window(participants: &[Participant], now: DateTime<Utc>) -> Vec<Participant> {
    participants
        .iter()
        .filter(|p| p.is_active(now))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterParticipantRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of the admin-only mutations on participants.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminKeyRequest {
    #[serde(default)]
    pub admin_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub participants: Vec<Participant>,
    pub count: usize,
}

impl ParticipantsResponse {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            success: true,
            message: None,
            count: participants.len(),
            participants,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
