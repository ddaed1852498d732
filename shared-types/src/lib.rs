use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod event_config;
pub mod participant;

pub use event_config::{
    EventConfig, EventConfigPatch, EventConfigResponse, SaveEventConfigRequest, MAX_ACTIVITIES,
};
pub use participant::{
    active_window, normalize_name, register, AdminKeyRequest, Participant, ParticipantsResponse,
    RegisterParticipantRequest, Registration, ACTIVE_WINDOW_DAYS,
};

/// Error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
