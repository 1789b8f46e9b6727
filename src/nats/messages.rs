use crate::recognition::{ErrorCode, SessionId};
use serde::{Deserialize, Serialize};

/// Subject the STT engine listens on for session starts
pub const SESSION_START_SUBJECT: &str = "stt.session.start";
/// Subject the STT engine listens on for early-stop requests
pub const SESSION_STOP_SUBJECT: &str = "stt.session.stop";
/// Partial and final transcripts (`stt.text.partial`, `stt.text.final`)
pub const TRANSCRIPT_SUBJECT: &str = "stt.text.>";
pub const RECOGNITION_ERROR_SUBJECT: &str = "stt.error";
pub const ALERT_SUBJECT: &str = "alerts.vishing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Start,
    Stop,
}

/// Session control message published to the STT engine
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionControlMessage {
    pub session_id: SessionId,
    pub action: SessionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub timestamp: String, // RFC3339 timestamp
}

/// Transcript message received from STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: SessionId,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Recognition failure reported by the STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognitionErrorMessage {
    pub session_id: SessionId,
    pub code: ErrorCode,
    #[serde(default)]
    pub message: Option<String>,
}

/// User-facing alert published for every analysis outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    pub channel_id: String,
    pub channel_name: String,
    pub notification_id: u32,
    pub title: String,
    pub body: String,
    pub timestamp: String,
}
