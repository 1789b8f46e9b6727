//! Fire-and-forget alert delivery
//!
//! `notify` never reports failure to the caller. Delivery problems are
//! logged and dropped so the listening loop is never interrupted.

mod log;
mod nats;

pub use self::log::LogNotifier;
pub use self::nats::NatsNotifier;

use crate::nats::AlertMessage;

pub const DEFAULT_CHANNEL_ID: &str = "VoicePhishingChannel";
pub const DEFAULT_CHANNEL_NAME: &str = "Voice Phishing Alerts";
pub const DEFAULT_TITLE: &str = "보이스피싱 분석 결과";
/// Every alert reuses one id so a newer result replaces the previous one
pub const NOTIFICATION_ID: u32 = 1;

/// Alert surface for analysis results
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);

    /// Get notifier name for logging
    fn name(&self) -> &str;
}

/// Constant alert metadata shared by every delivery
#[derive(Debug, Clone)]
pub struct AlertTemplate {
    pub channel_id: String,
    pub title: String,
}

impl Default for AlertTemplate {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AlertTemplate {
    pub fn alert(&self, body: &str) -> AlertMessage {
        AlertMessage {
            channel_id: self.channel_id.clone(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            notification_id: NOTIFICATION_ID,
            title: self.title.clone(),
            body: body.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
