use crate::config::ControllerSettings;
use std::time::Duration;

/// Configuration for the listening loop
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Pause between receiving a transcript and sending it for analysis
    /// Default: 2 seconds
    pub grace_delay: Duration,

    /// Maximum number of analysis results kept for display
    /// Default: unbounded
    pub log_capacity: Option<usize>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            grace_delay: Duration::from_secs(2),
            log_capacity: None,
        }
    }
}

impl From<&ControllerSettings> for ControllerConfig {
    fn from(settings: &ControllerSettings) -> Self {
        Self {
            grace_delay: Duration::from_millis(settings.grace_delay_ms),
            log_capacity: settings.log_capacity,
        }
    }
}
