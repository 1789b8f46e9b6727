use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionBackendKind {
    /// External STT engine driven over NATS
    Nats,
    /// One transcript per console line
    Stdin,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub backend: RecognitionBackendKind,
    pub nats_url: String,
    /// BCP-47 tag passed to the engine on every session start
    pub language: String,
    pub session_timeout_secs: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            backend: RecognitionBackendKind::Nats,
            nats_url: "nats://localhost:4222".to_string(),
            language: "ko-KR".to_string(),
            session_timeout_secs: 30,
        }
    }
}

impl RecognitionConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            temperature: 0.9,
            top_k: 1,
            top_p: 1.0,
            max_output_tokens: 2048,
        }
    }
}

impl AnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Pause between receiving a transcript and classifying it
    pub grace_delay_ms: u64,
    /// Keep only the newest N log entries (unbounded when absent)
    pub log_capacity: Option<usize>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            grace_delay_ms: 2000,
            log_capacity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackendKind {
    Nats,
    Log,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub backend: NotifierBackendKind,
    pub channel_id: String,
    pub title: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackendKind::Log,
            channel_id: crate::notify::DEFAULT_CHANNEL_ID.to_string(),
            title: crate::notify::DEFAULT_TITLE.to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file, then apply `VISHING_GUARD_*` environment overrides
    /// (nested keys separated by `__`, e.g. `VISHING_GUARD_ANALYSIS__API_KEY`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("VISHING_GUARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Failed to deserialize config")
    }
}
