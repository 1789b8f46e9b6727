pub mod analysis;
pub mod config;
pub mod controller;
pub mod http;
pub mod nats;
pub mod notify;
pub mod recognition;

pub use analysis::{AnalysisError, AnalysisOutcome, Analyzer, GeminiClient};
pub use config::Config;
pub use controller::{Controller, ControllerConfig, ControllerHandle, ControllerSnapshot, ListeningState};
pub use http::{create_router, AppState};
pub use nats::{AlertMessage, NatsClient, TranscriptMessage};
pub use notify::{AlertTemplate, LogNotifier, NatsNotifier, Notifier};
pub use recognition::{
    ErrorCode, LineRecognizer, NatsRecognizer, RecognitionOutcome, RecognitionSession, Recognizer,
    SessionId,
};
