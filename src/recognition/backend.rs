use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;

/// Opaque recognizer error code.
///
/// Values follow the platform speech recognizer numbering so that codes
/// reported by an external engine can be passed through untouched. The
/// controller only logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const NETWORK_TIMEOUT: ErrorCode = ErrorCode(1);
    pub const NETWORK: ErrorCode = ErrorCode(2);
    pub const AUDIO: ErrorCode = ErrorCode(3);
    pub const SERVER: ErrorCode = ErrorCode(4);
    pub const CLIENT: ErrorCode = ErrorCode(5);
    pub const SPEECH_TIMEOUT: ErrorCode = ErrorCode(6);
    pub const NO_MATCH: ErrorCode = ErrorCode(7);
    pub const RECOGNIZER_BUSY: ErrorCode = ErrorCode(8);
    pub const INSUFFICIENT_PERMISSIONS: ErrorCode = ErrorCode(9);

    fn describe(self) -> &'static str {
        match self.0 {
            1 => "network timeout",
            2 => "network error",
            3 => "audio recording error",
            4 => "server error",
            5 => "client error",
            6 => "no speech input",
            7 => "no recognition match",
            8 => "recognizer busy",
            9 => "insufficient permissions",
            _ => "unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.describe())
    }
}

/// Terminal event of one recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Recognized text (may be empty; the caller decides what that means)
    Transcript(String),
    /// The engine gave up
    Error(ErrorCode),
}

/// Unique identifier of a recognition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to one in-flight recognition attempt.
///
/// `outcome` resolves exactly once. A sender dropped without a value means
/// the adapter went away mid-session.
#[derive(Debug)]
pub struct RecognitionSession {
    pub id: SessionId,
    pub outcome: oneshot::Receiver<RecognitionOutcome>,
}

impl RecognitionSession {
    /// Create a session together with the sender that resolves it
    pub fn channel() -> (oneshot::Sender<RecognitionOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                id: SessionId::new(),
                outcome: rx,
            },
        )
    }
}

/// Speech recognition adapter trait
///
/// Implementations:
/// - NATS: drives an external STT engine
/// - Line: one transcript per line of text input (console, tests)
#[async_trait::async_trait]
pub trait Recognizer: Send {
    /// Start capturing speech
    ///
    /// Must not be called while a previous session is unresolved.
    async fn start(&mut self) -> Result<RecognitionSession>;

    /// Ask the current capture to finish early
    ///
    /// The session still resolves, possibly with a transcript.
    async fn stop(&mut self) -> Result<()>;

    /// Get recognizer name for logging
    fn name(&self) -> &str;
}
