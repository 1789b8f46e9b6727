//! Speech recognition adapters
//!
//! A `Recognizer` runs one capture at a time and hands back a
//! `RecognitionSession` whose outcome channel resolves exactly once, with a
//! transcript or an error code.

pub mod backend;
pub mod line;
pub mod nats;

pub use backend::{ErrorCode, RecognitionOutcome, RecognitionSession, Recognizer, SessionId};
pub use line::LineRecognizer;
pub use nats::NatsRecognizer;
