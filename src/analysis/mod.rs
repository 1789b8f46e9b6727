//! Transcript classification
//!
//! The `Analyzer` trait is the seam to the external classifier; `GeminiClient`
//! is the production implementation.

pub mod client;
pub mod error;
pub mod gemini;

pub use client::{build_prompt, AnalysisOutcome, Analyzer, EMPTY_RESULT_MESSAGE};
pub use error::AnalysisError;
pub use gemini::GeminiClient;
