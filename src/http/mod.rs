//! HTTP API for the presentation layer
//!
//! This module exposes the listening loop to a UI:
//! - POST /listening/toggle - Start or stop listening
//! - GET /state - Full controller snapshot
//! - GET /log - Latest transcript and analysis results
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{LogResponse, ToggleResponse, SPEECH_PLACEHOLDER};
pub use routes::create_router;
pub use state::AppState;
