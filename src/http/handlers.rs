use super::state::AppState;
use crate::controller::ControllerSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Shown in place of the transcript until something has been recognized
pub const SPEECH_PLACEHOLDER: &str = "음성인식 결과가 여기에 표시됩니다.";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
    /// Listening state before the toggle was applied
    pub was_listening: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    /// Latest transcript, or a placeholder before the first one
    pub speech_result: String,
    pub entries: Vec<String>,
    /// Entries joined for display
    pub rendered: String,
    pub total: usize,
}

impl From<&ControllerSnapshot> for LogResponse {
    fn from(snapshot: &ControllerSnapshot) -> Self {
        let speech_result = if snapshot.speech_result.is_empty() {
            SPEECH_PLACEHOLDER.to_string()
        } else {
            snapshot.speech_result.clone()
        };

        Self {
            speech_result,
            entries: snapshot.analysis_log.clone(),
            rendered: snapshot.rendered_log(),
            total: snapshot.results_total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /listening/toggle
/// Start listening when idle, stop when listening
pub async fn toggle_listening(State(state): State<AppState>) -> impl IntoResponse {
    let was_listening = state.controller.is_listening();

    match state.controller.toggle_listening() {
        Ok(()) => {
            info!("Toggle requested (was_listening={})", was_listening);
            (
                StatusCode::ACCEPTED,
                Json(ToggleResponse {
                    status: "accepted".to_string(),
                    was_listening,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to toggle listening: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: format!("Failed to toggle listening: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /state
/// Full controller snapshot
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.controller.snapshot()))
}

/// GET /log
/// Latest transcript and accumulated analysis results
pub async fn get_log(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.controller.snapshot();
    (StatusCode::OK, Json(LogResponse::from(&snapshot)))
}

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, format!("OK {}", state.service_name))
}
