//! Listening loop control
//!
//! This module provides the `Controller` that:
//! - Starts and stops recognition sessions on user request
//! - Waits a grace delay, then classifies each transcript
//! - Logs and notifies every analysis result
//! - Relistens only while the user still wants to listen
//!
//! Callers interact with the loop through a cloneable `ControllerHandle`.

mod config;
mod controller;
mod state;

pub use config::ControllerConfig;
pub use controller::{Controller, ControllerHandle};
pub use state::{render_log, AnalysisLog, ControllerSnapshot, ListeningState};
