use crate::controller::ControllerHandle;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The listening loop driven by this API
    pub controller: ControllerHandle,

    /// Reported by the health check
    pub service_name: String,
}

impl AppState {
    pub fn new(controller: ControllerHandle, service_name: impl Into<String>) -> Self {
        Self {
            controller,
            service_name: service_name.into(),
        }
    }
}
