use super::messages::{
    AlertMessage, SessionAction, SessionControlMessage, RECOGNITION_ERROR_SUBJECT,
    SESSION_START_SUBJECT, SESSION_STOP_SUBJECT, TRANSCRIPT_SUBJECT,
};
use crate::recognition::SessionId;
use anyhow::{Context, Result};
use async_nats::Client;
use tracing::{debug, info};

#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Ask the STT engine to start or stop capturing for a session
    pub async fn publish_session_control(
        &self,
        session_id: SessionId,
        action: SessionAction,
        language: Option<&str>,
    ) -> Result<()> {
        let subject = match action {
            SessionAction::Start => SESSION_START_SUBJECT,
            SessionAction::Stop => SESSION_STOP_SUBJECT,
        };

        let message = SessionControlMessage {
            session_id,
            action,
            language: language.map(str::to_string),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .context("Failed to publish session control")?;

        debug!("Published {:?} for session {} to {}", action, session_id, subject);

        Ok(())
    }

    /// Subscribe to transcript messages
    pub async fn subscribe_transcripts(&self) -> Result<async_nats::Subscriber> {
        // Partial and final results both arrive here; callers filter by
        // session_id and the partial flag in the payload
        let subscriber = self
            .client
            .subscribe(TRANSCRIPT_SUBJECT.to_string())
            .await
            .context("Failed to subscribe to transcripts")?;

        debug!("Subscribed to {}", TRANSCRIPT_SUBJECT);

        Ok(subscriber)
    }

    /// Subscribe to recognition error reports
    pub async fn subscribe_errors(&self) -> Result<async_nats::Subscriber> {
        let subscriber = self
            .client
            .subscribe(RECOGNITION_ERROR_SUBJECT.to_string())
            .await
            .context("Failed to subscribe to recognition errors")?;

        debug!("Subscribed to {}", RECOGNITION_ERROR_SUBJECT);

        Ok(subscriber)
    }

    /// Publish an alert to the given subject
    pub async fn publish_alert(&self, subject: &str, alert: &AlertMessage) -> Result<()> {
        let payload = serde_json::to_vec(alert)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .context("Failed to publish alert")?;

        Ok(())
    }
}
