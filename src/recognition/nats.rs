use super::backend::{ErrorCode, RecognitionOutcome, RecognitionSession, Recognizer, SessionId};
use crate::nats::{NatsClient, RecognitionErrorMessage, SessionAction, TranscriptMessage};
use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Recognizer backed by an external STT engine reachable over NATS.
///
/// Each session is announced on `stt.session.start`; the engine answers with
/// transcripts on `stt.text.*` or a failure on `stt.error`, tagged with the
/// session id.
pub struct NatsRecognizer {
    client: NatsClient,
    language: String,
    session_timeout: Duration,
    current: Option<SessionId>,
}

impl NatsRecognizer {
    pub fn new(client: NatsClient, language: impl Into<String>, session_timeout: Duration) -> Self {
        Self {
            client,
            language: language.into(),
            session_timeout,
            current: None,
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for NatsRecognizer {
    async fn start(&mut self) -> Result<RecognitionSession> {
        let (outcome_tx, session) = RecognitionSession::channel();
        let session_id = session.id;

        // Subscribe before announcing the session so no result can slip past
        let mut transcripts = self.client.subscribe_transcripts().await?;
        let mut errors = self.client.subscribe_errors().await?;

        self.client
            .publish_session_control(session_id, SessionAction::Start, Some(&self.language))
            .await
            .context("Failed to start recognition session")?;

        let session_timeout = self.session_timeout;

        tokio::spawn(async move {
            let outcome = await_outcome(
                session_id,
                (&mut transcripts).map(|msg| msg.payload),
                (&mut errors).map(|msg| msg.payload),
                session_timeout,
            )
            .await;

            let _ = outcome_tx.send(outcome);

            let _ = transcripts.unsubscribe().await;
            let _ = errors.unsubscribe().await;
        });

        self.current = Some(session_id);
        info!("Speak now: recognition session {} started", session_id);

        Ok(session)
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(session_id) = self.current.take() else {
            return Ok(());
        };

        self.client
            .publish_session_control(session_id, SessionAction::Stop, None)
            .await
            .context("Failed to stop recognition session")
    }

    fn name(&self) -> &str {
        "nats"
    }
}

/// Final transcript for `session_id`, if this payload is one
fn transcript_outcome(session_id: SessionId, payload: &[u8]) -> Option<RecognitionOutcome> {
    match serde_json::from_slice::<TranscriptMessage>(payload) {
        Ok(t) if t.session_id != session_id => None,
        Ok(t) if t.partial => {
            debug!("Partial transcript: {}", t.text);
            None
        }
        Ok(t) => Some(RecognitionOutcome::Transcript(t.text)),
        Err(e) => {
            warn!("Failed to parse transcript message: {}", e);
            None
        }
    }
}

/// Error outcome for `session_id`, if this payload reports one
fn error_outcome(session_id: SessionId, payload: &[u8]) -> Option<RecognitionOutcome> {
    match serde_json::from_slice::<RecognitionErrorMessage>(payload) {
        Ok(err) if err.session_id == session_id => Some(RecognitionOutcome::Error(err.code)),
        Ok(_) => None,
        Err(e) => {
            warn!("Failed to parse recognition error message: {}", e);
            None
        }
    }
}

/// Wait for the one terminal event of a session.
///
/// Resolves with the first final transcript or error tagged with
/// `session_id`, `CLIENT` once both streams close, or `SPEECH_TIMEOUT` after
/// `session_timeout`.
async fn await_outcome<T, E>(
    session_id: SessionId,
    mut transcripts: T,
    mut errors: E,
    session_timeout: Duration,
) -> RecognitionOutcome
where
    T: Stream + Unpin,
    T::Item: AsRef<[u8]>,
    E: Stream + Unpin,
    E::Item: AsRef<[u8]>,
{
    let wait = async {
        loop {
            tokio::select! {
                Some(payload) = transcripts.next() => {
                    if let Some(outcome) = transcript_outcome(session_id, payload.as_ref()) {
                        return outcome;
                    }
                }
                Some(payload) = errors.next() => {
                    if let Some(outcome) = error_outcome(session_id, payload.as_ref()) {
                        return outcome;
                    }
                }
                else => return RecognitionOutcome::Error(ErrorCode::CLIENT),
            }
        }
    };

    let outcome = match tokio::time::timeout(session_timeout, wait).await {
        Ok(outcome) => outcome,
        Err(_) => RecognitionOutcome::Error(ErrorCode::SPEECH_TIMEOUT),
    };

    if let RecognitionOutcome::Error(code) = &outcome {
        warn!("Recognition error: {}", code);
    }

    outcome
}
