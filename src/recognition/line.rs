use super::backend::{ErrorCode, RecognitionOutcome, RecognitionSession, Recognizer};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

/// Recognizer that treats each line of text input as one utterance.
///
/// Lines are read by a background task as soon as the recognizer is created;
/// a session takes the next line that arrives after its `start()`.
pub struct LineRecognizer {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl LineRecognizer {
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (line_tx, line_rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line_tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Line input closed");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read line input: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            lines: Arc::new(Mutex::new(line_rx)),
            cancel: None,
        }
    }

    /// Recognizer reading from the process's standard input
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait::async_trait]
impl Recognizer for LineRecognizer {
    async fn start(&mut self) -> Result<RecognitionSession> {
        let (outcome_tx, session) = RecognitionSession::channel();
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        self.cancel = Some(cancel_tx);

        let lines = Arc::clone(&self.lines);
        let session_id = session.id;

        tokio::spawn(async move {
            let mut lines = lines.lock().await;
            let outcome = tokio::select! {
                line = lines.recv() => match line {
                    Some(text) => RecognitionOutcome::Transcript(text.trim().to_string()),
                    None => RecognitionOutcome::Error(ErrorCode::CLIENT),
                },
                _ = &mut cancel_rx => RecognitionOutcome::Error(ErrorCode::NO_MATCH),
            };
            debug!("Line session {} resolved: {:?}", session_id, outcome);
            let _ = outcome_tx.send(outcome);
        });

        info!("Speak now (type a line): session {}", session.id);
        Ok(session)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(cancel) = self.cancel.take() {
            // Already resolved sessions ignore the cancel
            let _ = cancel.send(());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "line"
    }
}
