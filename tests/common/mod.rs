// Scripted stand-ins for the recognizer, classifier and alert surface.
//
// Each double hands the test a probe for driving or inspecting it after the
// real object has been moved into the controller.

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use vishing_guard::{
    AnalysisOutcome, Analyzer, ControllerSnapshot, ErrorCode, Notifier, RecognitionOutcome,
    RecognitionSession, Recognizer, SessionId,
};

const WAIT_LIMIT: Duration = Duration::from_secs(60);

// ============================================================================
// Recognizer
// ============================================================================

/// Recognizer whose sessions are resolved by hand from the test
pub struct ManualRecognizer {
    sessions: mpsc::UnboundedSender<SessionProbe>,
    shared: Arc<RecognizerShared>,
}

#[derive(Default)]
struct RecognizerShared {
    active: AtomicUsize,
    max_active: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
    fail_next_start: AtomicBool,
}

/// Test-side view of a `ManualRecognizer`
pub struct RecognizerProbe {
    sessions: mpsc::UnboundedReceiver<SessionProbe>,
    shared: Arc<RecognizerShared>,
}

/// One started session, waiting for the test to resolve it
pub struct SessionProbe {
    pub id: SessionId,
    outcome: oneshot::Sender<RecognitionOutcome>,
    shared: Arc<RecognizerShared>,
}

impl ManualRecognizer {
    pub fn new() -> (Self, RecognizerProbe) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(RecognizerShared::default());
        (
            Self {
                sessions: tx,
                shared: Arc::clone(&shared),
            },
            RecognizerProbe {
                sessions: rx,
                shared,
            },
        )
    }
}

#[async_trait::async_trait]
impl Recognizer for ManualRecognizer {
    async fn start(&mut self) -> Result<RecognitionSession> {
        if self.shared.fail_next_start.swap(false, Ordering::SeqCst) {
            bail!("microphone unavailable");
        }

        let (tx, session) = RecognitionSession::channel();
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        let active = self.shared.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_active.fetch_max(active, Ordering::SeqCst);

        let _ = self.sessions.send(SessionProbe {
            id: session.id,
            outcome: tx,
            shared: Arc::clone(&self.shared),
        });

        Ok(session)
    }

    async fn stop(&mut self) -> Result<()> {
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "manual"
    }
}

impl RecognizerProbe {
    /// Wait for the controller to start the next session
    pub async fn next_session(&mut self) -> SessionProbe {
        tokio::time::timeout(WAIT_LIMIT, self.sessions.recv())
            .await
            .expect("timed out waiting for a recognition session")
            .expect("recognizer dropped")
    }

    /// Session already started, if any
    pub fn try_next_session(&mut self) -> Option<SessionProbe> {
        self.sessions.try_recv().ok()
    }

    pub fn starts(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously unresolved sessions seen
    pub fn max_active(&self) -> usize {
        self.shared.max_active.load(Ordering::SeqCst)
    }

    pub fn fail_next_start(&self) {
        self.shared.fail_next_start.store(true, Ordering::SeqCst);
    }
}

impl SessionProbe {
    pub fn transcript(self, text: &str) {
        self.resolve(RecognitionOutcome::Transcript(text.to_string()));
    }

    pub fn error(self, code: ErrorCode) {
        self.resolve(RecognitionOutcome::Error(code));
    }

    /// Drop the session without a result, as a crashed engine would
    pub fn abandon(self) {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn resolve(self, outcome: RecognitionOutcome) {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
        let _ = self.outcome.send(outcome);
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Analyzer returning a fixed outcome and recording each call
pub struct FixedAnalyzer {
    outcome: AnalysisOutcome,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl FixedAnalyzer {
    pub fn new(outcome: AnalysisOutcome) -> (Arc<Self>, Arc<Mutex<Vec<(String, Instant)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                outcome,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    pub fn verdict(text: &str) -> (Arc<Self>, Arc<Mutex<Vec<(String, Instant)>>>) {
        Self::new(AnalysisOutcome::Verdict(text.to_string()))
    }
}

#[async_trait::async_trait]
impl Analyzer for FixedAnalyzer {
    async fn analyze(&self, text: &str) -> AnalysisOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), Instant::now()));
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Notifier that records every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Wait until a snapshot satisfies `f`
pub async fn wait_for<F>(rx: &mut watch::Receiver<ControllerSnapshot>, f: F) -> ControllerSnapshot
where
    F: FnMut(&ControllerSnapshot) -> bool,
{
    tokio::time::timeout(WAIT_LIMIT, rx.wait_for(f))
        .await
        .expect("timed out waiting for controller state")
        .expect("controller stopped")
        .clone()
}

/// Let the controller and any spawned work run for a while
pub async fn settle() {
    tokio::time::sleep(Duration::from_secs(30)).await;
}
