use super::config::ControllerConfig;
use super::state::{AnalysisLog, ControllerSnapshot, ListeningState};
use crate::analysis::{AnalysisOutcome, Analyzer};
use crate::notify::Notifier;
use crate::recognition::{ErrorCode, RecognitionOutcome, RecognitionSession, Recognizer, SessionId};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

enum Command {
    Toggle,
    Shutdown,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct AnalysisFinished {
    session_id: SessionId,
    outcome: AnalysisOutcome,
}

/// Cloneable handle to a running listening loop
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ControllerSnapshot>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ControllerHandle {
    /// Flip between listening and idle (the start/stop button)
    pub fn toggle_listening(&self) -> Result<()> {
        self.commands
            .send(Command::Toggle)
            .map_err(|_| anyhow!("Listening controller is not running"))
    }

    /// Current observable state
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_listening(&self) -> bool {
        self.snapshots.borrow().is_listening
    }

    /// Stop any active session and wait for the loop to exit
    pub async fn shutdown(&self) -> Result<()> {
        // The loop may already be gone; joining below still applies
        let _ = self.commands.send(Command::Shutdown);

        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.await.context("Listening controller task panicked")?;
        }

        Ok(())
    }
}

/// The listen, analyze, notify loop.
///
/// A single task owns all state. User commands, the active session's
/// outcome, and finished analyses are the only inputs, and they are handled
/// one at a time.
pub struct Controller {
    config: ControllerConfig,
    recognizer: Box<dyn Recognizer>,
    analyzer: Arc<dyn Analyzer>,
    notifier: Arc<dyn Notifier>,

    state: ListeningState,
    active_session: Option<RecognitionSession>,
    // Listening was turned back on before the stopped session resolved
    start_deferred: bool,
    speech_result: String,
    log: AnalysisLog,
    sessions_started: usize,
    analyses_in_flight: usize,

    commands: mpsc::UnboundedReceiver<Command>,
    analysis_tx: mpsc::UnboundedSender<AnalysisFinished>,
    analysis_rx: mpsc::UnboundedReceiver<AnalysisFinished>,
    snapshots: watch::Sender<ControllerSnapshot>,
}

impl Controller {
    /// Start the loop on the current tokio runtime, initially idle
    pub fn spawn(
        config: ControllerConfig,
        recognizer: Box<dyn Recognizer>,
        analyzer: Arc<dyn Analyzer>,
        notifier: Arc<dyn Notifier>,
    ) -> ControllerHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (analysis_tx, analysis_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ControllerSnapshot::default());

        info!(
            "Creating listening controller (recognizer={}, analyzer={}, notifier={}, grace_delay={:?})",
            recognizer.name(),
            analyzer.name(),
            notifier.name(),
            config.grace_delay
        );

        let controller = Self {
            log: AnalysisLog::new(config.log_capacity),
            config,
            recognizer,
            analyzer,
            notifier,
            state: ListeningState::Idle,
            active_session: None,
            start_deferred: false,
            speech_result: String::new(),
            sessions_started: 0,
            analyses_in_flight: 0,
            commands: command_rx,
            analysis_tx,
            analysis_rx,
            snapshots: snapshot_tx,
        };

        let task = tokio::spawn(controller.run());

        ControllerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn run(mut self) {
        info!("Listening controller started");

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let flow = match command {
                        Some(command) => self.handle_commands(command).await,
                        // Every handle dropped
                        None => Flow::Stop,
                    };
                    if flow == Flow::Stop {
                        break;
                    }
                }
                (session_id, outcome) = wait_for_outcome(&mut self.active_session) => {
                    self.handle_session_ended(session_id, outcome);
                }
                Some(finished) = self.analysis_rx.recv() => {
                    self.handle_analysis_finished(finished).await;
                }
            }
        }

        self.stop_listening().await;
        info!("Listening controller stopped");
    }

    /// Handle a command plus everything queued behind it.
    ///
    /// Toggles that arrive together cancel out in pairs, so a quick
    /// on-then-off never reaches the recognizer.
    async fn handle_commands(&mut self, first: Command) -> Flow {
        let mut toggles = 0usize;
        let mut flow = Flow::Continue;
        let mut next = Some(first);

        while let Some(command) = next {
            match command {
                Command::Toggle => toggles += 1,
                Command::Shutdown => {
                    flow = Flow::Stop;
                    break;
                }
            }
            next = self.commands.try_recv().ok();
        }

        if toggles % 2 == 1 {
            self.toggle().await;
        } else if toggles > 0 {
            debug!("{} queued toggles cancel out", toggles);
        }

        flow
    }

    /// Turning listening back on while a stopped session is still pending
    /// waits for that session. If it resolves with an error (as a cancelled
    /// console read always does), listening ends idle and must be toggled
    /// again.
    async fn toggle(&mut self) {
        match self.state {
            ListeningState::Idle => {
                info!("Listening started");
                self.state = ListeningState::Listening;
                if let Some(id) = self.active_session_id() {
                    // The stopped session still owes us its result; relisten after it
                    debug!("Deferring start until session {} resolves", id);
                    self.start_deferred = true;
                } else {
                    self.start_session().await;
                }
            }
            ListeningState::Listening => {
                self.stop_listening().await;
            }
        }

        self.publish();
    }

    /// Go idle. An in-flight analysis keeps running; only the relisten is suppressed.
    async fn stop_listening(&mut self) {
        if self.state.is_listening() {
            info!("Listening stopped");
        }
        self.state = ListeningState::Idle;
        self.start_deferred = false;

        if let Some(id) = self.active_session_id() {
            debug!("Stopping session {}", id);
            if let Err(e) = self.recognizer.stop().await {
                warn!("Failed to stop recognition session: {:#}", e);
            }
        }

        self.publish();
    }

    async fn start_session(&mut self) {
        debug_assert!(self.active_session.is_none());

        match self.recognizer.start().await {
            Ok(session) => {
                info!("Recognition session {} started", session.id);
                self.sessions_started += 1;
                self.active_session = Some(session);
            }
            Err(e) => {
                error!("Failed to start recognition: {:#}", e);
                self.state = ListeningState::Idle;
            }
        }
    }

    fn handle_session_ended(&mut self, session_id: SessionId, outcome: RecognitionOutcome) {
        self.active_session = None;
        let start_deferred = std::mem::take(&mut self.start_deferred);

        match outcome {
            RecognitionOutcome::Transcript(text) if !text.trim().is_empty() => {
                info!("Speech recognized (session {}): {}", session_id, text);
                self.speech_result = text.clone();
                self.spawn_analysis(session_id, text);
            }
            RecognitionOutcome::Transcript(_) => {
                warn!("Session {} produced no speech; going idle", session_id);
                self.go_idle_after_failure(start_deferred);
            }
            RecognitionOutcome::Error(code) => {
                warn!("Recognition error {} (session {}); going idle", code, session_id);
                self.go_idle_after_failure(start_deferred);
            }
        }

        self.publish();
    }

    fn go_idle_after_failure(&mut self, start_deferred: bool) {
        if start_deferred && self.state.is_listening() {
            info!("Stopped session ended without speech; listening did not restart, toggle again");
        }
        self.state = ListeningState::Idle;
    }

    fn spawn_analysis(&mut self, session_id: SessionId, text: String) {
        let analyzer = Arc::clone(&self.analyzer);
        let done = self.analysis_tx.clone();
        let grace_delay = self.config.grace_delay;

        self.analyses_in_flight += 1;

        tokio::spawn(async move {
            tokio::time::sleep(grace_delay).await;
            let outcome = analyzer.analyze(&text).await;
            // Only fails once the controller is gone
            let _ = done.send(AnalysisFinished {
                session_id,
                outcome,
            });
        });
    }

    async fn handle_analysis_finished(&mut self, finished: AnalysisFinished) {
        self.analyses_in_flight = self.analyses_in_flight.saturating_sub(1);

        if finished.outcome.is_failure() {
            warn!("Analysis failed for session {}", finished.session_id);
        } else {
            info!("Analysis complete for session {}", finished.session_id);
        }

        let message = finished.outcome.into_message();
        self.log.push(message.clone());
        self.notifier.notify(&message);

        // Checked now, not when the transcript arrived: the user may have
        // stopped (or restarted) listening in the meantime
        if self.state.is_listening() && self.active_session.is_none() {
            self.start_session().await;
        }

        self.publish();
    }

    fn active_session_id(&self) -> Option<SessionId> {
        self.active_session.as_ref().map(|session| session.id)
    }

    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            is_listening: self.state.is_listening(),
            speech_result: self.speech_result.clone(),
            analysis_log: self.log.entries().cloned().collect(),
            results_total: self.log.total(),
            session_active: self.active_session.is_some(),
            sessions_started: self.sessions_started,
            analyses_in_flight: self.analyses_in_flight,
            updated_at: Utc::now(),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

/// Resolve with the active session's outcome, or never when there is none.
async fn wait_for_outcome(
    active: &mut Option<RecognitionSession>,
) -> (SessionId, RecognitionOutcome) {
    match active {
        Some(session) => {
            let outcome = (&mut session.outcome)
                .await
                .unwrap_or(RecognitionOutcome::Error(ErrorCode::CLIENT));
            (session.id, outcome)
        }
        None => std::future::pending().await,
    }
}
