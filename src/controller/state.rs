use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

impl ListeningState {
    pub fn is_listening(self) -> bool {
        self == ListeningState::Listening
    }
}

/// Analysis results in arrival order.
///
/// Append-only. With a capacity set, the oldest entries are evicted once
/// full; `total` keeps counting every append.
#[derive(Debug, Clone, Default)]
pub struct AnalysisLog {
    entries: VecDeque<String>,
    capacity: Option<usize>,
    total: usize,
}

impl AnalysisLog {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.filter(|c| *c > 0),
            total: 0,
        }
    }

    pub fn push(&mut self, entry: String) {
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(entry);
        self.total += 1;
    }

    pub fn entries(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries ever appended, including evicted ones
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn render(&self) -> String {
        render_log(self.entries.iter())
    }
}

/// Concatenate log entries for display, each on its own line
pub fn render_log<'a>(entries: impl IntoIterator<Item = &'a String>) -> String {
    entries.into_iter().fold(String::new(), |mut out, entry| {
        out.push('\n');
        out.push_str(entry);
        out
    })
}

/// Observable controller state for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub state: ListeningState,

    pub is_listening: bool,

    /// Most recent non-empty transcript
    pub speech_result: String,

    /// Retained analysis results, oldest first
    pub analysis_log: Vec<String>,

    /// Number of analysis results ever produced
    pub results_total: usize,

    /// Whether a recognition session is awaiting its result
    pub session_active: bool,

    pub sessions_started: usize,

    /// Transcripts waiting out the grace delay or being classified
    pub analyses_in_flight: usize,

    pub updated_at: DateTime<Utc>,
}

impl ControllerSnapshot {
    pub fn rendered_log(&self) -> String {
        render_log(self.analysis_log.iter())
    }
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self {
            state: ListeningState::Idle,
            is_listening: false,
            speech_result: String::new(),
            analysis_log: Vec::new(),
            results_total: 0,
            session_active: false,
            sessions_started: 0,
            analyses_in_flight: 0,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_append_only_and_ordered() {
        let mut log = AnalysisLog::new(None);
        log.push("first".to_string());
        log.push("second".to_string());

        let entries: Vec<_> = log.entries().cloned().collect();
        assert_eq!(entries, vec!["first", "second"]);
        assert_eq!(log.total(), 2);
        assert_eq!(log.render(), "\nfirst\nsecond");
    }

    #[test]
    fn test_bounded_log_evicts_oldest() {
        let mut log = AnalysisLog::new(Some(2));
        for entry in ["a", "b", "c"] {
            log.push(entry.to_string());
        }

        let entries: Vec<_> = log.entries().cloned().collect();
        assert_eq!(entries, vec!["b", "c"]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.total(), 3);
    }

    #[test]
    fn test_zero_capacity_means_unbounded() {
        let mut log = AnalysisLog::new(Some(0));
        log.push("kept".to_string());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_empty_log_renders_empty() {
        let log = AnalysisLog::new(None);
        assert!(log.is_empty());
        assert_eq!(log.render(), "");
    }
}
