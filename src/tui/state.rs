//! Progress view state

use crate::process::RunStats;
use crate::progress::ProgressEvent;
use std::collections::VecDeque;
use std::path::PathBuf;

/// How many recent progress lines the view keeps
pub const RECENT_LIMIT: usize = 200;

/// How a run ended, as far as the view is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { stats: RunStats, dry_run: bool },
    /// The run never started (bad root) or the worker died
    Failed(String),
}

/// Everything the progress screen renders
#[derive(Debug)]
pub struct ProgressState {
    pub root: PathBuf,
    /// Operation shown in the title, e.g. "Moving"
    pub operation: &'static str,
    /// Last reported percentage in `[0, 100]`
    pub percent: f64,
    /// Per-file progress events received so far
    pub events_seen: usize,
    /// Lines that start with "Error"
    pub errors_seen: usize,
    pub recent: VecDeque<String>,
    pub outcome: Option<RunOutcome>,
    pub log_path: Option<PathBuf>,
}

impl ProgressState {
    pub fn new(root: PathBuf, operation: &'static str) -> Self {
        Self {
            root,
            operation,
            percent: 0.0,
            events_seen: 0,
            errors_seen: 0,
            recent: VecDeque::with_capacity(RECENT_LIMIT),
            outcome: None,
            log_path: None,
        }
    }

    pub fn apply(&mut self, event: ProgressEvent) {
        if let Some(percent) = event.percent {
            // Events arrive in order; never let the gauge run backwards
            self.percent = self.percent.max(percent);
        }
        // The run outcome carries the summary
        if event.is_summary() {
            return;
        }

        self.events_seen += 1;
        if event.message.starts_with("Error") {
            self.errors_seen += 1;
        }

        if self.recent.len() == RECENT_LIMIT {
            self.recent.pop_front();
        }
        self.recent.push_back(event.message);
    }

    pub fn finish(&mut self, outcome: RunOutcome) {
        if matches!(outcome, RunOutcome::Completed { .. }) {
            self.percent = 100.0;
        }
        self.outcome = Some(outcome);
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn ratio(&self) -> f64 {
        (self.percent / 100.0).clamp(0.0, 1.0)
    }
}
