//! TUI application main module
//!
//! Runs the organizer on a worker thread and renders its progress until the
//! user dismisses the finished view.

use crate::config::{Config, RelocationMode};
use crate::process::{Organizer, RunReport};
use crate::progress::channel;
use crate::tui::event::{EventPoll, TuiEvent};
use crate::tui::state::{ProgressState, RunOutcome};
use crate::tui::ui::render;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use tracing::{error, info};

/// TUI application
#[derive(Debug)]
pub struct TuiApp {
    pub terminal: DefaultTerminal,
    pub event_poll: EventPoll,
    pub state: ProgressState,
}

impl TuiApp {
    /// Take over the terminal
    pub fn new(config: &Config) -> std::io::Result<Self> {
        let operation = match config.relocation_mode() {
            RelocationMode::Move => "Moving",
            RelocationMode::Copy => "Copying",
            RelocationMode::DryRun { .. } => "Simulating",
        };

        Ok(Self {
            terminal: ratatui::init(),
            event_poll: EventPoll::default(),
            state: ProgressState::new(config.root_dir.clone(), operation),
        })
    }

    pub fn set_log_path(&mut self, path: PathBuf) {
        self.state.log_path = Some(path);
    }

    /// Run the organizer and show its progress
    ///
    /// Returns the report of a completed run, or `None` if the run failed
    /// before touching any file. The terminal is restored either way.
    pub fn run(mut self, organizer: Organizer) -> std::io::Result<Option<RunReport>> {
        let result = self.event_loop(organizer);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, organizer: Organizer) -> std::io::Result<Option<RunReport>> {
        let dry_run = organizer.config().dry_run;
        let (mut tx, mut rx) = channel();
        let handle = std::thread::spawn(move || organizer.run(&mut tx));

        // Each tick drains the channel and redraws; input is ignored until done
        while !rx.is_closed() {
            for event in rx.poll() {
                self.state.apply(event);
            }
            render(&mut self.terminal, &self.state)?;

            if let TuiEvent::CtrlC = self.event_poll.next() {
                info!("Interrupt ignored, the run finishes first");
            }
        }

        let report = match handle.join() {
            Ok(Ok(report)) => {
                self.state.finish(RunOutcome::Completed {
                    stats: report.stats,
                    dry_run,
                });
                Some(report)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Organize run failed");
                self.state.finish(RunOutcome::Failed(e.to_string()));
                None
            }
            Err(_) => {
                error!("Organizer thread panicked");
                self.state
                    .finish(RunOutcome::Failed("The organizer stopped unexpectedly".into()));
                None
            }
        };

        render(&mut self.terminal, &self.state)?;
        loop {
            match self.event_poll.next() {
                event if event.is_dismiss() => break,
                TuiEvent::Resize(_, _) => render(&mut self.terminal, &self.state)?,
                _ => {}
            }
        }

        Ok(report)
    }
}
