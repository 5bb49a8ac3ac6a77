//! Ratatui terminal UI
//!
//! A single live progress view for `--interactive` runs.

pub mod app;
pub mod components;
pub mod event;
pub mod state;
pub mod theme;
pub mod ui;

pub use app::TuiApp;
pub use event::{EventPoll, TuiEvent};
pub use state::{ProgressState, RunOutcome};
pub use theme::{Theme, theme};
pub use ui::{draw, render};
