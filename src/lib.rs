//! Media Organizer - sort a directory of photos and videos by date
//!
//! Every file under a root directory is relocated to
//! `root/<date partition>/<category>/<file name>`, where the date comes from:
//! - EXIF `DateTimeOriginal` for images
//! - Container metadata (`mvhd`, then ffprobe) for videos
//! - The file system modification time otherwise
//!
//! Files can be moved, copied, or the whole run simulated as a dry run.
//! Progress is reported per file through a [`ProgressSink`].

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod plan;
pub mod process;
pub mod progress;
pub mod relocate;
pub mod time;
pub mod tui;

pub use cli::Cli;
pub use config::{Config, ConfigError, OrganizeMode, RelocationMode};
pub use error::{Error, Result};
pub use media::{Category, MediaFile};
pub use plan::{OrganizePlan, PlannedTree, resolve_collision};
pub use process::{Organizer, RunReport, RunStats};
pub use progress::{ProgressEvent, ProgressKind, ProgressReceiver, ProgressSender, ProgressSink, channel};
pub use time::{ResolvedTime, TimeSource, resolve_timestamp};
pub use tui::TuiApp;
