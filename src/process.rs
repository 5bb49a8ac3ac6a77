//! Run orchestration
//!
//! Handles the core logic of:
//! - Validating the root directory
//! - Enumerating every regular file under it, once
//! - Resolving, planning and relocating each file in turn
//! - Accounting for every file exactly once in [`RunStats`]

use crate::config::Config;
use crate::error::{Error, Result};
use crate::media::{MediaFile, is_hidden};
use crate::plan::{OrganizePlan, PlannedTree};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::relocate;
use crate::time::{ResolvedTime, resolve_timestamp};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path (if one was planned)
    pub destination: Option<PathBuf>,
    /// Resolved time information
    pub time_info: Option<ResolvedTime>,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Progress line reported for this file
    pub message: String,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// File was moved or copied
    Success,
    /// Dry run - would have been moved or copied
    DryRun,
    /// Hidden file, left in place
    SkippedHidden,
    /// Already at its destination
    AlreadyOrganized,
    /// Processing failed
    Failed,
}

impl ProcessingStatus {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ProcessingStatus::SkippedHidden | ProcessingStatus::AlreadyOrganized)
    }
}

/// Aggregate counters for one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Regular files enumerated under the root
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, status: ProcessingStatus) {
        match status {
            ProcessingStatus::Success | ProcessingStatus::DryRun => self.processed += 1,
            ProcessingStatus::SkippedHidden | ProcessingStatus::AlreadyOrganized => {
                self.skipped += 1
            }
            ProcessingStatus::Failed => self.errored += 1,
        }
    }

    /// Files that have reached a terminal disposition
    pub fn visited(&self) -> usize {
        self.processed + self.skipped + self.errored
    }

    pub fn summary(&self) -> String {
        format!(
            "Operation completed:\nFiles processed: {}\nFiles skipped: {}\nErrors encountered: {}",
            self.processed, self.skipped, self.errored
        )
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, Processed: {}, Skipped: {}, Errors: {}",
            self.total, self.processed, self.skipped, self.errored
        )
    }
}

/// Everything a completed run hands back to the shell
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStats,
    pub results: Vec<FileResult>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn failed(&self) -> impl Iterator<Item = &FileResult> {
        self.results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Failed)
    }
}

/// Organizes one directory tree in place
#[derive(Debug, Clone)]
pub struct Organizer {
    config: Config,
}

impl Organizer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline over every file under the root
    ///
    /// Fails only when the root itself is unusable; per-file problems are
    /// counted in the returned stats.
    pub fn run(&self, progress: &mut dyn ProgressSink) -> Result<RunReport> {
        let _span = span!(Level::INFO, "organize_run").entered();

        let root = self.validate_root()?;
        info!(root = %root.display(), mode = %self.config.organize_by, "Scanning directory...");

        let files = collect_files(&root)?;
        info!(count = files.len(), "Found files");

        let mut stats = RunStats::new();
        stats.total = files.len();
        let mut results = Vec::with_capacity(files.len());
        let mut tree = PlannedTree::new();

        for path in &files {
            let result = self.process_file(path, &root, &mut tree);
            stats.record(result.status);
            progress.emit(ProgressEvent::for_file(
                result.message.clone(),
                stats.visited(),
                stats.total,
            ));
            results.push(result);
        }

        info!("{}", stats);
        progress.emit(ProgressEvent::summary(stats.summary()));

        Ok(RunReport {
            stats,
            results,
            dry_run: self.config.dry_run,
        })
    }

    /// Check the root exists, is a directory and can be listed
    pub fn validate_root(&self) -> Result<PathBuf> {
        let root = &self.config.root_dir;

        let metadata = fs::metadata(root).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::RootNotFound { path: root.clone() },
            _ => Error::RootUnreadable {
                path: root.clone(),
                message: e.to_string(),
            },
        })?;
        if !metadata.is_dir() {
            return Err(Error::RootNotDirectory { path: root.clone() });
        }

        fs::read_dir(root).map_err(|e| Error::RootUnreadable {
            path: root.clone(),
            message: e.to_string(),
        })?;

        std::path::absolute(root).map_err(|e| Error::RootUnreadable {
            path: root.clone(),
            message: e.to_string(),
        })
    }

    fn process_file(&self, path: &Path, root: &Path, tree: &mut PlannedTree) -> FileResult {
        let _file_span = span!(Level::DEBUG, "process_file", ?path).entered();

        if is_hidden(path) {
            debug!(?path, "Skipping hidden file");
            return FileResult {
                source: path.to_path_buf(),
                destination: None,
                time_info: None,
                status: ProcessingStatus::SkippedHidden,
                error: None,
                message: format!("Skipped hidden file '{}'", path.display()),
            };
        }

        match self.organize_file(path, root, tree) {
            Ok(result) => result,
            Err(e) => {
                error!(?path, error = %e, "Error processing file");
                FileResult {
                    source: path.to_path_buf(),
                    destination: None,
                    time_info: None,
                    status: ProcessingStatus::Failed,
                    error: Some(e.to_string()),
                    message: format!("Error processing {}: {}", path.display(), e),
                }
            }
        }
    }

    fn organize_file(&self, path: &Path, root: &Path, tree: &mut PlannedTree) -> Result<FileResult> {
        let time = resolve_timestamp(path)?;
        let file = MediaFile::new(path.to_path_buf(), time.timestamp);
        let plan = OrganizePlan::new(&file, time, root, self.config.organize_by, tree)?;

        if plan.is_in_place() {
            debug!(?path, "File already organized");
            return Ok(FileResult {
                source: plan.source,
                destination: Some(plan.destination),
                time_info: Some(time),
                status: ProcessingStatus::AlreadyOrganized,
                error: None,
                message: format!("Already organized '{}'", path.display()),
            });
        }

        let mode = self.config.relocation_mode();
        let outcome = relocate::execute(&plan, mode)?;
        tree.record(&plan, mode);
        let status = if outcome.action.is_simulated() {
            ProcessingStatus::DryRun
        } else {
            ProcessingStatus::Success
        };

        Ok(FileResult {
            message: outcome.to_string(),
            source: outcome.source,
            destination: Some(outcome.destination),
            time_info: Some(time),
            status,
            error: None,
        })
    }
}

/// Collect every regular file under `root` in a stable order
///
/// The list is fixed before any file is touched, so files relocated during
/// the run are never visited twice.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::RootUnreadable {
                    path: root.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
