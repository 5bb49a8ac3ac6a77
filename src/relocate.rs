//! Relocation executor
//!
//! Performs (or simulates) the move or copy a plan describes.

use crate::config::RelocationMode;
use crate::error::Result;
use crate::plan::OrganizePlan;
use filetime::FileTime;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to a planned file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Moved,
    Copied,
    WouldMove,
    WouldCopy,
}

impl Action {
    pub fn is_simulated(&self) -> bool {
        matches!(self, Action::WouldMove | Action::WouldCopy)
    }

    fn verb(&self) -> &'static str {
        match self {
            Action::Moved => "Moved",
            Action::Copied => "Copied",
            Action::WouldMove => "Would move",
            Action::WouldCopy => "Would copy",
        }
    }
}

/// Result of executing one plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub action: Action,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' to '{}'",
            self.action.verb(),
            self.source.display(),
            self.destination.display()
        )
    }
}

/// Execute `plan` according to `mode`
///
/// A dry run touches nothing, not even destination directories.
pub fn execute(plan: &OrganizePlan, mode: RelocationMode) -> Result<Outcome> {
    let source = &plan.source;
    let dest = &plan.destination;

    let action = match mode {
        RelocationMode::DryRun { copy } => {
            if copy {
                Action::WouldCopy
            } else {
                Action::WouldMove
            }
        }
        RelocationMode::Copy => {
            ensure_parent(dest)?;
            copy_file(source, dest)?;
            Action::Copied
        }
        RelocationMode::Move => {
            ensure_parent(dest)?;
            move_file(source, dest)?;
            Action::Moved
        }
    };

    let outcome = Outcome {
        action,
        source: source.clone(),
        destination: dest.clone(),
    };
    info!(source = ?source, destination = ?dest, time_source = ?plan.time.source, "{}", outcome.action.verb());

    Ok(outcome)
}

fn ensure_parent(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Rename, falling back to copy + delete across filesystems
///
/// If the source cannot be deleted after copying, the copy is removed so
/// the file still exists in exactly one place.
fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if let Err(e) = fs::rename(source, dest) {
        debug!(?source, error = %e, "Rename failed, copying instead");
        copy_file(source, dest)?;
        if let Err(e) = fs::remove_file(source) {
            if let Err(cleanup) = fs::remove_file(dest) {
                warn!(destination = ?dest, error = %cleanup, "Could not remove copy after failed move");
            }
            return Err(e.into());
        }
    }
    Ok(())
}

/// Copy contents and permissions, then carry over access and modification times
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest)?;

    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Category;
    use crate::time::{ResolvedTime, TimeSource};
    use chrono::NaiveDateTime;
    use tempfile::tempdir;

    fn plan(source: PathBuf, destination: PathBuf) -> OrganizePlan {
        OrganizePlan {
            source,
            destination,
            category: Category::Photo,
            time: ResolvedTime {
                timestamp: NaiveDateTime::parse_from_str("2022-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
                source: TimeSource::Exif,
            },
            partition: "2022-01-01".to_string(),
        }
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg").unwrap();
        let dest = dir.path().join("2022-01-01/photo/a.jpg");

        let outcome = execute(&plan(source.clone(), dest.clone()), RelocationMode::DryRun { copy: false })
            .unwrap();

        assert_eq!(outcome.action, Action::WouldMove);
        assert!(outcome.action.is_simulated());
        assert!(source.exists());
        assert!(!dir.path().join("2022-01-01").exists());
        assert_eq!(
            outcome.to_string(),
            format!("Would move '{}' to '{}'", source.display(), dest.display())
        );
    }

    #[test]
    fn test_dry_run_copy_wording() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg").unwrap();

        let outcome = execute(
            &plan(source, dir.path().join("x/a.jpg")),
            RelocationMode::DryRun { copy: true },
        )
        .unwrap();
        assert_eq!(outcome.action, Action::WouldCopy);
        assert!(outcome.to_string().starts_with("Would copy"));
    }

    #[test]
    fn test_move_creates_directories() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let dest = dir.path().join("2022/01/01/photo/a.jpg");

        let outcome = execute(&plan(source.clone(), dest.clone()), RelocationMode::Move).unwrap();

        assert_eq!(outcome.action, Action::Moved);
        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_copy_preserves_source_and_mtime() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("b.mp4");
        fs::write(&source, b"video").unwrap();
        let mtime = FileTime::from_unix_time(1_655_294_400, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();
        let dest = dir.path().join("2022-06-15/video/b.mp4");

        let outcome = execute(&plan(source.clone(), dest.clone()), RelocationMode::Copy).unwrap();

        assert_eq!(outcome.action, Action::Copied);
        assert!(source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"video");
        let copied = fs::metadata(&dest).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), mtime);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_move_leaves_no_duplicate() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let source = locked.join("a.jpg");
        fs::write(&source, b"jpeg").unwrap();
        let dest = dir.path().join("2022-01-01/photo/a.jpg");

        // Read-only directory: rename and delete fail, reading still works
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(locked.join("writable"), b"").is_ok() {
            // Running as root; permissions are not enforced
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = execute(&plan(source.clone(), dest.clone()), RelocationMode::Move);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(result.is_err());
        assert!(source.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempdir().unwrap();
        let result = execute(
            &plan(dir.path().join("gone.jpg"), dir.path().join("out/gone.jpg")),
            RelocationMode::Copy,
        );
        assert!(result.is_err());
    }
}
