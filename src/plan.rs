//! Destination planning
//!
//! Computes `root/<date partition>/<category>/<file name>` for a source file
//! and picks a free name when that path is already taken.

use crate::config::{OrganizeMode, RelocationMode};
use crate::error::{Error, Result};
use crate::media::{Category, MediaFile};
use crate::time::ResolvedTime;
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Trailing ` (<n>)` counter added by earlier collision handling
static COUNTER_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn counter_suffix() -> &'static Regex {
    COUNTER_SUFFIX.get_or_init(|| Regex::new(r"^(.+) \(([0-9]+)\)$").expect("valid counter regex"))
}

/// Where one file goes, produced once and consumed once by the executor
#[derive(Debug, Clone)]
pub struct OrganizePlan {
    pub source: PathBuf,
    /// Destination after collision resolution
    pub destination: PathBuf,
    pub category: Category,
    pub time: ResolvedTime,
    /// Date partition as written in the layout, e.g. `2023/05`
    pub partition: String,
}

impl OrganizePlan {
    /// Build the plan for `file` under `root`
    ///
    /// `tree` supplies what earlier simulated relocations in the same run
    /// would have changed on disk.
    pub fn new(
        file: &MediaFile,
        time: ResolvedTime,
        root: &Path,
        mode: OrganizeMode,
        tree: &PlannedTree,
    ) -> Result<Self> {
        let canonical = plan_destination(&file.path, root, &time.timestamp, mode)?;

        // A file already sitting at its canonical place keeps it
        let destination = if canonical == file.path {
            canonical
        } else {
            resolve_collision_with(&canonical, |p| tree.is_occupied(p))
        };

        Ok(Self {
            source: file.path.clone(),
            destination,
            category: file.category,
            time,
            partition: date_partition(&time.timestamp, mode),
        })
    }

    /// Source and destination are the same file
    pub fn is_in_place(&self) -> bool {
        self.source == self.destination
    }
}

/// Paths a dry run has claimed or vacated so far
///
/// A dry run writes nothing, so without this later plans would not see the
/// destinations taken by earlier files. Real runs leave it empty and the
/// disk alone decides.
#[derive(Debug, Default)]
pub struct PlannedTree {
    claimed: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl PlannedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` would be taken at this point of the run
    pub fn is_occupied(&self, path: &Path) -> bool {
        self.claimed.contains(path) || (!self.vacated.contains(path) && path.exists())
    }

    /// Remember the effect of a simulated relocation
    pub fn record(&mut self, plan: &OrganizePlan, mode: RelocationMode) {
        if let RelocationMode::DryRun { copy } = mode {
            self.claimed.insert(plan.destination.clone());
            if !copy {
                self.vacated.insert(plan.source.clone());
            }
        }
    }
}

/// Date partition string for `mode`
pub fn date_partition(timestamp: &NaiveDateTime, mode: OrganizeMode) -> String {
    let format = match mode {
        OrganizeMode::Date => "%Y-%m-%d",
        OrganizeMode::YearMonth => "%Y/%m",
        OrganizeMode::YearMonthDay => "%Y/%m/%d",
    };
    timestamp.format(format).to_string()
}

/// Canonical destination of `source`, before collision resolution
pub fn plan_destination(
    source: &Path,
    root: &Path,
    timestamp: &NaiveDateTime,
    mode: OrganizeMode,
) -> Result<PathBuf> {
    let filename = source.file_name().ok_or_else(|| Error::InvalidFileName {
        path: source.to_path_buf(),
    })?;

    let mut dest = root.to_path_buf();
    for segment in date_partition(timestamp, mode).split('/') {
        dest.push(segment);
    }
    dest.push(Category::of_path(source).folder_name());
    dest.push(filename);

    Ok(dest)
}

/// Return `path` if it is free, otherwise the first free `<stem> (<n>)<ext>`
///
/// An existing trailing counter is stripped first so names never stack up
/// as `photo (1) (1).jpg`. Parentheses anywhere else are left alone.
pub fn resolve_collision(path: &Path) -> PathBuf {
    resolve_collision_with(path, Path::exists)
}

/// [`resolve_collision`] with a caller-supplied notion of "taken"
pub fn resolve_collision_with(path: &Path, is_occupied: impl Fn(&Path) -> bool) -> PathBuf {
    if !is_occupied(path) {
        return path.to_path_buf();
    }

    let stem = path.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    let base: OsString = match stem.to_str().and_then(|s| counter_suffix().captures(s)) {
        Some(caps) => OsString::from(&caps[1]),
        None => stem.clone(),
    };

    let extension = path
        .extension()
        .map(|e| {
            let mut ext = OsString::from(".");
            ext.push(e);
            ext
        })
        .unwrap_or_default();

    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let mut name = base.clone();
        name.push(format!(" ({})", counter));
        name.push(&extension);

        let candidate = parent.join(name);
        if !is_occupied(&candidate) {
            debug!(original = ?path, resolved = ?candidate, "Resolved filename collision");
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeSource;
    use std::fs;
    use tempfile::tempdir;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_date_partitions() {
        let t = ts("2023-05-07 18:45:00");
        assert_eq!(date_partition(&t, OrganizeMode::Date), "2023-05-07");
        assert_eq!(date_partition(&t, OrganizeMode::YearMonth), "2023/05");
        assert_eq!(date_partition(&t, OrganizeMode::YearMonthDay), "2023/05/07");
    }

    #[test]
    fn test_partitions_share_prefixes() {
        let t = ts("2023-05-07 00:00:00");
        let date = date_partition(&t, OrganizeMode::Date);
        let ym = date_partition(&t, OrganizeMode::YearMonth);
        let ymd = date_partition(&t, OrganizeMode::YearMonthDay);

        assert!(ymd.starts_with(&ym));
        assert_eq!(date.replace('-', "/"), ymd);
        assert!(date.replace('-', "/").starts_with(&ym));
    }

    #[test]
    fn test_plan_destination_layout() {
        let root = Path::new("/library");
        let t = ts("2023-05-07 12:00:00");

        assert_eq!(
            plan_destination(Path::new("/library/in/IMG_001.JPG"), root, &t, OrganizeMode::Date).unwrap(),
            PathBuf::from("/library/2023-05-07/photo/IMG_001.JPG")
        );
        assert_eq!(
            plan_destination(Path::new("/library/clip.mov"), root, &t, OrganizeMode::YearMonth).unwrap(),
            PathBuf::from("/library/2023/05/video/clip.mov")
        );
        assert_eq!(
            plan_destination(Path::new("/library/notes.txt"), root, &t, OrganizeMode::YearMonthDay)
                .unwrap(),
            PathBuf::from("/library/2023/05/07/other/notes.txt")
        );
    }

    #[test]
    fn test_plan_destination_without_file_name() {
        let t = ts("2023-05-07 12:00:00");
        let err = plan_destination(Path::new("/"), Path::new("/library"), &t, OrganizeMode::Date)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFileName { .. }));
    }

    #[test]
    fn test_no_collision_keeps_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG (draft).jpg");
        assert_eq!(resolve_collision(&path), path);
    }

    #[test]
    fn test_collision_appends_counter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        touch(&path);

        assert_eq!(resolve_collision(&path), dir.path().join("photo (1).jpg"));
    }

    #[test]
    fn test_collision_strips_existing_counter() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("photo.jpg"));
        touch(&dir.path().join("photo (1).jpg"));
        touch(&dir.path().join("photo (2).jpg"));

        assert_eq!(
            resolve_collision(&dir.path().join("photo (2).jpg")),
            dir.path().join("photo (3).jpg")
        );
    }

    #[test]
    fn test_collision_ignores_non_counter_parentheses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG (draft).jpg");
        touch(&path);

        assert_eq!(
            resolve_collision(&path),
            dir.path().join("IMG (draft) (1).jpg")
        );
    }

    #[test]
    fn test_collision_without_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README");
        touch(&path);

        assert_eq!(resolve_collision(&path), dir.path().join("README (1)"));
    }

    #[test]
    fn test_repeated_planning_never_repeats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        touch(&path);

        let first = resolve_collision(&path);
        touch(&first);
        let second = resolve_collision(&path);

        assert_ne!(first, second);
        assert_eq!(second, dir.path().join("photo (2).jpg"));
    }

    #[test]
    fn test_plan_for_file_already_in_place() {
        let dir = tempdir().unwrap();
        let t = ts("2022-01-01 10:00:00");
        let path = dir.path().join("2022-01-01").join("photo").join("a.jpg");
        touch(&path);

        let file = MediaFile::new(path.clone(), t);
        let time = ResolvedTime {
            timestamp: t,
            source: TimeSource::Exif,
        };
        let plan = OrganizePlan::new(&file, time, dir.path(), OrganizeMode::Date, &PlannedTree::new()).unwrap();

        assert!(plan.is_in_place());
        assert_eq!(plan.partition, "2022-01-01");
        assert_eq!(plan.category, Category::Photo);
    }

    #[test]
    fn test_plan_resolves_collision() {
        let dir = tempdir().unwrap();
        let t = ts("2022-01-01 10:00:00");
        touch(&dir.path().join("2022/01/photo/a.jpg"));
        let source = dir.path().join("import").join("a.jpg");
        touch(&source);

        let file = MediaFile::new(source.clone(), t);
        let time = ResolvedTime {
            timestamp: t,
            source: TimeSource::FileSystem,
        };
        let plan =
            OrganizePlan::new(&file, time, dir.path(), OrganizeMode::YearMonth, &PlannedTree::new())
                .unwrap();

        assert!(!plan.is_in_place());
        assert_eq!(plan.source, source);
        assert_eq!(plan.destination, dir.path().join("2022/01/photo/a (1).jpg"));
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_counter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo (١).jpg");
        touch(&path);

        assert_eq!(
            resolve_collision(&path),
            dir.path().join("photo (١) (1).jpg")
        );
    }

    #[test]
    fn test_planned_tree_claims_destinations() {
        let dir = tempdir().unwrap();
        let t = ts("2021-12-24 12:00:00");
        let time = ResolvedTime {
            timestamp: t,
            source: TimeSource::FileSystem,
        };
        let mut tree = PlannedTree::new();
        let dry_run = RelocationMode::DryRun { copy: false };

        let mut destinations = Vec::new();
        for cam in ["cam1", "cam2", "cam3"] {
            let source = dir.path().join(cam).join("IMG.jpg");
            touch(&source);
            let file = MediaFile::new(source, t);
            let plan = OrganizePlan::new(&file, time, dir.path(), OrganizeMode::Date, &tree).unwrap();
            tree.record(&plan, dry_run);
            destinations.push(plan.destination);
        }

        let bucket = dir.path().join("2021-12-24").join("photo");
        assert_eq!(
            destinations,
            vec![
                bucket.join("IMG.jpg"),
                bucket.join("IMG (1).jpg"),
                bucket.join("IMG (2).jpg"),
            ]
        );
        assert!(!bucket.exists());
    }

    #[test]
    fn test_planned_tree_frees_simulated_moves() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("a.jpg");
        touch(&old);
        let time = ResolvedTime {
            timestamp: ts("2022-01-01 00:00:00"),
            source: TimeSource::Exif,
        };
        let plan = OrganizePlan {
            source: old.clone(),
            destination: dir.path().join("2022-01-01/photo/a.jpg"),
            category: Category::Photo,
            time,
            partition: "2022-01-01".to_string(),
        };

        let mut copies = PlannedTree::new();
        copies.record(&plan, RelocationMode::DryRun { copy: true });
        assert!(copies.is_occupied(&old));

        let mut moves = PlannedTree::new();
        moves.record(&plan, RelocationMode::DryRun { copy: false });
        assert!(!moves.is_occupied(&old));
        assert!(moves.is_occupied(&plan.destination));

        let mut real = PlannedTree::new();
        real.record(&plan, RelocationMode::Move);
        assert!(!real.is_occupied(&plan.destination));
    }
}
