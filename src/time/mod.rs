//! Timestamp resolution
//!
//! Produces a best-effort creation time for any file, in strict order:
//! - EXIF `DateTimeOriginal` for photos
//! - Container creation time for videos
//! - File system modification time
//!
//! Metadata failures are logged and never returned. Only the final
//! modification time lookup can fail, and only on real I/O errors.

pub mod datetime;
pub mod exif;
pub mod mp4;
pub mod video;

use crate::error::Result;
use crate::media::Category;
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Source of the resolved timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Extracted from EXIF metadata
    Exif,
    /// Extracted from video container metadata
    VideoMetadata,
    /// From file system modification time
    FileSystem,
}

/// Result of timestamp resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    /// Local wall-clock timestamp
    pub timestamp: NaiveDateTime,
    /// Source of the timestamp
    pub source: TimeSource,
}

/// Resolve the effective creation time of `path`
pub fn resolve_timestamp(path: &Path) -> Result<ResolvedTime> {
    match Category::of_path(path) {
        Category::Photo => match exif::extract_exif_time(path) {
            Ok(timestamp) => {
                debug!(?path, "Extracted time from EXIF");
                return Ok(ResolvedTime {
                    timestamp,
                    source: TimeSource::Exif,
                });
            }
            Err(e) => warn!(?path, error = %e, "Could not read EXIF data"),
        },
        Category::Video => match video::extract_video_time(path) {
            Ok(timestamp) => {
                debug!(?path, "Extracted time from video metadata");
                return Ok(ResolvedTime {
                    timestamp,
                    source: TimeSource::VideoMetadata,
                });
            }
            Err(e) => warn!(?path, error = %e, "Could not read video metadata"),
        },
        Category::Other => {}
    }

    let modified = fs::metadata(path)?.modified()?;
    debug!(?path, "Using file system modification time");

    Ok(ResolvedTime {
        timestamp: datetime::system_time_to_local(modified),
        source: TimeSource::FileSystem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::{Local, TimeZone};
    use filetime::FileTime;
    use tempfile::tempdir;

    fn set_mtime(path: &Path, y: i32, m: u32, d: u32) -> NaiveDateTime {
        let local = Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(local.timestamp(), 0)).unwrap();
        local.naive_local()
    }

    #[test]
    fn test_exif_wins_over_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, exif::jpeg_with_date_time_original("2022:01:01 09:15:00")).unwrap();
        set_mtime(&path, 2019, 8, 20);

        let resolved = resolve_timestamp(&path).unwrap();
        assert_eq!(resolved.source, TimeSource::Exif);
        assert_eq!(
            resolved.timestamp,
            NaiveDateTime::parse_from_str("2022-01-01 09:15:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[test]
    fn test_photo_without_exif_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");
        fs::write(&path, b"not really a png").unwrap();
        let expected = set_mtime(&path, 2020, 2, 29);

        let resolved = resolve_timestamp(&path).unwrap();
        assert_eq!(resolved.source, TimeSource::FileSystem);
        assert_eq!(resolved.timestamp, expected);
    }

    #[test]
    fn test_video_without_metadata_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.mp4");
        fs::write(&path, b"no boxes here").unwrap();
        let expected = set_mtime(&path, 2022, 6, 15);

        let resolved = resolve_timestamp(&path).unwrap();
        assert_eq!(resolved.source, TimeSource::FileSystem);
        assert_eq!(resolved.timestamp, expected);
    }

    #[test]
    fn test_video_container_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.mov");
        let created =
            NaiveDateTime::parse_from_str("2018-11-30 23:59:00", "%Y-%m-%d %H:%M:%S").unwrap();
        fs::write(&path, mp4::mp4_with_creation_time(mp4::quicktime_seconds(created))).unwrap();
        set_mtime(&path, 2024, 1, 1);

        let resolved = resolve_timestamp(&path).unwrap();
        assert_eq!(resolved.source, TimeSource::VideoMetadata);
        assert_eq!(resolved.timestamp, datetime::utc_to_local(created));
    }

    #[test]
    fn test_other_file_uses_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();
        let expected = set_mtime(&path, 2023, 5, 7);

        let resolved = resolve_timestamp(&path).unwrap();
        assert_eq!(resolved.source, TimeSource::FileSystem);
        assert_eq!(resolved.timestamp, expected);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = resolve_timestamp(&dir.path().join("vanished.jpg")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_time_source_debug() {
        assert_eq!(format!("{:?}", TimeSource::Exif), "Exif");
        assert_eq!(format!("{:?}", TimeSource::VideoMetadata), "VideoMetadata");
        assert_eq!(format!("{:?}", TimeSource::FileSystem), "FileSystem");
    }
}
