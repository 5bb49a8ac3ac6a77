//! Video container creation time
//!
//! ISO base media files are read natively. Anything else, or an ISO file
//! whose `mvhd` is unusable, goes through FFprobe when it is installed.

use crate::error::{Error, Result};
use crate::media::normalized_extension;
use crate::time::datetime::{parse_video_datetime, utc_to_local};
use crate::time::mp4;
use chrono::NaiveDateTime;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Metadata keys to try for creation date
const CREATION_DATE_KEYS: &[&str] = &[
    "creation_time",
    "com.apple.quicktime.creationdate",
    "date",
    "date_recorded",
];

/// Cached FFprobe availability check
static FFPROBE_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Check if ffprobe is available (cached)
fn is_ffprobe_available() -> bool {
    *FFPROBE_AVAILABLE.get_or_init(|| Command::new("ffprobe").arg("-version").output().is_ok())
}

/// Extract the container creation time, converted to local time
pub fn extract_video_time(path: &Path) -> Result<NaiveDateTime> {
    let utc_time = if mp4::is_iso_bmff(&normalized_extension(path)) {
        match mp4::extract_mvhd_time(path) {
            Ok(time) => time,
            Err(e) => {
                debug!(?path, error = %e, "Native container parse failed, trying ffprobe");
                extract_ffprobe_time(path)?
            }
        }
    } else {
        extract_ffprobe_time(path)?
    };

    let local_time = utc_to_local(utc_time);
    debug!(?path, %utc_time, %local_time, "Applied system timezone offset");
    Ok(local_time)
}

/// Extract a UTC creation time from FFprobe's JSON output
fn extract_ffprobe_time(path: &Path) -> Result<NaiveDateTime> {
    if !is_ffprobe_available() {
        return Err(Error::FfprobeNotFound);
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!("Failed to execute ffprobe: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!(
                "FFprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    trace!(?path, "FFprobe output: {}", json_str);

    let json: serde_json::Value =
        serde_json::from_str(&json_str).map_err(|e| Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!("Failed to parse FFprobe JSON: {}", e),
        })?;

    find_creation_time(&json).ok_or_else(|| Error::VideoMetadata {
        path: path.to_path_buf(),
        message: "No creation time found in video metadata".to_string(),
    })
}

/// Look for a creation date in format tags first, then in stream tags
fn find_creation_time(json: &serde_json::Value) -> Option<NaiveDateTime> {
    if let Some(tags) = json.get("format").and_then(|f| f.get("tags"))
        && let Some(dt) = creation_time_in_tags(tags)
    {
        return Some(dt);
    }

    json.get("streams")
        .and_then(|s| s.as_array())?
        .iter()
        .filter_map(|stream| stream.get("tags"))
        .find_map(creation_time_in_tags)
}

fn creation_time_in_tags(tags: &serde_json::Value) -> Option<NaiveDateTime> {
    for key in CREATION_DATE_KEYS {
        // Try both lowercase and original case
        for tag_key in [key.to_string(), key.to_uppercase()] {
            if let Some(value) = tags.get(&tag_key).and_then(|v| v.as_str())
                && let Some(dt) = parse_video_datetime(value)
            {
                trace!(key = %tag_key, "Found video creation time");
                return Some(dt);
            }
        }
    }
    None
}
