//! Creation time from ISO base media files (MP4, MOV, M4V, 3GP)
//!
//! Reads the movie header (`moov/mvhd`) with the `mp4` crate, without
//! shelling out.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Seconds between 1904-01-01 (QuickTime epoch) and 1970-01-01
const QUICKTIME_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Extensions whose containers use the ISO base media box layout
const ISO_BMFF_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "3gp"];

pub fn is_iso_bmff(ext: &str) -> bool {
    ISO_BMFF_EXTENSIONS.contains(&ext)
}

/// Read the `mvhd` creation time as a UTC naive datetime
pub fn extract_mvhd_time(path: &Path) -> Result<NaiveDateTime> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let reader = BufReader::new(file);

    let mp4 = mp4::Mp4Reader::read_header(reader, size)
        .map_err(|e| metadata_error(path, e.to_string()))?;
    let seconds = mp4.moov.mvhd.creation_time;

    // Zero means the encoder never set it
    if seconds == 0 {
        return Err(metadata_error(path, "creation time not set".to_string()));
    }

    let unix = i64::try_from(seconds)
        .ok()
        .and_then(|s| s.checked_sub(QUICKTIME_EPOCH_OFFSET))
        .ok_or_else(|| metadata_error(path, format!("creation time {} out of range", seconds)))?;

    let utc = DateTime::from_timestamp(unix, 0)
        .ok_or_else(|| metadata_error(path, format!("creation time {} out of range", seconds)))?
        .naive_utc();

    trace!(?path, %utc, "Found mvhd creation time");
    Ok(utc)
}

fn metadata_error(path: &Path, message: String) -> Error {
    Error::VideoMetadata {
        path: path.to_path_buf(),
        message,
    }
}

/// Build a minimal MP4: `ftyp`, then `moov` holding a version 0 `mvhd`
#[cfg(test)]
pub(crate) fn mp4_with_creation_time(quicktime_seconds: u32) -> Vec<u8> {
    let mut mvhd_body = Vec::new();
    mvhd_body.extend_from_slice(&[0, 0, 0, 0]);
    mvhd_body.extend_from_slice(&quicktime_seconds.to_be_bytes());
    mvhd_body.extend_from_slice(&quicktime_seconds.to_be_bytes());
    mvhd_body.extend_from_slice(&1000u32.to_be_bytes());
    mvhd_body.extend_from_slice(&5000u32.to_be_bytes());
    mvhd_body.resize(100, 0);

    let mut mvhd = ((8 + mvhd_body.len()) as u32).to_be_bytes().to_vec();
    mvhd.extend_from_slice(b"mvhd");
    mvhd.extend_from_slice(&mvhd_body);

    let mut data = 16u32.to_be_bytes().to_vec();
    data.extend_from_slice(b"ftypisom");
    data.extend_from_slice(&0u32.to_be_bytes());

    data.extend_from_slice(&((8 + mvhd.len()) as u32).to_be_bytes());
    data.extend_from_slice(b"moov");
    data.extend_from_slice(&mvhd);
    data
}

/// Seconds since the QuickTime epoch for a UTC datetime
#[cfg(test)]
pub(crate) fn quicktime_seconds(utc: NaiveDateTime) -> u32 {
    (utc.and_utc().timestamp() + QUICKTIME_EPOCH_OFFSET) as u32
}
