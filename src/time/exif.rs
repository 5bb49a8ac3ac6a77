//! EXIF time extraction for images

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Extract the capture time from the EXIF `DateTimeOriginal` tag
///
/// The value is wall-clock time of the camera and is returned as is.
pub fn extract_exif_time(path: &Path) -> Result<NaiveDateTime> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or_else(|| Error::ExifRead {
            path: path.to_path_buf(),
            message: "DateTimeOriginal tag not present".to_string(),
        })?;

    let raw = match field.value {
        Value::Ascii(ref parts) if !parts.is_empty() => {
            String::from_utf8_lossy(&parts[0]).into_owned()
        }
        _ => field.display_value().to_string(),
    };

    let datetime = parse_exif_datetime(&raw).ok_or_else(|| Error::ExifRead {
        path: path.to_path_buf(),
        message: format!("Malformed DateTimeOriginal value '{}'", raw),
    })?;

    trace!(?path, %datetime, "Found EXIF date");
    Ok(datetime)
}

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    // Some writers pad with NULs or wrap the value in quotes
    let s = s.trim_matches(char::from(0)).trim().trim_matches('"');

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }

    // Try with subseconds
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S%.f") {
        return Some(dt);
    }

    // Try alternative formats
    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}

/// Build a minimal JPEG whose EXIF block carries only `DateTimeOriginal`
#[cfg(test)]
pub(crate) fn jpeg_with_date_time_original(date: &str) -> Vec<u8> {
    assert_eq!(date.len(), 19, "EXIF dates are exactly 19 characters");

    let mut tiff = Vec::new();
    // Little-endian TIFF header, IFD0 at offset 8
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    // IFD0: a single ExifIFDPointer entry pointing at offset 26
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    // Exif IFD: DateTimeOriginal, ASCII, 20 bytes at offset 44
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&20u32.to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(date.as_bytes());
    tiff.push(0);

    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&[0xFF, 0xE1]);
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::tempdir;

    #[test]
    fn test_parse_exif_datetime() {
        // Standard EXIF format
        let dt = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);

        // With quotes
        let dt = parse_exif_datetime("\"2024:01:15 14:30:00\"").unwrap();
        assert_eq!(dt.year(), 2024);

        // Alternative formats
        let dt = parse_exif_datetime("2024-01-15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);

        // Unset dates written by some cameras
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("invalid").is_none());
    }

    #[test]
    fn test_extract_from_jpeg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, jpeg_with_date_time_original("2022:01:01 10:20:30")).unwrap();

        let dt = extract_exif_time(&path).unwrap();
        assert_eq!(
            dt,
            NaiveDateTime::parse_from_str("2022-01-01 10:20:30", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[test]
    fn test_extract_without_exif() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        let err = extract_exif_time(&path).unwrap_err();
        assert!(matches!(err, Error::ExifRead { .. }));
    }

    #[test]
    fn test_extract_malformed_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jpg");
        std::fs::write(&path, jpeg_with_date_time_original("2022:13:45 99:00:00")).unwrap();

        assert!(extract_exif_time(&path).is_err());
    }

    #[test]
    fn test_extract_missing_file() {
        let dir = tempdir().unwrap();
        let err = extract_exif_time(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
