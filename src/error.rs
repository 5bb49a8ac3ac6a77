//! Error types for the media organizer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media organizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media organizer
///
/// Variants fall into three groups. Metadata errors (`ExifRead`,
/// `VideoMetadata`, `FfprobeNotFound`) never leave the timestamp resolver.
/// Precondition errors (`Root*`) abort a run before any file is touched.
/// Everything else is a per-file error: logged, counted and skipped past.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to extract video metadata from {path}: {message}")]
    VideoMetadata { path: PathBuf, message: String },

    #[error("FFprobe not found. Please install FFmpeg and ensure ffprobe is in PATH")]
    FfprobeNotFound,

    #[error("Directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    #[error("Cannot read directory {path}: {message}")]
    RootUnreadable { path: PathBuf, message: String },

    #[error("Invalid file name: {path}")]
    InvalidFileName { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error must abort the whole run
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::RootNotFound { .. } | Error::RootNotDirectory { .. } | Error::RootUnreadable { .. }
        )
    }
}
