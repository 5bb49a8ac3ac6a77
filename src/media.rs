//! Media file classification
//!
//! Classification is purely extension based. The lookup tables are fixed;
//! anything not listed is `Category::Other`.

use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions treated as photos (lower-case, without the dot)
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "arw", "dng", "heic", "raw"];

/// Extensions treated as videos (lower-case, without the dot)
pub const VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4", "avi", "mkv", "wmv"];

/// Coarse file type bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Photo,
    Video,
    Other,
}

impl Category {
    /// Classify a normalized (lower-case, dot-less) extension
    pub fn from_extension(ext: &str) -> Self {
        if PHOTO_EXTENSIONS.contains(&ext) {
            Category::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Category::Video
        } else {
            Category::Other
        }
    }

    /// Classify a path by its extension
    pub fn of_path(path: &Path) -> Self {
        Self::from_extension(&normalized_extension(path))
    }

    /// Folder name used in the destination layout
    pub fn folder_name(&self) -> &'static str {
        match self {
            Category::Photo => "photo",
            Category::Video => "video",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Lower-cased extension of `path`, empty when there is none
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Hidden files are never organized
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// A source file with its derived attributes for one run
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub extension: String,
    pub category: Category,
    pub timestamp: NaiveDateTime,
}

impl MediaFile {
    pub fn new(path: PathBuf, timestamp: NaiveDateTime) -> Self {
        let extension = normalized_extension(&path);
        let category = Category::from_extension(&extension);
        Self {
            path,
            extension,
            category,
            timestamp,
        }
    }
}
