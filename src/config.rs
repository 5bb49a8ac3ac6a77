//! Configuration types for the media organizer

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Date partition granularity of the destination layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum OrganizeMode {
    /// Single folder per day: YYYY-MM-DD/
    #[default]
    Date,
    /// Nested year and month: YYYY/MM/
    YearMonth,
    /// Nested year, month and day: YYYY/MM/DD/
    YearMonthDay,
}

impl OrganizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizeMode::Date => "date",
            OrganizeMode::YearMonth => "year_month",
            OrganizeMode::YearMonthDay => "year_month_day",
        }
    }
}

impl fmt::Display for OrganizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganizeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(OrganizeMode::Date),
            "year_month" => Ok(OrganizeMode::YearMonth),
            "year_month_day" => Ok(OrganizeMode::YearMonthDay),
            other => Err(Error::Config(format!(
                "unknown organize mode '{}' (expected date, year_month or year_month_day)",
                other
            ))),
        }
    }
}

/// What the relocation executor does with each planned file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationMode {
    Move,
    Copy,
    /// Simulate; `copy` tells which operation is being simulated
    DryRun { copy: bool },
}

impl RelocationMode {
    /// Dry run wins over copy
    pub fn from_flags(copy: bool, dry_run: bool) -> Self {
        match (copy, dry_run) {
            (copy, true) => RelocationMode::DryRun { copy },
            (true, false) => RelocationMode::Copy,
            (false, false) => RelocationMode::Move,
        }
    }
}

/// Configuration for one organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory to organize (files are relocated within it)
    pub root_dir: PathBuf,

    /// Date partition layout
    #[serde(default)]
    pub organize_by: OrganizeMode,

    /// Copy files instead of moving them
    #[serde(default)]
    pub copy: bool,

    /// Report what would happen without touching the filesystem
    #[serde(default)]
    pub dry_run: bool,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            organize_by: OrganizeMode::default(),
            copy: false,
            dry_run: false,
            verbose: false,
        }
    }
}

impl Config {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    pub fn relocation_mode(&self) -> RelocationMode {
        RelocationMode::from_flags(self.copy, self.dry_run)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Organizer Configuration File
# This file uses TOML format (https://toml.io)

# Directory to organize. Files are relocated inside this directory.
root_dir = "D:/Camera Roll"

# Layout: "date", "year_month" or "year_month_day"
# - date: 2023-05-07/photo/IMG_0001.jpg
# - year_month: 2023/05/photo/IMG_0001.jpg
# - year_month_day: 2023/05/07/photo/IMG_0001.jpg
organize_by = "date"

# Copy files instead of moving them
copy = false

# Dry run mode - show what would be done without actually doing it
dry_run = false

# Verbose output - show detailed processing information
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
