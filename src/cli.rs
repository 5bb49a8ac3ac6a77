//! CLI argument parsing with clap

use crate::config::{Config, OrganizeMode};
use clap::Parser;
use std::path::PathBuf;

/// Media Organizer - sort photos and videos into dated folders
///
/// Files under DIRECTORY are relocated to
/// DIRECTORY/<date>/<photo|video|other>/<name>, dated by EXIF data, video
/// metadata or the file modification time.
#[derive(Parser, Debug)]
#[command(name = "media-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to organize
    ///
    /// May be omitted when a config file provides `root_dir`.
    pub directory: Option<PathBuf>,

    /// Date folder layout
    #[arg(short, long, value_enum)]
    pub organize_by: Option<OrganizeMode>,

    /// Copy files instead of moving them
    #[arg(short, long)]
    pub copy: bool,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Path to configuration file (TOML format)
    ///
    /// CLI arguments override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Show a live progress view instead of line output
    #[arg(short, long)]
    pub interactive: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref directory) = self.directory {
            config.root_dir = directory.clone();
        }
        if let Some(organize_by) = self.organize_by {
            config.organize_by = organize_by;
        }
        if self.copy {
            config.copy = true;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        Config {
            root_dir: self.directory.clone().unwrap_or_else(|| PathBuf::from(".")),
            organize_by: self.organize_by.unwrap_or_default(),
            copy: self.copy,
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }
}
