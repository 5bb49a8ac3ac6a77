//! Media Organizer - sort photos and videos into dated folders
//!
//! Line-oriented CLI by default, or a live progress view with
//! `--interactive`.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use media_organizer::{Cli, Config, Organizer, RunReport, TuiApp, channel};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::filter_fn, fmt, prelude::*};

/// How often the CLI drains the progress channel
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Log target for events the terminal already shows in its own words
const LOG_FILE_ONLY: &str = "media_organizer::log_file_only";

// CLI Output Module
mod cli_output {
    //! Colored, consistently formatted terminal output

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use media_organizer::ProgressEvent;
    use std::io::stdout;

    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str, value_color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(value_color)));
        let _ = stdout().execute(Print("\n"));
    }

    /// One progress line: percentage, then the message colored by its verb
    pub fn print_progress(event: &ProgressEvent) {
        if event.is_summary() {
            print_summary(&event.message);
            return;
        }

        let percent = event
            .percent
            .map(|p| format!("[{:>3.0}%] ", p))
            .unwrap_or_default();
        let color = if event.message.starts_with("Error") {
            CliTheme::ERROR
        } else if event.message.starts_with("Would") {
            CliTheme::WARNING
        } else if event.message.starts_with("Moved") || event.message.starts_with("Copied") {
            CliTheme::SUCCESS
        } else {
            CliTheme::HINT
        };

        let _ = stdout().execute(Print(style(percent).with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style(format!("{}\n", event.message)).with(color)));
    }

    /// The closing multi-line report: a bold heading, then its lines
    fn print_summary(message: &str) {
        let mut lines = message.lines();
        print_blank();
        print_separator();
        if let Some(heading) = lines.next() {
            let _ = stdout().execute(Print(format!("{}\n", heading.bold())));
        }
        for line in lines {
            let _ = stdout().execute(Print(format!("  {}\n", line)));
        }
    }

    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print(style("  Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Get the executable directory for Config and Log directories
    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir, &cli);
    let _guard = setup_logging(&cli, &log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        interactive = cli.interactive,
        "Media Organizer starting"
    );

    let config = load_config(&cli, &exe_dir)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    info!(log_file = %log_path.display(), "Log file location");

    let organizer = Organizer::new(config);

    if cli.interactive {
        run_interactive_mode(organizer, log_path)
    } else {
        run_cli_mode(organizer, &log_path)
    }
}

/// Run with the Ratatui progress view
fn run_interactive_mode(organizer: Organizer, log_path: PathBuf) -> Result<ExitCode> {
    let mut app = TuiApp::new(organizer.config())?;
    app.set_log_path(log_path.clone());

    match app.run(organizer)? {
        Some(report) => {
            info!(log_file = %log_path.display(), stats = %report.stats, "Interactive session complete");
            Ok(ExitCode::SUCCESS)
        }
        // The view already showed why the run never started
        None => Ok(ExitCode::FAILURE),
    }
}

/// Run with line-oriented output
fn run_cli_mode(organizer: Organizer, log_path: &Path) -> Result<ExitCode> {
    use cli_output::*;

    let (mut tx, mut rx) = channel();
    let handle = std::thread::spawn(move || organizer.run(&mut tx));

    while !rx.is_closed() {
        for event in rx.poll() {
            print_progress(&event);
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let outcome = handle
        .join()
        .map_err(|_| anyhow::anyhow!("organizer thread panicked"))?;

    match outcome {
        Ok(report) => {
            print_report(&report);
            print_separator();
            print_log_path(&log_path.display().to_string());
            info!(log_file = %log_path.display(), "Processing complete. Log saved to");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(target: LOG_FILE_ONLY, error = %e, "Processing failed");
            print_error(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_report(report: &RunReport) {
    use cli_output::*;

    let failed: Vec<_> = report.failed().collect();
    if !failed.is_empty() {
        print_separator();
        print_error(&format!("Failed files: {}", failed.len()));
        for result in failed {
            print_key_value(
                &result.source.display().to_string(),
                result.error.as_deref().unwrap_or("unknown error"),
                CliTheme::ERROR,
            );
        }
    }

    if report.dry_run {
        print_separator();
        print_warning("This was a dry run. No files were actually moved or copied.");
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        log_dir
            .join(&config_name)
            .join(format!("{}_{}.log", config_name, timestamp))
    } else if cli.interactive {
        log_dir.join(format!("Interactive_{}.log", timestamp))
    } else {
        log_dir.join(format!("CLIRun_{}.log", timestamp))
    }
}

/// Resolve config path - supports shorthand syntax
///
/// `camera` finds `camera.toml`, here or under `<exe dir>/Config/`.
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());
    let mut in_config_dir = exe_dir.join("Config").join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        if cli.directory.is_none() {
            anyhow::bail!("No directory given. Pass DIRECTORY or --config <file>");
        }
        cli.to_config()
    };

    Ok(config)
}

/// Setup logging: file always, stderr too unless the terminal UI owns the screen
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = if cli.json_log {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    let stderr_layer = (!cli.interactive).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter_fn(|meta| meta.target() != LOG_FILE_ONLY))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(guard)
}
