//! Command-line arguments for the hourlog binary

use std::path::PathBuf;

use clap::Parser;

use hourlog::config::Settings;

/// Pipe standard input into hourly rotated log files
#[derive(Parser, Debug)]
#[command(name = "hourlog", version, about = "Route log lines to the console and hourly rotated files")]
pub struct Cli {
    /// Path to config file (default: ~/.hourlog/config.toml)
    #[arg(short, long, env = "HOURLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Alias path; buckets are written as <SAVE_PATH>.<YYYY-MM-DD-HH>.log
    #[arg(long, env = "HOURLOG_SAVE_PATH")]
    pub save_path: Option<String>,

    /// Minimum level: trace, debug, info, warn, error, panic
    #[arg(long, env = "HOURLOG_LEVEL")]
    pub level: Option<String>,

    /// Days to keep bucket files (0 keeps them forever)
    #[arg(long, env = "HOURLOG_SAVE_DAYS")]
    pub save_days: Option<u32>,

    /// Hours per bucket
    #[arg(long, env = "HOURLOG_ROTATION_HOURS")]
    pub rotation_hours: Option<u32>,

    /// Output: console, file or all
    #[arg(long, env = "HOURLOG_OUTPUT_TYPE")]
    pub output_type: Option<String>,

    /// Level each input line is logged at
    #[arg(long, default_value = "info")]
    pub line_level: String,
}

impl Cli {
    /// Overlay command-line values onto `settings`
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(save_path) = &self.save_path {
            settings.save_path = save_path.clone();
        }
        if let Some(level) = &self.level {
            settings.level = level.clone();
        }
        if let Some(save_days) = self.save_days {
            settings.save_days = save_days;
        }
        if let Some(rotation_hours) = self.rotation_hours {
            settings.rotation_hours = rotation_hours;
        }
        if let Some(output_type) = &self.output_type {
            settings.output_type = output_type.clone();
        }
        settings
    }
}
