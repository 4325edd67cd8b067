//! Log levels and console/file output modes

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::ConfigError;

/// Severity of a log entry, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    /// Every level, most verbose first
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
    ];

    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    ///
    /// `tracing` stops at ERROR, so a panic threshold still lets errors through
    /// the primary filter; the file logger applies the stricter threshold itself.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error | Level::Panic => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "panic" => Ok(Level::Panic),
            _ => Err(ConfigError::InvalidLevel(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Standard error only
    #[default]
    ConsoleOnly,
    /// Rotated files only; console writes are discarded
    FileOnly,
    /// Standard error and rotated files
    Both,
}

impl OutputMode {
    /// Parse an output type name (`console`, `file` or `all`, any case)
    ///
    /// Unknown names fall back to [`OutputMode::ConsoleOnly`]; this never fails.
    pub fn parse(val: &str) -> Self {
        match val.to_ascii_lowercase().as_str() {
            "console" => OutputMode::ConsoleOnly,
            "file" => OutputMode::FileOnly,
            "all" => OutputMode::Both,
            _ => OutputMode::ConsoleOnly,
        }
    }

    /// Whether entries should reach standard error
    pub fn writes_console(&self) -> bool {
        !matches!(self, OutputMode::FileOnly)
    }

    /// Whether entries should be mirrored to rotated files
    pub fn writes_file(&self) -> bool {
        !matches!(self, OutputMode::ConsoleOnly)
    }

    fn to_u8(self) -> u8 {
        match self {
            OutputMode::ConsoleOnly => 0,
            OutputMode::FileOnly => 1,
            OutputMode::Both => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => OutputMode::FileOnly,
            2 => OutputMode::Both,
            _ => OutputMode::ConsoleOnly,
        }
    }
}

/// Shared, lock-free holder for the configured output mode
///
/// Read on every console write, written by initialization.
#[derive(Debug, Default)]
pub struct ModeCell(AtomicU8);

impl ModeCell {
    /// Create a cell holding `mode`
    pub fn new(mode: OutputMode) -> Self {
        Self(AtomicU8::new(mode.to_u8()))
    }

    /// Current output mode
    pub fn get(&self) -> OutputMode {
        OutputMode::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replace the output mode
    pub fn set(&self, mode: OutputMode) {
        self.0.store(mode.to_u8(), Ordering::Release);
    }
}
