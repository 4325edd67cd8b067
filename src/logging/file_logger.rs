//! Secondary logger that writes formatted entries to rotated files

use std::fmt::Write as _;
use std::io::{self, Write};

use serde_json::Value;

use super::entry::{Fields, LogEntry};
use super::level::Level;
use super::rotation::{RotationPolicy, RotationWriter};

/// Where formatted lines end up
enum Sink {
    Rotating(RotationWriter),
    /// Used when the rotation writer could not be built
    Discard,
}

/// Leveled logger bound to a [`RotationWriter`]
///
/// Each entry is formatted into one line and written with a single call, so
/// a line never straddles two bucket files.
pub struct FileLogger {
    min_level: Level,
    sink: Sink,
}

impl FileLogger {
    /// Create a logger writing through `writer`
    pub fn new(min_level: Level, writer: RotationWriter) -> Self {
        Self {
            min_level,
            sink: Sink::Rotating(writer),
        }
    }

    /// Create a logger that drops everything it is given
    pub fn discarding(min_level: Level) -> Self {
        Self {
            min_level,
            sink: Sink::Discard,
        }
    }

    /// Create a logger for `policy`, falling back to a discarding logger if the
    /// rotation writer cannot be built
    pub fn from_policy(min_level: Level, policy: RotationPolicy) -> Self {
        match RotationWriter::new(policy) {
            Ok(writer) => Self::new(min_level, writer),
            Err(e) => {
                tracing::warn!("File logging disabled, could not set up rotation: {}", e);
                Self::discarding(min_level)
            }
        }
    }

    /// Minimum level that is written
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// The rotation writer, unless this logger discards
    pub fn writer(&self) -> Option<&RotationWriter> {
        match &self.sink {
            Sink::Rotating(writer) => Some(writer),
            Sink::Discard => None,
        }
    }

    /// Whether entries at `level` are written
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    pub fn trace(&self, fields: &Fields, message: &str) -> io::Result<()> {
        self.emit(Level::Trace, fields, message)
    }

    pub fn debug(&self, fields: &Fields, message: &str) -> io::Result<()> {
        self.emit(Level::Debug, fields, message)
    }

    pub fn info(&self, fields: &Fields, message: &str) -> io::Result<()> {
        self.emit(Level::Info, fields, message)
    }

    pub fn warn(&self, fields: &Fields, message: &str) -> io::Result<()> {
        self.emit(Level::Warn, fields, message)
    }

    pub fn error(&self, fields: &Fields, message: &str) -> io::Result<()> {
        self.emit(Level::Error, fields, message)
    }

    /// Write the entry, then panic with its message
    ///
    /// The write is attempted first so the file keeps a record of what
    /// brought the process down.
    pub fn panic(&self, fields: &Fields, message: &str) -> ! {
        let _ = self.emit(Level::Panic, fields, message);
        panic!("{}", message);
    }

    fn emit(&self, level: Level, fields: &Fields, message: &str) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let entry = LogEntry {
            timestamp: chrono::Utc::now(),
            level,
            message: message.to_string(),
            fields: fields.clone(),
        };
        self.write_entry(&entry)
    }

    /// Format and write `entry` as-is, keeping its timestamp and level
    pub fn write_entry(&self, entry: &LogEntry) -> io::Result<()> {
        match &self.sink {
            Sink::Rotating(writer) => {
                let mut writer = writer;
                writer.write_all(format_line(entry).as_bytes())
            }
            Sink::Discard => Ok(()),
        }
    }
}

/// Format an entry as `<timestamp> <LEVEL> <message> key=value ...`
pub fn format_line(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} {:>5} {}",
        entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
        entry.level.as_str(),
        entry.message
    );
    for (key, value) in &entry.fields {
        let _ = write!(line, " {}={}", key, format_value(value));
    }
    line.push('\n');
    line
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() && !s.contains(char::is_whitespace) && !s.contains('"') => {
            s.clone()
        }
        // Quoted with escapes
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}
