//! Log entries passed from the primary logger to the file mirror

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::level::Level;

/// Structured fields attached to an entry, keyed by field name
pub type Fields = BTreeMap<String, Value>;

/// A single log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Timestamp when the entry was recorded
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: Level,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Fields,
}

impl LogEntry {
    /// Create a new entry without fields, stamped with the current time
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: Fields::new(),
        }
    }

    /// Attach a field, replacing any previous value under the same key
    #[cfg(test)]
    pub(crate) fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
