//! Error types for hourlog

use thiserror::Error;

/// Errors returned while configuring file logging
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The level name is not one of trace, debug, info, warn, error or panic
    #[error("invalid log level {0:?} (expected one of trace, debug, info, warn, error, panic)")]
    InvalidLevel(String),
}
