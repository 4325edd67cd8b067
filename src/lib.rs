//! hourlog - hourly log rotation and console/file routing for `tracing`
//!
//! This library provides the routing, mirroring and rotation pieces used by
//! the `hourlog` binary.

pub mod config;
pub mod error;
pub mod logging;

pub use error::ConfigError;
