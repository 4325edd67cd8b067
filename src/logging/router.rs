//! Process-wide routing state: output mode and the file logger
//!
//! A [`LogRouter`] is created once by the application's composition root and
//! shared by `Arc` with the console writer and the mirror hook.

use std::sync::{Arc, OnceLock};

use crate::config::Settings;
use crate::error::ConfigError;

use super::file_logger::FileLogger;
use super::gate::ConsoleWriter;
use super::hook::MirrorHook;
use super::level::{Level, ModeCell, OutputMode};
use super::rotation::RotationPolicy;

/// Owns the output mode and, once file output is configured, the file logger
#[derive(Default)]
pub struct LogRouter {
    mode: Arc<ModeCell>,
    file_logger: OnceLock<FileLogger>,
}

impl LogRouter {
    /// Create a router with console-only output and no file logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure output routing
    ///
    /// Unknown `output_type` values mean console output. An unknown `level`
    /// fails with [`ConfigError::InvalidLevel`] and changes nothing. When
    /// file output is requested the file logger is built on the first call
    /// only; later calls keep the first logger and its settings.
    ///
    /// This does not attach the mirror hook to the primary logger; see
    /// [`crate::logging::install`].
    pub fn initialize(
        &self,
        save_path: &str,
        level: &str,
        save_days: u32,
        rotation_hours: u32,
        output_type: &str,
    ) -> Result<(), ConfigError> {
        let level: Level = level.parse()?;
        let mode = OutputMode::parse(output_type);
        self.mode.set(mode);

        if mode.writes_file() {
            let logger = self.file_logger.get_or_init(|| {
                let policy = RotationPolicy::new(save_path, save_days, rotation_hours);
                FileLogger::from_policy(level, policy)
            });
            tracing::debug!(
                "File logging at {} and above to {}",
                logger.min_level(),
                logger
                    .writer()
                    .map(|w| w.policy().base_path().display().to_string())
                    .unwrap_or_else(|| "nowhere".to_string())
            );
        }

        Ok(())
    }

    /// Configure output routing from loaded [`Settings`]
    pub fn initialize_with(&self, settings: &Settings) -> Result<(), ConfigError> {
        self.initialize(
            &settings.expanded_save_path(),
            &settings.level,
            settings.save_days,
            settings.rotation_hours,
            &settings.output_type,
        )
    }

    /// Current output mode
    pub fn output_mode(&self) -> OutputMode {
        self.mode.get()
    }

    /// The file logger, if file output has been configured
    pub fn file_logger(&self) -> Option<&FileLogger> {
        self.file_logger.get()
    }

    /// Shared handle to the output mode cell
    pub(crate) fn mode_cell(&self) -> Arc<ModeCell> {
        Arc::clone(&self.mode)
    }

    /// Writer factory for the console layer, gated on this router's mode
    pub fn console_writer(&self) -> ConsoleWriter {
        ConsoleWriter::new(self.mode_cell())
    }

    /// Hook mirroring primary entries into this router's file logger
    pub fn mirror_hook(self: &Arc<Self>) -> MirrorHook {
        MirrorHook::new(Arc::clone(self))
    }
}
