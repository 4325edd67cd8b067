//! Primary subscriber wiring
//!
//! Builds the `tracing` subscriber the application logs through: a level
//! filter, a console layer behind the output gate, and the mirror hook.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::gate::ConsoleWriter;
use super::hook::HookLayer;
use super::level::Level;
use super::router::LogRouter;

/// Install the global subscriber for `router`
///
/// `RUST_LOG` takes precedence over `level` when set. Fails if a global
/// subscriber is already installed.
pub fn install(router: &Arc<LogRouter>, level: Level) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| level.filter_directive().into());

    build_subscriber(
        router,
        env_filter,
        router.console_writer(),
        std::io::stderr().is_terminal(),
    )
    .try_init()
    .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Assemble the filter, the gated console layer and the mirror hook
fn build_subscriber<M>(
    router: &Arc<LogRouter>,
    env_filter: EnvFilter,
    console: ConsoleWriter<M>,
    ansi: bool,
) -> impl Subscriber + Send + Sync + 'static
where
    M: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(console)
        .with_ansi(ansi)
        .with_target(true)
        .log_internal_errors(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(HookLayer::new(router.mirror_hook()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{self, Write};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log one info event through the full subscriber, returning console output
    /// and the router's current bucket content
    fn log_through(router: &Arc<LogRouter>, message: &str) -> (String, String) {
        let console = SharedBuffer::default();
        let sink = console.clone();
        let subscriber = build_subscriber(
            router,
            EnvFilter::new("info"),
            ConsoleWriter::with_inner(router.mode_cell(), move || sink.clone()),
            false,
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(attempt = 1_u64, "{}", message);
        });

        let file = router
            .file_logger()
            .and_then(|l| l.writer())
            .and_then(|w| w.current_path())
            .map(|p| fs::read_to_string(p).unwrap())
            .unwrap_or_default();
        (console.contents(), file)
    }

    fn router(dir: &TempDir, output_type: &str) -> Arc<LogRouter> {
        let router = Arc::new(LogRouter::new());
        let base = dir.path().join("app___");
        router
            .initialize(base.to_str().unwrap(), "info", 7, 1, output_type)
            .unwrap();
        router
    }

    #[test]
    fn test_all_reaches_console_and_file() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir, "all");

        let (console, file) = log_through(&router, "service started");

        assert!(console.contains("INFO"));
        assert!(console.contains("service started"));
        assert!(file.contains("INFO service started attempt=1"));
        assert_eq!(fs::read_to_string(dir.path().join("app")).unwrap(), file);
    }

    #[test]
    fn test_file_only_skips_console() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir, "file");

        let (console, file) = log_through(&router, "quietly recorded");

        assert!(console.is_empty());
        assert!(file.contains("INFO quietly recorded"));
    }

    #[test]
    fn test_console_only_writes_no_files() {
        let dir = TempDir::new().unwrap();
        let router = router(&dir, "console");

        let (console, file) = log_through(&router, "terminal only");

        assert!(console.contains("terminal only"));
        assert!(file.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
