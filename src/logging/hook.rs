//! Hooks that observe every entry emitted through the primary logger
//!
//! [`HookLayer`] adapts a [`Hook`] to `tracing-subscriber`, and [`MirrorHook`]
//! is the hook that copies entries into the rotated log files.

use std::sync::Arc;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::entry::{Fields, LogEntry};
use super::level::Level;
use super::router::LogRouter;

/// Name of the boolean event field that marks an entry as panic level
pub const PANIC_FIELD: &str = "panic";

/// Something invoked synchronously for each entry the primary logger emits
pub trait Hook: Send + Sync + 'static {
    /// Levels this hook wants to see
    fn levels(&self) -> &[Level];

    /// Handle one entry
    fn fire(&self, entry: &LogEntry) -> anyhow::Result<()>;
}

/// Re-emits every entry through the file logger held by a [`LogRouter`]
///
/// Does nothing until the router has a file logger. Write failures are
/// swallowed so the primary logging path is never disturbed, with one
/// exception: a panic-level entry makes the file logger panic, exactly as the
/// primary logger would.
#[derive(Clone)]
pub struct MirrorHook {
    router: Arc<LogRouter>,
}

impl MirrorHook {
    pub fn new(router: Arc<LogRouter>) -> Self {
        Self { router }
    }
}

impl Hook for MirrorHook {
    fn levels(&self) -> &[Level] {
        &Level::ALL
    }

    fn fire(&self, entry: &LogEntry) -> anyhow::Result<()> {
        let Some(logger) = self.router.file_logger() else {
            return Ok(());
        };

        let fields = &entry.fields;
        let message = entry.message.as_str();
        let _ = match entry.level {
            Level::Trace => logger.trace(fields, message),
            Level::Debug => logger.debug(fields, message),
            Level::Info => logger.info(fields, message),
            Level::Warn => logger.warn(fields, message),
            Level::Error => logger.error(fields, message),
            Level::Panic => logger.panic(fields, message),
        };
        Ok(())
    }
}

/// `tracing-subscriber` layer that turns events into [`LogEntry`] values and
/// hands them to a [`Hook`]
///
/// `tracing` has no panic level: an event recording `panic = true` is
/// delivered as [`Level::Panic`] and the marker field is dropped.
pub struct HookLayer<H> {
    hook: H,
}

impl<H: Hook> HookLayer<H> {
    pub fn new(hook: H) -> Self {
        Self { hook }
    }
}

/// A visitor collecting the message and fields of an event
#[derive(Default)]
struct EntryVisitor {
    message: String,
    fields: Fields,
    panic: bool,
}

impl EntryVisitor {
    fn record(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name.starts_with("log.") {
            return;
        }
        match (name, value) {
            ("message", Value::String(s)) => self.message = s,
            (PANIC_FIELD, Value::Bool(b)) => self.panic = b,
            (_, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for EntryVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record(field, Value::String(value.to_string()));
    }
}

impl<S, H> Layer<S> for HookLayer<H>
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    H: Hook,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);

        let level = if visitor.panic {
            Level::Panic
        } else {
            Level::from(*event.metadata().level())
        };
        if !self.hook.levels().contains(&level) {
            return;
        }

        let entry = LogEntry {
            fields: visitor.fields,
            ..LogEntry::new(level, visitor.message)
        };

        // Hook failures never reach the caller
        let _ = self.hook.fire(&entry);
    }
}
