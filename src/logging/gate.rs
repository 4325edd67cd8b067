//! Console sink that honours the configured output mode

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::fmt::writer::OptionalWriter;
use tracing_subscriber::fmt::MakeWriter;

use super::level::{ModeCell, OutputMode};

/// A writer that forwards to `inner` unless output is file-only
///
/// No buffering or transformation; a suppressed write reports zero bytes.
pub struct OutputGate<W> {
    mode: Arc<ModeCell>,
    inner: W,
}

impl<W: Write> OutputGate<W> {
    /// Gate `inner` on the mode held in `mode`
    pub fn new(mode: Arc<ModeCell>, inner: W) -> Self {
        Self { mode, inner }
    }

    /// Consume the gate and return the wrapped writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl OutputGate<io::Stderr> {
    /// Gate the process's standard error
    pub fn stderr(mode: Arc<ModeCell>) -> Self {
        Self::new(mode, io::stderr())
    }
}

impl<W: Write> Write for OutputGate<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.mode.get() == OutputMode::FileOnly {
            return Ok(0);
        }
        self.inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.mode.get() == OutputMode::FileOnly {
            return Ok(());
        }
        self.inner.flush()
    }
}

/// Writer factory for the console layer of the primary subscriber
///
/// Hands out an [`OutputGate`] over `inner`'s writer, or nothing at all while
/// output is file-only so the fmt layer never sees a short write.
#[derive(Clone)]
pub struct ConsoleWriter<M = fn() -> io::Stderr> {
    mode: Arc<ModeCell>,
    inner: M,
}

impl ConsoleWriter {
    /// Console writer over standard error
    pub fn new(mode: Arc<ModeCell>) -> Self {
        Self::with_inner(mode, io::stderr)
    }
}

impl<M> ConsoleWriter<M> {
    /// Console writer over the writers made by `inner`
    pub fn with_inner(mode: Arc<ModeCell>, inner: M) -> Self {
        Self { mode, inner }
    }
}

impl<'a, M> MakeWriter<'a> for ConsoleWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = OptionalWriter<OutputGate<M::Writer>>;

    fn make_writer(&'a self) -> Self::Writer {
        if self.mode.get() == OutputMode::FileOnly {
            return OptionalWriter::none();
        }
        OptionalWriter::some(OutputGate::new(
            Arc::clone(&self.mode),
            self.inner.make_writer(),
        ))
    }
}
