//! Output Sink - Shared, lockable output streams
//!
//! Loggers and the spinner write to the same process streams. A `Sink` is a
//! cloneable handle around one writer; every write happens under its lock so a
//! log line and a spinner frame can never tear each other.
//!
//! Sinks are injected rather than reached for globally, which lets tests
//! capture output in a [`SharedBuffer`].

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type BoxedWriter = Box<dyn Write + Send>;

/// A cloneable handle to a locked writer.
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<BoxedWriter>>,
    terminal: bool,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

impl Sink {
    /// Wrap an arbitrary writer. `terminal` says whether it is attached to a TTY.
    pub fn new(writer: impl Write + Send + 'static, terminal: bool) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            terminal,
        }
    }

    /// The process standard output.
    pub fn stdout() -> Self {
        let terminal = io::stdout().is_terminal();
        Self::new(io::stdout(), terminal)
    }

    /// The process standard error.
    pub fn stderr() -> Self {
        let terminal = io::stderr().is_terminal();
        Self::new(io::stderr(), terminal)
    }

    /// An in-memory sink plus the buffer it fills.
    pub fn memory() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(buffer.clone(), false), buffer)
    }

    /// Whether this sink is attached to a terminal.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Lock the writer for a batch of writes.
    ///
    /// A poisoned lock is recovered: the writer holds no state worth protecting.
    pub fn lock(&self) -> MutexGuard<'_, BoxedWriter> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write `text` followed by a newline and flush.
    pub fn write_line(&self, text: &str) -> io::Result<()> {
        let mut writer = self.lock();
        writeln!(writer, "{text}")?;
        writer.flush()
    }

    /// Write `text` verbatim and flush.
    pub fn write_raw(&self, text: &str) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

/// A growable byte buffer shared between a [`Sink`] and a reader (usually a test).
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Drop everything written so far.
    pub fn clear(&self) {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
