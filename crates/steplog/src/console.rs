//! Console - the terminal capabilities a spinner and logger need
//!
//! A [`Console`] bundles the output sinks, the [`ReplySource`] that
//! cursor-position replies arrive on, and a [`TerminalControl`] for raw mode
//! and geometry. [`Console::stdio`] wires the real process streams; the scripted
//! constructors exist so rendering can be driven deterministically.

use std::fmt;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::io::AsyncRead;
use tokio::sync::Mutex;

use crate::sink::{SharedBuffer, Sink};

/// Size used when the terminal cannot report one.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

type BoxedInput = Box<dyn AsyncRead + Send + Unpin>;

/// Where cursor-position replies are read from.
#[derive(Clone)]
pub enum ReplySource {
    /// The controlling terminal, through crossterm's event reader. Every wait
    /// is bounded, so nothing is left reading stdin after a timeout.
    Terminal,
    /// A byte stream carrying raw `ESC [ row ; col R` replies
    Stream(Arc<Mutex<BoxedInput>>),
}

impl ReplySource {
    /// Replies read from `input`.
    pub fn stream(input: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Stream(Arc::new(Mutex::new(Box::new(input))))
    }
}

impl fmt::Debug for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal => f.write_str("Terminal"),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Raw-mode and geometry control over the terminal.
pub trait TerminalControl: Send + Sync {
    /// `(columns, rows)` of the terminal.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Whether the input stream is currently in raw mode.
    fn is_raw_mode(&self) -> io::Result<bool>;

    /// Switch raw mode on or off.
    fn set_raw_mode(&self, enabled: bool) -> io::Result<()>;
}

/// The real terminal, via crossterm.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermTerminal;

impl TerminalControl for CrosstermTerminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn is_raw_mode(&self) -> io::Result<bool> {
        crossterm::terminal::is_raw_mode_enabled()
    }

    fn set_raw_mode(&self, enabled: bool) -> io::Result<()> {
        if enabled {
            crossterm::terminal::enable_raw_mode()
        } else {
            crossterm::terminal::disable_raw_mode()
        }
    }
}

/// A terminal with a fixed size that records raw-mode switches.
#[derive(Debug, Default)]
pub struct FixedTerminal {
    columns: u16,
    rows: u16,
    raw: AtomicBool,
    switches: AtomicUsize,
}

impl FixedTerminal {
    /// A terminal of `columns` x `rows`, starting in cooked mode.
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            raw: AtomicBool::new(false),
            switches: AtomicUsize::new(0),
        }
    }

    /// Current raw-mode flag.
    pub fn raw(&self) -> bool {
        self.raw.load(Ordering::SeqCst)
    }

    /// How many times raw mode has been switched.
    pub fn switches(&self) -> usize {
        self.switches.load(Ordering::SeqCst)
    }
}

impl TerminalControl for FixedTerminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.columns, self.rows))
    }

    fn is_raw_mode(&self) -> io::Result<bool> {
        Ok(self.raw())
    }

    fn set_raw_mode(&self, enabled: bool) -> io::Result<()> {
        self.raw.store(enabled, Ordering::SeqCst);
        self.switches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Buffers behind a scripted console.
#[derive(Debug, Clone, Default)]
pub struct Captured {
    /// Everything written to stdout
    pub stdout: SharedBuffer,
    /// Everything written to stderr
    pub stderr: SharedBuffer,
}

/// Output sinks, reply source and terminal control, shared by clones.
#[derive(Clone)]
pub struct Console {
    stdout: Sink,
    stderr: Sink,
    replies: ReplySource,
    control: Arc<dyn TerminalControl>,
    interactive: bool,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .field("replies", &self.replies)
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Assemble a console from its parts.
    pub fn new(
        stdout: Sink,
        stderr: Sink,
        replies: ReplySource,
        control: Arc<dyn TerminalControl>,
        interactive: bool,
    ) -> Self {
        Self {
            stdout,
            stderr,
            replies,
            control,
            interactive,
        }
    }

    /// The process streams. Animation is enabled only when both stdin and
    /// stdout are terminals, since cursor replies arrive on stdin.
    pub fn stdio() -> Self {
        let interactive = io::stdout().is_terminal() && io::stdin().is_terminal();
        Self::new(
            Sink::stdout(),
            Sink::stderr(),
            ReplySource::Terminal,
            Arc::new(CrosstermTerminal),
            interactive,
        )
    }

    /// An interactive console whose terminal answers with `replies`.
    pub fn scripted(
        replies: impl Into<Vec<u8>>,
        control: Arc<dyn TerminalControl>,
    ) -> (Self, Captured) {
        let captured = Captured::default();
        let console = Self::new(
            Sink::new(captured.stdout.clone(), true),
            Sink::new(captured.stderr.clone(), false),
            ReplySource::stream(std::io::Cursor::new(replies.into())),
            control,
            true,
        );
        (console, captured)
    }

    /// A console that is not attached to a terminal: no animation, no queries.
    pub fn captured() -> (Self, Captured) {
        let captured = Captured::default();
        let console = Self::new(
            Sink::new(captured.stdout.clone(), false),
            Sink::new(captured.stderr.clone(), false),
            ReplySource::stream(tokio::io::empty()),
            Arc::new(FixedTerminal::new(FALLBACK_SIZE.0, FALLBACK_SIZE.1)),
            false,
        );
        (console, captured)
    }

    /// Standard output sink.
    pub fn stdout(&self) -> &Sink {
        &self.stdout
    }

    /// Standard error sink.
    pub fn stderr(&self) -> &Sink {
        &self.stderr
    }

    /// Where cursor-position replies come from.
    pub fn replies(&self) -> &ReplySource {
        &self.replies
    }

    /// Raw-mode and geometry control.
    pub fn control(&self) -> &Arc<dyn TerminalControl> {
        &self.control
    }

    /// Whether the spinner may animate and query the cursor.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Terminal size, falling back to 80x24.
    pub fn size(&self) -> (u16, u16) {
        match self.control.size() {
            Ok((columns, rows)) if columns > 0 && rows > 0 => (columns, rows),
            _ => FALLBACK_SIZE,
        }
    }
}
