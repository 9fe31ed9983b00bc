//! Spinner - an animated status line anchored to one terminal row
//!
//! `start` hides the cursor, asks the terminal where the cursor is and keeps
//! that row as the anchor. A background tick then redraws
//! `prefix + glyph + " " + text + suffix` from the anchor on every interval,
//! clearing everything below it first so wrapped text never leaves debris.
//!
//! The tick and every stop path take the same state lock, so once `stop`
//! returns no further frame can be drawn.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossterm::QueueableCommand;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{Clear, ClearType};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use unicode_width::UnicodeWidthStr;

use crate::color::{Style, strip_ansi};
use crate::console::Console;
use crate::cursor;
use crate::error::Result;
use crate::frames::FrameSet;

/// Look and timing of a [`Spinner`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpinnerOptions {
    /// Animation style
    pub frames: FrameSet,
    /// Tick interval; the frame set's own interval when unset
    pub interval_ms: Option<u64>,
    /// Text drawn before the glyph
    pub prefix: String,
    /// Text drawn after the status text
    pub suffix: String,
    /// Colour of the glyph
    pub color: Style,
    /// How long to wait for the terminal to report the cursor position
    pub query_timeout_ms: u64,
}

impl Default for SpinnerOptions {
    fn default() -> Self {
        Self {
            frames: FrameSet::default(),
            interval_ms: None,
            prefix: String::new(),
            suffix: "...".to_string(),
            color: Style::White,
            query_timeout_ms: 1000,
        }
    }
}

impl SpinnerOptions {
    /// Effective tick interval, never zero.
    pub fn interval(&self) -> Duration {
        let ms = self.interval_ms.unwrap_or(self.frames.interval_ms);
        Duration::from_millis(ms.max(1))
    }
}

#[derive(Debug, Clone)]
struct Look {
    frames: FrameSet,
    prefix: String,
    suffix: String,
    color: Style,
}

#[derive(Debug, Default)]
struct TickState {
    text: String,
    frame: usize,
    anchor_row: u16,
    rendered_lines: u16,
    running: bool,
}

impl TickState {
    /// Draw the current frame at the anchor and advance the frame index.
    fn render<W: Write + ?Sized>(
        &mut self,
        look: &Look,
        out: &mut W,
        (columns, rows): (u16, u16),
    ) -> io::Result<()> {
        let glyph = look.frames.glyph(self.frame);
        self.frame = (self.frame + 1) % look.frames.len().max(1);

        let plain = format!("{}{glyph} {}{}", look.prefix, self.text, look.suffix);
        let painted = format!(
            "{}{} {}{}",
            look.prefix,
            look.color.paint(glyph),
            self.text,
            look.suffix
        );
        let lines = screen_lines(&plain, columns).min(usize::from(u16::MAX)) as u16;

        // 1. Clear the previous rendering, however many rows it took
        out.queue(MoveTo(0, self.anchor_row))?;
        out.queue(Clear(ClearType::FromCursorDown))?;

        // 2. Draw
        out.write_all(painted.as_bytes())?;

        // 3. Text running past the last row scrolled the screen up
        let overflow = (u32::from(self.anchor_row) + u32::from(lines))
            .saturating_sub(u32::from(rows));
        self.anchor_row = self.anchor_row.saturating_sub(overflow as u16);
        self.rendered_lines = lines;

        // 4. Re-home for the next tick
        out.queue(MoveTo(0, self.anchor_row))?;
        out.flush()
    }

    /// Optionally clear the drawn region, then show the cursor.
    fn release<W: Write + ?Sized>(&mut self, out: &mut W, clear: bool) -> io::Result<()> {
        if clear {
            out.queue(MoveTo(0, self.anchor_row))?;
            out.queue(Clear(ClearType::FromCursorDown))?;
            self.rendered_lines = 0;
        }
        out.queue(Show)?;
        out.flush()
    }

    /// Put the cursor at the start of the row after the last frame.
    fn move_below<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let last_row = self
            .anchor_row
            .saturating_add(self.rendered_lines.saturating_sub(1));
        out.queue(MoveTo(0, last_row))?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

/// Number of screen rows `text` occupies on a terminal `columns` wide.
///
/// Escape sequences take no room; an empty line still takes one row.
pub fn screen_lines(text: &str, columns: u16) -> usize {
    let columns = usize::from(columns.max(1));
    strip_ansi(text)
        .split('\n')
        .map(|line| line.width().div_ceil(columns).max(1))
        .sum()
}

/// The periodic redraw task; aborted when dropped.
struct Ticker {
    task: JoinHandle<()>,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Redraw once. Returns false once the spinner has been stopped.
fn tick_once(state: &Mutex<TickState>, console: &Console, look: &Look) -> bool {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if !state.running {
        return false;
    }
    let size = console.size();
    let mut out = console.stdout().lock();
    if let Err(err) = state.render(look, &mut **out, size) {
        tracing::debug!(%err, "failed to draw spinner frame");
    }
    true
}

/// An animated status line.
pub struct Spinner {
    look: Look,
    interval: Duration,
    query_timeout: Duration,
    console: Console,
    state: Arc<Mutex<TickState>>,
    ticker: Option<Ticker>,
}

impl fmt::Debug for Spinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spinner")
            .field("frames", &self.look.frames)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Spinner {
    /// An idle spinner drawing on `console`.
    pub fn new(options: SpinnerOptions, console: Console) -> Self {
        let interval = options.interval();
        Self {
            look: Look {
                frames: options.frames,
                prefix: options.prefix,
                suffix: options.suffix,
                color: options.color,
            },
            interval,
            query_timeout: Duration::from_millis(options.query_timeout_ms),
            console,
            state: Arc::new(Mutex::new(TickState::default())),
            ticker: None,
        }
    }

    fn state(&self) -> MutexGuard<'_, TickState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the tick is scheduled.
    pub fn is_running(&self) -> bool {
        self.state().running
    }

    /// The buffered status text.
    pub fn text(&self) -> String {
        self.state().text.clone()
    }

    /// Replace the status text. It shows up on the next tick; an idle
    /// spinner only remembers it for the next `start`.
    pub fn set_text(&self, text: impl Into<String>) {
        self.state().text = text.into();
    }

    /// Index of the frame the next tick will draw.
    pub fn frame_index(&self) -> usize {
        self.state().frame
    }

    /// Tick interval in use.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start animating, optionally replacing the text first.
    ///
    /// Already running: only the text changes. On a console that is not
    /// interactive the text is stored and nothing is drawn.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CursorProtocol`] when the terminal does not
    /// report the cursor position. The cursor is visible again and raw mode
    /// restored by the time the error is returned.
    pub async fn start(&mut self, text: Option<&str>) -> Result<()> {
        {
            let mut state = self.state();
            if let Some(text) = text {
                state.text = text.to_string();
            }
            if state.running {
                return Ok(());
            }
        }
        if !self.console.is_interactive() {
            tracing::debug!("console is not interactive, spinner stays idle");
            return Ok(());
        }

        {
            let mut out = self.console.stdout().lock();
            out.queue(Hide)?;
            out.flush()?;
        }

        let position = match cursor::query_position(&self.console, self.query_timeout).await {
            Ok(position) => position,
            Err(err) => {
                self.show_cursor();
                return Err(err);
            }
        };

        {
            let mut state = self.state();
            state.anchor_row = position.row0();
            state.frame = 0;
            state.rendered_lines = 0;
            state.running = true;
        }
        tracing::debug!(row = position.row, interval = ?self.interval, "spinner started");

        let state = Arc::clone(&self.state);
        let console = self.console.clone();
        let look = self.look.clone();
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if !tick_once(&state, &console, &look) {
                    break;
                }
            }
        });
        self.ticker = Some(Ticker { task });
        Ok(())
    }

    /// Stop animating, optionally clearing the drawn region, and show the
    /// cursor again. Does nothing when not running.
    pub fn stop(&mut self, clear: bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.running {
            return;
        }
        state.running = false;
        self.ticker = None;

        let mut out = self.console.stdout().lock();
        if let Err(err) = state.release(&mut **out, clear) {
            tracing::debug!(%err, "failed to restore terminal after spinner");
        }
        tracing::debug!(clear, "spinner stopped");
    }

    /// Stop and erase the spinner line.
    pub fn stop_and_clear(&mut self) {
        self.stop(true);
    }

    /// Stop and leave the last frame on screen, moving the cursor to the
    /// line below it.
    pub fn complete(&mut self) {
        let was_running = self.is_running();
        self.stop(false);
        if !was_running {
            return;
        }
        let state = self.state();
        let mut out = self.console.stdout().lock();
        if let Err(err) = state.move_below(&mut **out) {
            tracing::debug!(%err, "failed to move below spinner");
        }
    }

    /// Stop, clear, and write `line` in place of the spinner.
    pub fn stop_and_persist(&mut self, line: &str) {
        self.stop(true);
        if let Err(err) = self.console.stdout().write_line(line) {
            tracing::debug!(%err, "failed to write persisted line");
        }
    }

    fn persist_with(&mut self, symbol: &str, style: Style, text: Option<&str>) {
        let text = text.map_or_else(|| self.text(), str::to_string);
        let line = style.paint(&format!("{symbol} {text}"));
        self.stop_and_persist(&line);
    }

    /// Finish with a green `✔` line.
    pub fn succeed(&mut self, text: Option<&str>) {
        self.persist_with("✔", Style::Green, text);
    }

    /// Finish with a red `✖` line.
    pub fn fail(&mut self, text: Option<&str>) {
        self.persist_with("✖", Style::Red, text);
    }

    /// Finish with a yellow `*` line, for work that completed with warnings.
    pub fn mixed(&mut self, text: Option<&str>) {
        self.persist_with("*", Style::Yellow, text);
    }

    fn show_cursor(&self) {
        let mut out = self.console.stdout().lock();
        let result = out.queue(Show).and_then(|out| out.flush());
        if let Err(err) = result {
            tracing::debug!(%err, "failed to show cursor");
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop(false);
    }
}
