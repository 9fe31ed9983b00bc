//! Cursor-position query protocol
//!
//! The terminal is asked where the cursor is by writing `ESC [ 6 n`. It
//! answers on the input stream with `ESC [ <row> ; <col> R`. Replies only
//! arrive unbuffered, so the input is switched into raw mode for the exchange
//! and put back the way it was on every exit path.
//!
//! On the real terminal the exchange goes through crossterm's event reader,
//! whose reads are bounded; scripted consoles supply the reply bytes directly.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::bytes::Regex;
use tokio::io::AsyncReadExt;

use crate::console::{Console, ReplySource, TerminalControl};
use crate::error::{Error, Result};

/// Escape sequence requesting a cursor position report.
pub const POSITION_REQUEST: &str = "\x1b[6n";

/// Longest reply accepted before giving up.
const MAX_REPLY_LEN: usize = 32;

static REPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\x1b\[(\d+);(\d+)R$").expect("cursor reply pattern is valid")
});

/// A cursor position as reported by the terminal (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    /// Row, starting at 1
    pub row: u16,
    /// Column, starting at 1
    pub col: u16,
}

impl CursorPosition {
    /// Zero-based row, as crossterm cursor commands expect.
    pub fn row0(self) -> u16 {
        self.row.saturating_sub(1)
    }
}

/// Raw mode held for the lifetime of the guard; the prior mode is restored on drop.
struct RawModeGuard {
    control: Arc<dyn TerminalControl>,
    was_raw: bool,
}

impl RawModeGuard {
    fn acquire(control: &Arc<dyn TerminalControl>) -> Result<Self> {
        let was_raw = control.is_raw_mode()?;
        if !was_raw {
            control.set_raw_mode(true)?;
        }
        Ok(Self {
            control: Arc::clone(control),
            was_raw,
        })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_raw
            && let Err(err) = self.control.set_raw_mode(false)
        {
            tracing::debug!(%err, "failed to restore terminal mode");
        }
    }
}

/// Ask the terminal for the cursor position and wait up to `timeout` for the reply.
///
/// # Errors
///
/// Returns [`Error::CursorProtocol`] when the reply is missing, truncated or
/// malformed, and [`Error::Io`] if raw mode cannot be toggled. Raw mode is
/// restored before either is returned.
pub async fn query_position(console: &Console, timeout: Duration) -> Result<CursorPosition> {
    let _raw = RawModeGuard::acquire(console.control())?;

    let position = match console.replies() {
        ReplySource::Terminal => query_terminal(timeout).await?,
        ReplySource::Stream(input) => {
            console.stdout().write_raw(POSITION_REQUEST)?;
            let mut input = input.lock().await;
            let reply = tokio::time::timeout(timeout, read_reply(&mut **input))
                .await
                .map_err(|_| no_reply(timeout))??;
            parse_reply(&reply)?
        }
    };
    tracing::trace!(row = position.row, col = position.col, "cursor position");
    Ok(position)
}

fn no_reply(timeout: Duration) -> Error {
    Error::cursor_protocol(format!("no reply within {}ms", timeout.as_millis()))
}

/// Ask the controlling terminal through crossterm, which writes the request
/// itself and gives up on its own after two seconds.
async fn query_terminal(timeout: Duration) -> Result<CursorPosition> {
    let (col, row) = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(crossterm::cursor::position),
    )
    .await
    .map_err(|_| no_reply(timeout))?
    .map_err(|err| Error::cursor_protocol(format!("cursor query task failed: {err}")))?
    .map_err(|err| Error::cursor_protocol(err.to_string()))?;
    Ok(CursorPosition {
        row: row.saturating_add(1),
        col: col.saturating_add(1),
    })
}

/// Read one reply: skip anything before `ESC`, stop at `R`.
async fn read_reply<R>(input: &mut R) -> Result<Vec<u8>>
where
    R: tokio::io::AsyncRead + Unpin + ?Sized,
{
    let mut reply = Vec::with_capacity(MAX_REPLY_LEN);
    let mut byte = [0u8; 1];
    loop {
        if input.read(&mut byte).await? == 0 {
            return Err(Error::cursor_protocol(format!(
                "input closed after {} bytes",
                reply.len()
            )));
        }
        match byte[0] {
            0x1b => {
                reply.clear();
                reply.push(0x1b);
            }
            // Typed-ahead input before the reply starts
            _ if reply.is_empty() => {}
            b'R' => {
                reply.push(b'R');
                return Ok(reply);
            }
            other => {
                reply.push(other);
                if reply.len() >= MAX_REPLY_LEN {
                    return Err(Error::cursor_protocol("reply too long"));
                }
            }
        }
    }
}

/// Parse `ESC [ row ; col R`.
///
/// # Errors
///
/// Returns [`Error::CursorProtocol`] if `reply` does not match the pattern.
pub fn parse_reply(reply: &[u8]) -> Result<CursorPosition> {
    let malformed = || {
        Error::cursor_protocol(format!(
            "malformed reply {:?}",
            String::from_utf8_lossy(reply)
        ))
    };
    let caps = REPLY.captures(reply).ok_or_else(malformed)?;
    let number = |idx: usize| -> Result<u16> {
        std::str::from_utf8(&caps[idx])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(malformed)
    };
    Ok(CursorPosition {
        row: number(1)?,
        col: number(2)?,
    })
}
