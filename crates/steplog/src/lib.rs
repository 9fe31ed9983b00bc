//! steplog - leveled console logging and step spinners
//!
//! Colourised, template-formatted log lines for command-line tools, plus an
//! animated spinner that can be interleaved with them safely.
//!
//! # Overview
//!
//! - [`Logger`] filters by [`LogLevel`], formats through a message template
//!   and routes `error`/`fatal` to stderr.
//! - [`Spinner`] anchors itself to the cursor row reported by the terminal
//!   and redraws in place on a background tick.
//! - [`Operation`] combines the two into a steppable unit of work that ends
//!   in a `✔`, `✖` or `*` line.
//!
//! All output goes through a [`Console`], so tests can capture it and script
//! the terminal's replies.
//!
//! ```no_run
//! use steplog::{Console, Operation};
//!
//! # async fn run() -> steplog::Result<()> {
//! let console = Console::stdio();
//! let mut op = Operation::with_console("Deploy", &console)?;
//! op.start(2).await?;
//! op.step("upload");
//! op.warn("slow mirror").await?;
//! op.step("restart");
//! op.finish(None, false);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::doc_markdown)]

pub mod color;
pub mod config;
pub mod console;
pub mod cursor;
pub mod error;
pub mod frames;
pub mod level;
pub mod logger;
pub mod operation;
pub mod sink;
pub mod spinner;

pub use color::Style;
pub use config::Config;
pub use console::{Console, ReplySource, TerminalControl};
pub use error::{Error, Result};
pub use frames::FrameSet;
pub use level::LogLevel;
pub use logger::{ErrorArgs, Logger, LoggerOptions, Message};
pub use operation::{Operation, Outcome};
pub use sink::Sink;
pub use spinner::{Spinner, SpinnerOptions};
