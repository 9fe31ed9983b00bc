//! steplog - leveled console output and step spinners from the command line
//!
//! Thin command-line front end over the `steplog` library: write single log
//! lines, list the spinner frame sets, or run a simulated operation to see
//! the spinner, the logger and the final status line working together.

#![allow(clippy::missing_errors_doc)]

pub mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Diagnostics shown when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIAGNOSTICS: &str = "warn";

/// Filter for the stderr diagnostics subscriber, from a `RUST_LOG` value.
pub fn diagnostics_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIAGNOSTICS))
}

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "steplog")]
#[command(author, version, about = "steplog - leveled console output and step spinners")]
pub struct Cli {
    /// Config file to load instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write one log line
    Log {
        /// Level to log at (verbose, debug, log, info, note, warn, error, fatal, ...)
        #[arg(short, long, default_value = "info")]
        level: String,
        /// Context shown in brackets
        #[arg(short, long, default_value = "")]
        name: String,
        /// Message template, e.g. "{level} {message}"
        #[arg(short, long)]
        format: Option<String>,
        /// JSON value appended to the message, rendered indented
        #[arg(long)]
        json: Option<String>,
        /// Words of the message
        #[arg(required_unless_present = "json")]
        words: Vec<String>,
    },
    /// Run a simulated operation with a live spinner
    Demo {
        /// Number of steps
        #[arg(long, default_value_t = 5)]
        steps: usize,
        /// Step that reports a warning
        #[arg(long)]
        warn_at: Option<usize>,
        /// Step that reports an error
        #[arg(long)]
        error_at: Option<usize>,
        /// Time spent on each step
        #[arg(long, default_value_t = 400)]
        delay_ms: u64,
        /// Frame set to animate with
        #[arg(long)]
        frames: Option<String>,
        /// Fail the operation even without errors
        #[arg(long)]
        fail: bool,
    },
    /// List the built-in spinner frame sets
    Frames,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_diagnostics_default_to_warn() {
        assert_eq!(diagnostics_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            diagnostics_filter(Some("steplog=loudest")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
        assert_eq!(diagnostics_filter(Some(" ")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            diagnostics_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }
}
