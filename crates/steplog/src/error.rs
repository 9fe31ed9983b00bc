//! Error types shared by the logger, spinner and configuration layers

use thiserror::Error;

/// Errors raised by steplog.
#[derive(Error, Debug)]
pub enum Error {
    /// A level name that is not part of the level table.
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// A message template referenced a placeholder other than
    /// `timestamp`, `level`, `context` or `message`.
    #[error("Invalid message format: {{{0}}}")]
    InvalidFormatPlaceholder(String),

    /// The terminal did not answer a cursor position request with `ESC [ row ; col R`.
    #[error("Cursor position query failed: {0}")]
    CursorProtocol(String),

    /// A configuration value could not be used.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading from or writing to a stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a cursor protocol error from any displayable reason.
    pub fn cursor_protocol(reason: impl std::fmt::Display) -> Self {
        Self::CursorProtocol(reason.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
