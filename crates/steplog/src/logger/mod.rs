//! Leveled console logger
//!
//! A [`Logger`] has a name (rendered as the `context` field) and
//! [`LoggerOptions`]. Each call is filtered against the threshold first; only
//! lines that pass are stringified, formatted through the message template
//! and written to stdout, or to stderr for `error` and `fatal`.

pub mod message;
pub mod template;
pub mod timestamp;

use std::fmt;
use std::io::{self, Write};

use chrono::{DateTime, Local, TimeZone};
use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use serde::Deserialize;

use crate::color::Style;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::level::LogLevel;
use crate::sink::Sink;

pub use message::{ErrorArgs, MAX_SAFE_INTEGER, Message, stringify};
pub use template::{DEFAULT_MESSAGE_FORMAT, Field, FieldValues, MessageTemplate};
pub use timestamp::DEFAULT_TIMESTAMP_FORMAT;

/// Width the level label is padded to.
const LEVEL_WIDTH: usize = 7;

/// Threshold and layout for a [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Minimum level that is emitted
    pub level: LogLevel,
    /// Layout of the `timestamp` field
    pub timestamp_format: String,
    /// Layout of the whole line
    pub message_format: String,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            message_format: DEFAULT_MESSAGE_FORMAT.to_string(),
        }
    }
}

/// A named, leveled logger writing to injected sinks.
pub struct Logger {
    name: String,
    options: LoggerOptions,
    template: MessageTemplate,
    stdout: Sink,
    stderr: Sink,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

macro_rules! level_methods {
    ($($(#[$doc:meta])* $method:ident => $level:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $method<I>(&self, messages: I)
            where
                I: IntoIterator,
                I::Item: Into<Message>,
            {
                self.log_at_level($level, messages);
            }
        )*
    };
}

impl Logger {
    /// A logger on the process stdout/stderr.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormatPlaceholder`] if the message format is invalid.
    pub fn new(name: impl Into<String>, options: LoggerOptions) -> Result<Self> {
        Self::with_sinks(name, options, Sink::stdout(), Sink::stderr())
    }

    /// A logger with default options on the process streams.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: LoggerOptions::default(),
            template: MessageTemplate::default(),
            stdout: Sink::stdout(),
            stderr: Sink::stderr(),
        }
    }

    /// A logger writing to the sinks of `console`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormatPlaceholder`] if the message format is invalid.
    pub fn with_console(
        name: impl Into<String>,
        options: LoggerOptions,
        console: &Console,
    ) -> Result<Self> {
        Self::with_sinks(
            name,
            options,
            console.stdout().clone(),
            console.stderr().clone(),
        )
    }

    /// A logger writing to explicit sinks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormatPlaceholder`] if the message format is invalid.
    pub fn with_sinks(
        name: impl Into<String>,
        options: LoggerOptions,
        stdout: Sink,
        stderr: Sink,
    ) -> Result<Self> {
        let template = MessageTemplate::parse(&options.message_format)?;
        Ok(Self {
            name: name.into(),
            options,
            template,
            stdout,
            stderr,
        })
    }

    /// The logger's name, shown as its context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current options.
    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    /// Active threshold.
    pub fn level(&self) -> LogLevel {
        self.options.level
    }

    /// Change the threshold.
    pub fn set_level(&mut self, level: LogLevel) {
        self.options.level = level;
    }

    /// Current message format.
    pub fn message_format(&self) -> &str {
        self.template.source()
    }

    /// Replace the message format; the old one stays if `format` is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormatPlaceholder`] for an unknown placeholder.
    pub fn set_message_format(&mut self, format: &str) -> Result<()> {
        self.template = MessageTemplate::parse(format)?;
        self.options.message_format = format.to_string();
        Ok(())
    }

    /// Replace the timestamp format.
    pub fn set_timestamp_format(&mut self, format: impl Into<String>) {
        self.options.timestamp_format = format.into();
    }

    /// Whether a message at `level` would be written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        !level.is_sentinel() && level.passes(self.options.level)
    }

    level_methods! {
        /// Log at `log` level.
        log => LogLevel::Log;
        /// Log at `info` level.
        info => LogLevel::Info;
        /// Log at `warn` level.
        warn => LogLevel::Warn;
        /// Log at `debug` level.
        debug => LogLevel::Debug;
        /// Log at `verbose` level.
        verbose => LogLevel::Verbose;
        /// Log at `fatal` level (stderr).
        fatal => LogLevel::Fatal;
        /// Log at `chapter` level.
        chapter => LogLevel::Chapter;
        /// Log at `title` level.
        title => LogLevel::Title;
        /// Log at `note` level.
        note => LogLevel::Note;
        /// Log at `section` level.
        section => LogLevel::Section;
        /// Log at `header` level.
        header => LogLevel::Header;
    }

    /// Log at `error` level.
    ///
    /// When an error value is supplied its message becomes (part of) the
    /// line, and its debug form is written raw to stderr right after.
    pub fn error(&self, args: impl Into<ErrorArgs>) {
        if !self.enabled(LogLevel::Error) {
            return;
        }
        let (text, trace) = args.into().resolve();
        self.emit(LogLevel::Error, &text);
        if let Some(trace) = trace
            && let Err(err) = self.stderr.write_line(&trace)
        {
            tracing::debug!(%err, "failed to write error trace");
        }
    }

    /// Log `messages` at `level`. Does nothing when `level` is filtered out.
    pub fn log_at_level<I>(&self, level: LogLevel, messages: I)
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, &stringify(messages));
    }

    /// Log at a level given by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogLevel`] when `level` is unknown or is one of
    /// the `all`/`off` bounds.
    pub fn log_named<I>(&self, level: &str, messages: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Message>,
    {
        let parsed: LogLevel = level.parse()?;
        if parsed.is_sentinel() {
            return Err(Error::InvalidLogLevel(level.to_string()));
        }
        self.log_at_level(parsed, messages);
        Ok(())
    }

    /// Format one line for `level` at the current local time.
    pub fn format_line(&self, level: LogLevel, text: &str) -> String {
        self.format_line_at(level, text, &Local::now())
    }

    /// Format one line for `level` at the instant `at`.
    pub fn format_line_at<Tz>(&self, level: LogLevel, text: &str, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let timestamp = if self.template.uses(Field::Timestamp) {
            timestamp::render(&self.options.timestamp_format, at)
        } else {
            String::new()
        };
        let label = level_label(level);
        let context = format_context(&self.name);
        let message = level.style().paint(text);

        self.template.render(&FieldValues {
            timestamp: &timestamp,
            level: &label,
            context: &context,
            message: &message,
        })
    }

    fn emit(&self, level: LogLevel, text: &str) {
        let line = self.format_line(level, text);
        let sink = if level.uses_stderr() {
            &self.stderr
        } else {
            &self.stdout
        };
        if let Err(err) = write_line(sink, &line) {
            tracing::debug!(%err, %level, "failed to write log line");
        }
    }
}

/// Upper-cased, right-aligned level name. Levels in the info band share the
/// `INFO` label and colour.
fn level_label(level: LogLevel) -> String {
    let shown = if level.in_info_band() {
        LogLevel::Info
    } else {
        level
    };
    let label = format!(
        "{:>width$}",
        shown.name().to_uppercase(),
        width = LEVEL_WIDTH
    );
    shown.style().paint(&label)
}

fn format_context(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    Style::Yellow.paint(&format!("[{name}]"))
}

/// Clear the terminal line (when there is one) and write `line` without its
/// trailing whitespace.
fn write_line(sink: &Sink, line: &str) -> io::Result<()> {
    let mut writer = sink.lock();
    if sink.is_terminal() {
        writer.queue(MoveToColumn(0))?;
        writer.queue(Clear(ClearType::CurrentLine))?;
    }
    writeln!(writer, "{}", line.trim_end())?;
    writer.flush()
}
