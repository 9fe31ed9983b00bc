//! Operation - one long-running, steppable unit of work
//!
//! An operation pairs a [`Logger`] with a [`Spinner`]. Steps only change the
//! spinner text; errors and warnings are collected, and written through the
//! logger with the spinner cleared out of the way first. `finish` picks the
//! final glyph from what was collected.

use std::fmt;

use crate::console::Console;
use crate::error::Result;
use crate::logger::{Logger, LoggerOptions};
use crate::spinner::{Spinner, SpinnerOptions};

/// Message persisted by [`Operation::finish`] when none is given.
pub const DEFAULT_FINISH_MESSAGE: &str = "Done.";

/// Context name used by operations built from a console.
pub const OPERATION_CONTEXT: &str = "Operation";

/// The persisted outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Green `✔`
    Succeeded,
    /// Yellow `*`: finished, with warnings
    Mixed,
    /// Red `✖`
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Mixed => "mixed",
            Outcome::Failed => "failed",
        })
    }
}

/// A named unit of work with a live spinner and collected problems.
#[derive(Debug)]
pub struct Operation {
    name: String,
    logger: Logger,
    spinner: Spinner,
    step_count: usize,
    step_total: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Operation {
    /// Assemble an operation from its parts.
    pub fn new(name: impl Into<String>, logger: Logger, spinner: Spinner) -> Self {
        Self {
            name: name.into(),
            logger,
            spinner,
            step_count: 0,
            step_total: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// An operation logging as `Operation` with default options on `console`.
    ///
    /// # Errors
    ///
    /// Never fails with default options; kept fallible for custom formats.
    pub fn with_console(name: impl Into<String>, console: &Console) -> Result<Self> {
        let logger = Logger::with_console(OPERATION_CONTEXT, LoggerOptions::default(), console)?;
        let spinner = Spinner::new(SpinnerOptions::default(), console.clone());
        Ok(Self::new(name, logger, spinner))
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Errors reported so far, oldest first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings reported so far, oldest first.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// `(completed, total)` steps.
    pub fn progress(&self) -> (usize, usize) {
        (self.step_count, self.step_total)
    }

    /// The spinner shown while the operation runs.
    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    /// Log the operation name and start the spinner.
    ///
    /// With `total_steps > 0`, each [`step`](Self::step) is prefixed with a
    /// `count/total` counter.
    ///
    /// # Errors
    ///
    /// Propagates a failed cursor-position query from the spinner.
    pub async fn start(&mut self, total_steps: usize) -> Result<()> {
        self.step_total = total_steps;
        self.step_count = 0;
        self.logger.info([self.name.as_str()]);
        tracing::debug!(operation = %self.name, total_steps, "operation started");
        self.spinner.start(None).await
    }

    /// Show `message` as the current step. Nothing is logged.
    pub fn step(&mut self, message: &str) {
        let text = if self.step_total > 0 {
            self.step_count += 1;
            format!("{}/{} {message}", self.step_count, self.step_total)
        } else {
            message.to_string()
        };
        self.spinner.set_text(text);
    }

    /// Replace the spinner text without counting a step.
    pub fn log(&self, message: &str) {
        self.spinner.set_text(message);
    }

    /// Record and log an error, keeping the spinner out of the way.
    ///
    /// # Errors
    ///
    /// Propagates a failed cursor-position query when the spinner resumes.
    pub async fn error(&mut self, message: &str) -> Result<()> {
        self.errors.push(message.to_string());
        let resume = self.pause();
        self.logger.error(message);
        self.resume(resume).await
    }

    /// Record and log a warning, keeping the spinner out of the way.
    ///
    /// # Errors
    ///
    /// Propagates a failed cursor-position query when the spinner resumes.
    pub async fn warn(&mut self, message: &str) -> Result<()> {
        self.warnings.push(message.to_string());
        let resume = self.pause();
        self.logger.warn([message]);
        self.resume(resume).await
    }

    fn pause(&mut self) -> bool {
        let was_running = self.spinner.is_running();
        self.spinner.stop_and_clear();
        was_running
    }

    async fn resume(&mut self, was_running: bool) -> Result<()> {
        if was_running {
            self.spinner.start(None).await?;
        }
        Ok(())
    }

    /// Stop the spinner and persist the final line.
    ///
    /// Errors win over warnings: the message gets an `(N errors)` suffix if
    /// any error was reported, otherwise `(N warnings)` if any warning was.
    /// `forced_failure` fails the operation even without errors.
    pub fn finish(mut self, message: Option<&str>, forced_failure: bool) -> Outcome {
        let mut message = message.unwrap_or(DEFAULT_FINISH_MESSAGE).to_string();
        if !self.errors.is_empty() {
            message = format!("{message} ({} errors)", self.errors.len());
        } else if !self.warnings.is_empty() {
            message = format!("{message} ({} warnings)", self.warnings.len());
        }

        let outcome = if forced_failure || !self.errors.is_empty() {
            Outcome::Failed
        } else if !self.warnings.is_empty() {
            Outcome::Mixed
        } else {
            Outcome::Succeeded
        };

        self.spinner.stop_and_clear();
        match outcome {
            Outcome::Succeeded => self.spinner.succeed(Some(&message)),
            Outcome::Mixed => self.spinner.mixed(Some(&message)),
            Outcome::Failed => self.spinner.fail(Some(&message)),
        }
        tracing::debug!(operation = %self.name, %outcome, "operation finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::strip_ansi;
    use crate::console::{Captured, FixedTerminal};
    use crate::cursor::POSITION_REQUEST;
    use crate::frames::LINE;
    use crate::level::LogLevel;
    use std::sync::Arc;
    use std::time::Duration;

    fn plain_logger(console: &Console) -> Logger {
        let options = LoggerOptions {
            level: LogLevel::All,
            message_format: "{level} {context} {message}".to_string(),
            ..LoggerOptions::default()
        };
        Logger::with_console(OPERATION_CONTEXT, options, console).unwrap()
    }

    fn captured_operation() -> (Operation, Captured) {
        let (console, captured) = Console::captured();
        let logger = plain_logger(&console);
        let spinner = Spinner::new(SpinnerOptions::default(), console);
        (Operation::new("Build", logger, spinner), captured)
    }

    fn last_line(buffer: &crate::sink::SharedBuffer) -> String {
        strip_ansi(&buffer.contents())
            .lines()
            .last()
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_finish_outcome_table() {
        let cases: [(usize, usize, bool, Outcome, &str); 6] = [
            (0, 0, false, Outcome::Succeeded, "✔ Done."),
            (0, 2, false, Outcome::Mixed, "* Done. (2 warnings)"),
            (1, 0, false, Outcome::Failed, "✖ Done. (1 errors)"),
            (3, 4, false, Outcome::Failed, "✖ Done. (3 errors)"),
            (0, 0, true, Outcome::Failed, "✖ Done."),
            (0, 1, true, Outcome::Failed, "✖ Done. (1 warnings)"),
        ];
        for (errors, warnings, forced, expected, line) in cases {
            let (mut op, captured) = captured_operation();
            op.start(0).await.unwrap();
            for i in 0..errors {
                op.error(&format!("e{i}")).await.unwrap();
            }
            for i in 0..warnings {
                op.warn(&format!("w{i}")).await.unwrap();
            }
            assert_eq!(op.finish(None, forced), expected);
            assert_eq!(last_line(&captured.stdout), line);
        }
    }

    #[tokio::test]
    async fn test_start_logs_name() {
        let (mut op, captured) = captured_operation();
        op.start(3).await.unwrap();
        assert_eq!(
            strip_ansi(&captured.stdout.contents()),
            "   INFO [Operation] Build\n"
        );
    }

    #[tokio::test]
    async fn test_steps_are_counted_when_total_known() {
        let (mut op, _) = captured_operation();
        op.start(2).await.unwrap();
        op.step("fetch");
        assert_eq!(op.spinner().text(), "1/2 fetch");
        op.step("unpack");
        assert_eq!(op.spinner().text(), "2/2 unpack");
        assert_eq!(op.progress(), (2, 2));

        op.log("free text");
        assert_eq!(op.spinner().text(), "free text");
        assert_eq!(op.progress(), (2, 2));
    }

    #[tokio::test]
    async fn test_steps_without_total_are_plain() {
        let (mut op, captured) = captured_operation();
        op.start(0).await.unwrap();
        captured.stdout.clear();
        op.step("working");
        assert_eq!(op.spinner().text(), "working");
        assert_eq!(captured.stdout.contents(), "");
    }

    #[tokio::test]
    async fn test_problems_are_logged_and_kept() {
        let (mut op, captured) = captured_operation();
        op.start(0).await.unwrap();
        op.warn("slow mirror").await.unwrap();
        op.error("checksum mismatch").await.unwrap();

        assert_eq!(op.warnings(), ["slow mirror"]);
        assert_eq!(op.errors(), ["checksum mismatch"]);
        assert!(strip_ansi(&captured.stdout.contents()).contains("   WARN [Operation] slow mirror"));
        assert_eq!(
            strip_ansi(&captured.stderr.contents()),
            "  ERROR [Operation] checksum mismatch\n"
        );
    }

    #[tokio::test]
    async fn test_error_pauses_and_resumes_spinner() {
        let term = Arc::new(FixedTerminal::new(80, 24));
        let (console, captured) = Console::scripted(b"\x1b[3;1R".repeat(2), term.clone());
        let logger = plain_logger(&console);
        let options = SpinnerOptions {
            frames: LINE,
            interval_ms: Some(5),
            ..SpinnerOptions::default()
        };
        let spinner = Spinner::new(options, console);
        let mut op = Operation::new("Sync", logger, spinner);

        op.start(0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        op.error("lost connection").await.unwrap();
        assert!(op.spinner().is_running());
        assert_eq!(captured.stdout.contents().matches(POSITION_REQUEST).count(), 2);
        assert!(strip_ansi(&captured.stderr.contents()).contains("lost connection"));

        assert_eq!(op.finish(Some("Synced"), false), Outcome::Failed);
        assert!(strip_ansi(&captured.stdout.contents()).ends_with("✖ Synced (1 errors)\n"));
        assert!(!term.raw());
    }
}
