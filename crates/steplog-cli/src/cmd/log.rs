//! Log command

use anyhow::{Context, Result};
use steplog::{Config, Console, Message};

/// Write one line at the level named `level`.
///
/// The line is still filtered by the configured threshold, so
/// `--level debug` prints nothing under the default `info` threshold.
pub fn log(
    config: &Config,
    level: &str,
    name: &str,
    format: Option<&str>,
    json: Option<&str>,
    words: &[String],
) -> Result<()> {
    let console = Console::stdio();
    let mut logger = config
        .logger(name, &console)
        .context("Invalid logger configuration")?;
    if let Some(format) = format {
        logger
            .set_message_format(format)
            .context("Invalid --format")?;
    }

    let mut messages: Vec<Message> = words.iter().map(Message::from).collect();
    if let Some(json) = json {
        let value: serde_json::Value =
            serde_json::from_str(json).context("--json is not valid JSON")?;
        messages.push(Message::from(value));
    }

    logger.log_named(level, messages)?;
    Ok(())
}
