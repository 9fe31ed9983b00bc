//! Configuration loading
//!
//! Lookup order: an explicit path, then `STEPLOG_CONFIG`, then
//! `<config dir>/steplog/config.toml`, then built-in defaults. Environment
//! overrides are applied on top of whatever was loaded.
//!
//! ```toml
//! [logger]
//! level = "debug"
//! message_format = "{level} {message}"
//!
//! [spinner]
//! frames = "line"
//! suffix = ""
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::console::Console;
use crate::error::{Error, Result};
use crate::frames::FrameSet;
use crate::logger::{Logger, LoggerOptions};
use crate::spinner::{Spinner, SpinnerOptions};

/// Path of a config file to load instead of the default one.
pub const CONFIG_ENV: &str = "STEPLOG_CONFIG";
/// Overrides `logger.level`.
pub const LEVEL_ENV: &str = "STEPLOG_LEVEL";
/// Overrides `logger.message_format`.
pub const MESSAGE_FORMAT_ENV: &str = "STEPLOG_MESSAGE_FORMAT";
/// Overrides `logger.timestamp_format`.
pub const TIMESTAMP_FORMAT_ENV: &str = "STEPLOG_TIMESTAMP_FORMAT";
/// Overrides `spinner.frames`.
pub const SPINNER_ENV: &str = "STEPLOG_SPINNER";

/// Default config file: `<config dir>/steplog/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("steplog").join("config.toml"))
}

/// Logger and spinner settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[logger]` table
    pub logger: LoggerOptions,
    /// `[spinner]` table
    pub spinner: SpinnerOptions,
}

impl Config {
    /// Parse TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed TOML, an unknown level, colour
    /// or frame set.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    /// Load from the standard locations and the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load_with`].
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, default_path().as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load with an explicit fallback path and environment lookup.
    ///
    /// A missing `fallback` file means defaults; a missing explicit or
    /// `STEPLOG_CONFIG` file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unreadable or invalid files and
    /// [`Error::InvalidLogLevel`] for a bad `STEPLOG_LEVEL`.
    pub fn load_with<F>(explicit: Option<&Path>, fallback: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = lookup(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load_file(&path)?
            }
            None => match fallback {
                Some(path) if path.exists() => {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::load_file(path)?
                }
                _ => {
                    tracing::debug!("no config file, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `STEPLOG_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogLevel`] for an unknown level and
    /// [`Error::Config`] for an unknown frame set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LEVEL_ENV) {
            self.logger.level = level.parse()?;
            tracing::debug!(level = %self.logger.level, "level overridden");
        }
        if let Some(format) = lookup(MESSAGE_FORMAT_ENV) {
            self.logger.message_format = format;
        }
        if let Some(format) = lookup(TIMESTAMP_FORMAT_ENV) {
            self.logger.timestamp_format = format;
        }
        if let Some(name) = lookup(SPINNER_ENV) {
            self.spinner.frames = FrameSet::by_name(&name)?;
        }
        Ok(())
    }

    /// A logger named `name` on `console` with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormatPlaceholder`] if the message format is invalid.
    pub fn logger(&self, name: &str, console: &Console) -> Result<Logger> {
        Logger::with_console(name, self.logger.clone(), console)
    }

    /// A spinner on `console` with these settings.
    pub fn spinner(&self, console: &Console) -> Spinner {
        Spinner::new(self.spinner.clone(), console.clone())
    }
}
