//! Severity levels and their filtering weights
//!
//! A message at level `L` passes a threshold `T` iff `L.weight() >= T.weight()`.
//! `All` and `Off` are sentinels: they make sense as thresholds only.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::color::Style;
use crate::error::Error;

/// A named severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    /// Threshold that lets everything through
    All,
    /// Very chatty diagnostics
    Verbose,
    /// Debug output
    Debug,
    /// Plain log line
    Log,
    /// Informational message
    #[default]
    Info,
    /// Start of a major phase
    Chapter,
    /// Title banner
    Title,
    /// Header banner
    Header,
    /// Section banner
    Section,
    /// Highlighted note
    Note,
    /// Something looks wrong
    Warn,
    /// Something failed
    Error,
    /// Unrecoverable failure
    Fatal,
    /// Threshold that silences everything
    Off,
}

impl LogLevel {
    /// Every level, ordered by weight.
    pub const ALL: [LogLevel; 14] = [
        LogLevel::All,
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Log,
        LogLevel::Info,
        LogLevel::Chapter,
        LogLevel::Title,
        LogLevel::Header,
        LogLevel::Section,
        LogLevel::Note,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Off,
    ];

    /// Numeric filtering weight.
    pub const fn weight(self) -> u8 {
        match self {
            LogLevel::All => 0,
            LogLevel::Verbose => 5,
            LogLevel::Debug => 10,
            LogLevel::Log | LogLevel::Info => 50,
            LogLevel::Chapter
            | LogLevel::Title
            | LogLevel::Header
            | LogLevel::Section
            | LogLevel::Note => 60,
            LogLevel::Warn => 80,
            LogLevel::Error => 95,
            LogLevel::Fatal => 100,
            LogLevel::Off => u8::MAX,
        }
    }

    /// Whether a message at `self` is emitted under `threshold`.
    pub const fn passes(self, threshold: LogLevel) -> bool {
        self.weight() >= threshold.weight()
    }

    /// `All` and `Off` bound the table but are not message levels.
    pub const fn is_sentinel(self) -> bool {
        matches!(self, LogLevel::All | LogLevel::Off)
    }

    /// Levels from `info` up to (not including) `warn` share the info label.
    pub const fn in_info_band(self) -> bool {
        self.weight() >= LogLevel::Info.weight() && self.weight() < LogLevel::Warn.weight()
    }

    /// Lowercase name as used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::All => "all",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Chapter => "chapter",
            LogLevel::Title => "title",
            LogLevel::Header => "header",
            LogLevel::Section => "section",
            LogLevel::Note => "note",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Off => "off",
        }
    }

    /// Colour applied to message text at this level.
    pub fn style(self) -> Style {
        match self {
            LogLevel::Debug => Style::MagentaBright,
            LogLevel::Warn => Style::Yellow,
            LogLevel::Error => Style::Red,
            LogLevel::Fatal => Style::BgRedWhite,
            LogLevel::Verbose => Style::CyanBright,
            LogLevel::Chapter => Style::BgMagentaBlack,
            LogLevel::Title => Style::BgCyanBlack,
            LogLevel::Header => Style::BgBlueBlack,
            LogLevel::Section => Style::BgGreenBlack,
            LogLevel::Note => Style::BgYellowBlack,
            LogLevel::Info => Style::Green,
            LogLevel::Log => Style::Gray,
            LogLevel::All | LogLevel::Off => Style::White,
        }
    }

    /// Whether lines at this level go to stderr.
    pub const fn uses_stderr(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.name() == wanted)
            .ok_or_else(|| Error::InvalidLogLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtering_matches_weights() {
        for message in LogLevel::ALL {
            for threshold in LogLevel::ALL {
                assert_eq!(
                    message.passes(threshold),
                    message.weight() >= threshold.weight(),
                    "{message} under {threshold}"
                );
            }
        }
    }

    #[test]
    fn test_table_is_ordered() {
        let weights: Vec<u8> = LogLevel::ALL.iter().map(|l| l.weight()).collect();
        assert!(weights.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(LogLevel::Info.weight(), LogLevel::Log.weight());
        assert!(LogLevel::Chapter.weight() > LogLevel::Info.weight());
        assert!(LogLevel::Chapter.weight() < LogLevel::Warn.weight());
    }

    #[test]
    fn test_sentinels() {
        for level in LogLevel::ALL {
            assert!(level.passes(LogLevel::All));
            assert_eq!(level.passes(LogLevel::Off), level == LogLevel::Off);
        }
        assert!(LogLevel::All.is_sentinel());
        assert!(LogLevel::Off.is_sentinel());
        assert!(!LogLevel::Fatal.is_sentinel());
    }

    #[test]
    fn test_info_band() {
        assert!(LogLevel::Log.in_info_band());
        assert!(LogLevel::Info.in_info_band());
        assert!(LogLevel::Note.in_info_band());
        assert!(!LogLevel::Debug.in_info_band());
        assert!(!LogLevel::Warn.in_info_band());
    }

    #[test]
    fn test_parse() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" Chapter ".parse::<LogLevel>().unwrap(), LogLevel::Chapter);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(Error::InvalidLogLevel(name)) if name == "loud"
        ));
        for level in LogLevel::ALL {
            assert_eq!(level.name().parse::<LogLevel>().unwrap(), level);
        }
    }

    #[test]
    fn test_stream_routing() {
        let stderr: Vec<LogLevel> = LogLevel::ALL
            .into_iter()
            .filter(|l| l.uses_stderr())
            .collect();
        assert_eq!(stderr, vec![LogLevel::Error, LogLevel::Fatal]);
    }
}
