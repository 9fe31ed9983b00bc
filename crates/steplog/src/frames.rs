//! Spinner frame sets
//!
//! Each set is an ordered list of glyphs plus the tick interval it looks
//! right at.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// One spinner animation style.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FrameSet {
    /// Lookup name
    pub name: &'static str,
    /// Default tick interval in milliseconds
    pub interval_ms: u64,
    /// Glyphs, shown in order
    pub frames: &'static [&'static str],
}

impl fmt::Debug for FrameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSet")
            .field("name", &self.name)
            .field("interval_ms", &self.interval_ms)
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// Braille dots
pub const DOTS: FrameSet = FrameSet {
    name: "dots",
    interval_ms: 80,
    frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
};

/// Dense braille dots
pub const DOTS2: FrameSet = FrameSet {
    name: "dots2",
    interval_ms: 80,
    frames: &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
};

/// Classic ASCII line
pub const LINE: FrameSet = FrameSet {
    name: "line",
    interval_ms: 130,
    frames: &["-", "\\", "|", "/"],
};

/// Rotating arc
pub const ARC: FrameSet = FrameSet {
    name: "arc",
    interval_ms: 100,
    frames: &["◜", "◠", "◝", "◞", "◡", "◟"],
};

/// All built-in frame sets.
pub const BUILTIN: [FrameSet; 4] = [DOTS, DOTS2, LINE, ARC];

impl FrameSet {
    /// Look up a built-in set by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown name.
    pub fn by_name(name: &str) -> Result<FrameSet, Error> {
        BUILTIN
            .into_iter()
            .find(|set| set.name == name)
            .ok_or_else(|| Error::Config(format!("unknown spinner: {name}")))
    }

    /// Default tick interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the set has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Glyph at `index`, wrapping past the end.
    pub fn glyph(&self, index: usize) -> &'static str {
        if self.frames.is_empty() {
            return "";
        }
        self.frames[index % self.frames.len()]
    }
}

impl<'de> Deserialize<'de> for FrameSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        FrameSet::by_name(&name).map_err(serde::de::Error::custom)
    }
}

impl Default for FrameSet {
    fn default() -> Self {
        DOTS
    }
}
