//! Text decoration
//!
//! Every style wraps text in an ANSI start/reset pair. Setting the `NO_COLOR`
//! environment variable (to any value) turns every style into the identity
//! function. The variable is read on each call so it can change at runtime.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Environment variable that disables all styling when present.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Returns true unless `NO_COLOR` is set.
pub fn colors_enabled() -> bool {
    std::env::var_os(NO_COLOR_ENV).is_none()
}

/// A named text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Style {
    /// Bold weight
    Bold,
    /// Green foreground
    Green,
    /// Yellow foreground
    Yellow,
    /// Yellow from the 256-colour palette
    Yellow2,
    /// Red foreground
    Red,
    /// Bright magenta foreground
    MagentaBright,
    /// Bright cyan foreground
    CyanBright,
    /// White foreground
    White,
    /// Gray foreground
    Gray,
    /// Black on magenta
    BgMagentaBlack,
    /// Black on cyan
    BgCyanBlack,
    /// Black on yellow
    BgYellowBlack,
    /// Black on red
    BgRedBlack,
    /// White on red
    BgRedWhite,
    /// Black on green
    BgGreenBlack,
    /// Black on blue
    BgBlueBlack,
}

impl Style {
    /// Every style, in declaration order.
    pub const ALL: [Style; 16] = [
        Style::Bold,
        Style::Green,
        Style::Yellow,
        Style::Yellow2,
        Style::Red,
        Style::MagentaBright,
        Style::CyanBright,
        Style::White,
        Style::Gray,
        Style::BgMagentaBlack,
        Style::BgCyanBlack,
        Style::BgYellowBlack,
        Style::BgRedBlack,
        Style::BgRedWhite,
        Style::BgGreenBlack,
        Style::BgBlueBlack,
    ];

    /// The `(start, reset)` escape pair for this style.
    pub fn codes(self) -> (&'static str, &'static str) {
        match self {
            Style::Bold => ("\x1b[1m", "\x1b[0m"),
            Style::Green => ("\x1b[32m", "\x1b[39m"),
            Style::Yellow => ("\x1b[33m", "\x1b[39m"),
            Style::Yellow2 => ("\x1b[38;5;3m", "\x1b[39m"),
            Style::Red => ("\x1b[31m", "\x1b[39m"),
            Style::MagentaBright => ("\x1b[95m", "\x1b[39m"),
            Style::CyanBright => ("\x1b[96m", "\x1b[39m"),
            Style::White => ("\x1b[37m", "\x1b[39m"),
            Style::Gray => ("\x1b[90m", "\x1b[39m"),
            Style::BgMagentaBlack => ("\x1b[45m\x1b[30m", "\x1b[39m\x1b[49m"),
            Style::BgCyanBlack => ("\x1b[46m\x1b[30m", "\x1b[39m\x1b[49m"),
            Style::BgYellowBlack => ("\x1b[43m\x1b[30m", "\x1b[39m\x1b[49m"),
            Style::BgRedBlack => ("\x1b[41m\x1b[30m", "\x1b[39m\x1b[49m"),
            Style::BgRedWhite => ("\x1b[41m\x1b[97m", "\x1b[39m\x1b[49m"),
            Style::BgGreenBlack => ("\x1b[42m\x1b[30m", "\x1b[39m\x1b[49m"),
            Style::BgBlueBlack => ("\x1b[44m\x1b[30m", "\x1b[39m\x1b[49m"),
        }
    }

    /// Canonical snake_case name, as accepted by [`Style::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Style::Bold => "bold",
            Style::Green => "green",
            Style::Yellow => "yellow",
            Style::Yellow2 => "yellow2",
            Style::Red => "red",
            Style::MagentaBright => "magenta_bright",
            Style::CyanBright => "cyan_bright",
            Style::White => "white",
            Style::Gray => "gray",
            Style::BgMagentaBlack => "bg_magenta_black",
            Style::BgCyanBlack => "bg_cyan_black",
            Style::BgYellowBlack => "bg_yellow_black",
            Style::BgRedBlack => "bg_red_black",
            Style::BgRedWhite => "bg_red_white",
            Style::BgGreenBlack => "bg_green_black",
            Style::BgBlueBlack => "bg_blue_black",
        }
    }

    /// Style `text`, unless `NO_COLOR` is set.
    pub fn paint(self, text: &str) -> String {
        self.paint_if(text, colors_enabled())
    }

    /// Style `text` only when `enabled` is true.
    pub fn paint_if(self, text: &str, enabled: bool) -> String {
        if !enabled {
            return text.to_string();
        }
        let (start, reset) = self.codes();
        format!("{start}{text}{reset}")
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace('-', "_").to_ascii_lowercase();
        Style::ALL
            .into_iter()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| Error::Config(format!("unknown color: {s}")))
    }
}

impl TryFrom<String> for Style {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Remove ANSI CSI sequences (`ESC [ ... final`) from `text`.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Parameters and intermediates, then a single final byte in 0x40..=0x7e
            for next in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&next) {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_with_codes() {
        assert_eq!(Style::Green.paint_if("ok", true), "\x1b[32mok\x1b[39m");
        assert_eq!(
            Style::BgBlueBlack.paint_if("hdr", true),
            "\x1b[44m\x1b[30mhdr\x1b[39m\x1b[49m"
        );
        assert_eq!(Style::Bold.paint_if("b", true), "\x1b[1mb\x1b[0m");
    }

    #[test]
    fn test_disabled_is_identity() {
        for style in Style::ALL {
            assert_eq!(style.paint_if("plain text", false), "plain text");
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("green".parse::<Style>().unwrap(), Style::Green);
        assert_eq!("magenta-bright".parse::<Style>().unwrap(), Style::MagentaBright);
        assert_eq!("BG_RED_WHITE".parse::<Style>().unwrap(), Style::BgRedWhite);
        assert!("chartreuse".parse::<Style>().is_err());

        for style in Style::ALL {
            assert_eq!(style.name().parse::<Style>().unwrap(), style);
        }
    }

    #[test]
    fn test_strip_ansi() {
        for style in Style::ALL {
            assert_eq!(strip_ansi(&style.paint_if("abc", true)), "abc");
        }
        assert_eq!(strip_ansi("\x1b[?25lhidden\x1b[2K"), "hidden");
        assert_eq!(strip_ansi("no escapes"), "no escapes");
    }
}
