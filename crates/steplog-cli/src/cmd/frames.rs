//! Frames command

use steplog::frames::BUILTIN;

/// Print every built-in frame set with its interval and glyphs.
pub fn frames() {
    let width = BUILTIN.iter().map(|set| set.name.len()).max().unwrap_or(0);
    for set in BUILTIN {
        println!(
            "{:<width$}  {:>4}ms  {}",
            set.name,
            set.interval_ms,
            set.frames.join(" "),
        );
    }
}
