//! Timestamp rendering
//!
//! The timestamp template uses `{unit}` placeholders. Known units are
//! replaced with the zero-padded value for the given instant; unknown ones
//! are left exactly as written.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use super::template::PLACEHOLDER;

/// Default timestamp layout.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "{day}-{month}-{year} {hour}:{minute}:{second}";

fn unit_value<Tz>(unit: &str, at: &DateTime<Tz>) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let value = match unit {
        "year" => at.year().to_string(),
        "month" => at.month().to_string(),
        "day" => at.day().to_string(),
        "hour" => at.hour().to_string(),
        "minute" => at.minute().to_string(),
        "second" => at.second().to_string(),
        "millisecond" => format!("{:03}", at.timestamp_subsec_millis()),
        "weekday" => at.format("%a").to_string(),
        "timeZoneName" => at.format("%Z").to_string(),
        _ => return None,
    };
    Some(format!("{value:0>2}"))
}

/// Render `template` for the instant `at`.
pub fn render<Tz>(template: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            unit_value(&caps[1], at).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
    }

    #[test]
    fn test_default_format_is_zero_padded() {
        assert_eq!(render(DEFAULT_TIMESTAMP_FORMAT, &instant()), "07-03-2024 09:05:02");
    }

    #[test]
    fn test_unknown_units_are_left_verbatim() {
        assert_eq!(
            render("{year}/{fortnight}/{month}", &instant()),
            "2024/{fortnight}/03"
        );
    }

    #[test]
    fn test_extra_units() {
        assert_eq!(render("{weekday} {millisecond}", &instant()), "Thu 000");
        assert_eq!(render("{timeZoneName}", &instant()), "UTC");
        assert_eq!(render("no placeholders", &instant()), "no placeholders");
    }
}
