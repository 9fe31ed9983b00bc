//! Message templates
//!
//! A template such as `"{timestamp} {level} {context} {message}"` is parsed
//! once into literal and field segments. Only the four field names are
//! accepted; anything else is rejected when the template is configured.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Default message layout.
pub const DEFAULT_MESSAGE_FORMAT: &str = "{timestamp} {level} {context} {message}";

pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(.*?)\}").expect("placeholder pattern is valid"));

/// A field a message template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Current time, rendered through the timestamp template
    Timestamp,
    /// Padded, coloured level label
    Level,
    /// Logger name in brackets
    Context,
    /// The stringified arguments
    Message,
}

impl Field {
    /// Placeholder name without braces.
    pub fn name(self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::Level => "level",
            Field::Context => "context",
            Field::Message => "message",
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "timestamp" => Ok(Field::Timestamp),
            "level" => Ok(Field::Level),
            "context" => Ok(Field::Context),
            "message" => Ok(Field::Message),
            other => Err(Error::InvalidFormatPlaceholder(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// The rendered value of every field for one line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValues<'a> {
    /// Rendered timestamp
    pub timestamp: &'a str,
    /// Rendered level label
    pub level: &'a str,
    /// Rendered context
    pub context: &'a str,
    /// Rendered message
    pub message: &'a str,
}

impl<'a> FieldValues<'a> {
    fn get(&self, field: Field) -> &'a str {
        match field {
            Field::Timestamp => self.timestamp,
            Field::Level => self.level,
            Field::Context => self.context,
            Field::Message => self.message,
        }
    }
}

/// A validated message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Parse and validate `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormatPlaceholder`] naming the first
    /// placeholder that is not a known field.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(name.as_str().parse()?));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fields in the order they appear.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(field) => Some(*field),
            Segment::Literal(_) => None,
        })
    }

    /// Whether `field` appears at least once.
    pub fn uses(&self, field: Field) -> bool {
        self.fields().any(|f| f == field)
    }

    /// Substitute `values` into the template.
    ///
    /// An empty field swallows the whitespace-only literal right after it, so
    /// a logger without a name does not leave a double space behind.
    pub fn render(&self, values: &FieldValues<'_>) -> String {
        let mut out = String::new();
        let mut skip_separator = false;
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    let is_separator = text.trim().is_empty();
                    if !(skip_separator && is_separator) {
                        out.push_str(text);
                    }
                    skip_separator = false;
                }
                Segment::Field(field) => {
                    let value = values.get(*field);
                    skip_separator = value.is_empty();
                    out.push_str(value);
                }
            }
        }
        out
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        let space = || Segment::Literal(" ".to_string());
        Self {
            source: DEFAULT_MESSAGE_FORMAT.to_string(),
            segments: vec![
                Segment::Field(Field::Timestamp),
                space(),
                Segment::Field(Field::Level),
                space(),
                Segment::Field(Field::Context),
                space(),
                Segment::Field(Field::Message),
            ],
        }
    }
}

impl FromStr for MessageTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
