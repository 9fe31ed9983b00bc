//! Log arguments and how they become text
//!
//! Arguments are stringified independently and joined with single spaces.
//! Lazy arguments are only evaluated when the line is actually emitted.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Largest integer a double can hold exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// A single argument to a log call.
pub enum Message {
    /// Plain text
    Text(String),
    /// Produced on demand, only if the line passes the level filter
    Lazy(Box<dyn Fn() -> Message + Send + Sync>),
    /// Structured data, rendered as indented JSON when it is an object or array
    Structured(Value),
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
            Self::Structured(value) => f.debug_tuple("Structured").field(value).finish(),
        }
    }
}

impl Message {
    /// Defer building the message until it is known to be emitted.
    pub fn lazy<F, M>(produce: F) -> Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: Into<Message>,
    {
        Self::Lazy(Box::new(move || produce().into()))
    }

    /// Capture any serializable value as structured data.
    ///
    /// # Errors
    ///
    /// Fails if `value` cannot be represented as JSON.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Self::Structured)
    }

    /// Render this argument to text.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lazy(produce) => produce().render(),
            Self::Structured(value) => render_value(value),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => {
            let safe = coerce_large_integers(value.clone());
            serde_json::to_string_pretty(&safe).unwrap_or_else(|_| safe.to_string())
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Replace integers outside the exactly-representable range with their
/// decimal string form, so JSON consumers that parse numbers as doubles
/// keep every digit.
pub fn coerce_large_integers(value: Value) -> Value {
    match value {
        Value::Number(number) => {
            let too_large = number
                .as_i64()
                .map(|n| n.unsigned_abs() > MAX_SAFE_INTEGER)
                .or_else(|| number.as_u64().map(|n| n > MAX_SAFE_INTEGER))
                .unwrap_or(false);
            if too_large {
                Value::String(number.to_string())
            } else {
                Value::Number(number)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_large_integers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, coerce_large_integers(item)))
                .collect(),
        ),
        other => other,
    }
}

/// Render every argument and join them with single spaces.
pub fn stringify<I>(messages: I) -> String
where
    I: IntoIterator,
    I::Item: Into<Message>,
{
    messages
        .into_iter()
        .map(|message| message.into().render())
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Message {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

macro_rules! message_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Message {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

message_from_display!(bool, char, i32, i64, i128, u8, u32, u64, u128, usize, f64);

/// Build a `Vec<Message>` from arguments of mixed types.
///
/// ```
/// use steplog::{Message, messages};
///
/// let args: Vec<Message> = messages!["copied", 3, "files"];
/// assert_eq!(steplog::logger::stringify(args), "copied 3 files");
/// ```
#[macro_export]
macro_rules! messages {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Message::from($arg)),*]
    };
}

/// The argument shapes accepted by `Logger::error`.
///
/// Resolved once into the line text and an optional trace that is written
/// raw to stderr after the formatted line.
#[derive(Debug)]
pub enum ErrorArgs {
    /// Just a message; no trace line
    TextOnly(String),
    /// An error: its message is the text, its debug form is the trace
    ErrorOnly(anyhow::Error),
    /// Context text plus an error, rendered as `"{text}, {error}"`
    TextAndError(String, anyhow::Error),
}

impl ErrorArgs {
    /// Wrap any standard error.
    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ErrorOnly(anyhow::Error::new(error))
    }

    /// Context text plus any standard error.
    pub fn with_error<E>(text: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TextAndError(text.into(), anyhow::Error::new(error))
    }

    /// Split into the text to log and the trace to print after it.
    pub fn resolve(self) -> (String, Option<String>) {
        match self {
            Self::TextOnly(text) => (text, None),
            Self::ErrorOnly(error) => (error.to_string(), Some(format!("{error:?}"))),
            Self::TextAndError(text, error) => {
                (format!("{text}, {error}"), Some(format!("{error:?}")))
            }
        }
    }
}

impl From<&str> for ErrorArgs {
    fn from(text: &str) -> Self {
        Self::TextOnly(text.to_string())
    }
}

impl From<String> for ErrorArgs {
    fn from(text: String) -> Self {
        Self::TextOnly(text)
    }
}

impl From<anyhow::Error> for ErrorArgs {
    fn from(error: anyhow::Error) -> Self {
        Self::ErrorOnly(error)
    }
}

impl From<(&str, anyhow::Error)> for ErrorArgs {
    fn from((text, error): (&str, anyhow::Error)) -> Self {
        Self::TextAndError(text.to_string(), error)
    }
}

impl From<(String, anyhow::Error)> for ErrorArgs {
    fn from((text, error): (String, anyhow::Error)) -> Self {
        Self::TextAndError(text, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_primitives_render_plainly() {
        assert_eq!(Message::from("text").render(), "text");
        assert_eq!(Message::from(42).render(), "42");
        assert_eq!(Message::from(true).render(), "true");
        assert_eq!(Message::from(json!("quoted?")).render(), "quoted?");
        assert_eq!(Message::from(json!(null)).render(), "null");
    }

    #[test]
    fn test_rendering_is_idempotent_on_primitives() {
        for message in [Message::from("abc"), Message::from(7), Message::from(1.5)] {
            let once = message.render();
            assert_eq!(Message::from(once.clone()).render(), once);
        }
    }

    #[test]
    fn test_structured_is_indented_json() {
        let rendered = Message::from(json!({"name": "jq", "tags": ["a", "b"]})).render();
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("  \"name\": \"jq\""));
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["tags"][1], "b");
    }

    #[test]
    fn test_large_integers_keep_every_digit() {
        let big: u64 = MAX_SAFE_INTEGER + 2;
        let rendered = Message::from(json!({"id": big, "small": 12, "nested": [{"neg": -(big as i64)}]}))
            .render();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["id"], "9007199254740993");
        assert_eq!(parsed["small"], 12);
        assert_eq!(parsed["nested"][0]["neg"], "-9007199254740993");
    }

    #[test]
    fn test_structured_from_serialize() {
        #[derive(Serialize)]
        struct Step {
            index: u32,
            label: &'static str,
        }
        let message = Message::structured(&Step { index: 2, label: "fetch" }).unwrap();
        assert!(message.render().contains("\"label\": \"fetch\""));
    }

    #[test]
    fn test_lazy_is_evaluated_on_render() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let message = Message::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "computed"
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(message.render(), "computed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stringify_joins_with_spaces() {
        assert_eq!(stringify(["a", "b", "c"]), "a b c");
        assert_eq!(stringify(messages!["n =", 3]), "n = 3");
        assert_eq!(stringify(Vec::<Message>::new()), "");
    }

    #[test]
    fn test_error_args_resolution() {
        let (text, trace) = ErrorArgs::from("boom").resolve();
        assert_eq!(text, "boom");
        assert!(trace.is_none());

        let (text, trace) = ErrorArgs::from(("ctx", anyhow::anyhow!("x"))).resolve();
        assert_eq!(text, "ctx, x");
        assert!(trace.unwrap().contains('x'));

        let io = std::io::Error::other("disk full");
        let (text, trace) = ErrorArgs::error(io).resolve();
        assert_eq!(text, "disk full");
        assert!(trace.is_some());
    }
}
