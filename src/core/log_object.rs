//! Payloads carried through the dispatcher
//!
//! The dispatcher never looks inside a record. Each [`Logger`](super::Logger)
//! asks the object for the shape it understands and ignores it otherwise.

use std::borrow::Cow;
use std::fmt;

/// A record payload routed by the dispatcher
pub trait LogObject {
    /// View of this object as a single line of text, if it has one
    fn as_line(&self) -> Option<&dyn LineObject> {
        None
    }
}

/// Simple line logging object: one line of text
pub trait LineObject {
    fn log_line(&self) -> Cow<'_, str>;
}

/// Owned text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage(String);

impl LogMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LineObject for LogMessage {
    fn log_line(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }
}

impl LogObject for LogMessage {
    fn as_line(&self) -> Option<&dyn LineObject> {
        Some(self)
    }
}

impl LineObject for String {
    fn log_line(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl LogObject for String {
    fn as_line(&self) -> Option<&dyn LineObject> {
        Some(self)
    }
}

impl LineObject for &str {
    fn log_line(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl LogObject for &str {
    fn as_line(&self) -> Option<&dyn LineObject> {
        Some(self)
    }
}

/// Formatted message, rendered only when a logger asks for the line
pub struct FormattedMessage<'a>(fmt::Arguments<'a>);

impl<'a> FormattedMessage<'a> {
    pub fn new(args: fmt::Arguments<'a>) -> Self {
        Self(args)
    }
}

impl LineObject for FormattedMessage<'_> {
    fn log_line(&self) -> Cow<'_, str> {
        match self.0.as_str() {
            Some(literal) => Cow::Borrowed(literal),
            None => Cow::Owned(self.0.to_string()),
        }
    }
}

impl LogObject for FormattedMessage<'_> {
    fn as_line(&self) -> Option<&dyn LineObject> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;
    impl LogObject for Opaque {}

    #[test]
    fn test_message_line() {
        let msg = LogMessage::new("disk almost full");
        let line = msg.as_line().expect("message is a line");
        assert_eq!(line.log_line(), "disk almost full");
    }

    #[test]
    fn test_formatted_message_is_lazy_text() {
        let port = 8080;
        let line = FormattedMessage::new(format_args!("listening on {}", port))
            .as_line()
            .map(|l| l.log_line().into_owned());
        assert_eq!(line.as_deref(), Some("listening on 8080"));
    }

    #[test]
    fn test_text_is_line() {
        let obj: &dyn LogObject = &"plain";
        assert_eq!(obj.as_line().unwrap().log_line(), "plain");

        let owned = String::from("owned");
        assert_eq!(owned.as_line().unwrap().log_line(), "owned");
    }

    #[test]
    fn test_unknown_object_has_no_line() {
        assert!(Opaque.as_line().is_none());
    }
}
