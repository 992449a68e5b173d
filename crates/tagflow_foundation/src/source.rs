//! The pull interface of an external event tokenizer.

use crate::event::XmlEvent;

/// An ordered, finite sequence of markup events.
///
/// Tokenizer errors are surfaced through `Self::Error` and are passed
/// through by the executor without retry or recovery.
pub trait EventSource {
    /// Error produced by the tokenizer.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pulls the next event, or `None` once the input is exhausted.
    fn next_event(&mut self) -> Option<Result<XmlEvent, Self::Error>>;
}

impl<I, E> EventSource for I
where
    I: Iterator<Item = Result<XmlEvent, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn next_event(&mut self) -> Option<Result<XmlEvent, E>> {
        self.next()
    }
}
