//! Error types for the tagflow system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::location::Location;
use crate::qname::QName;

/// Boxed error returned by handler callbacks and event sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using the tagflow [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The main error type for tagflow operations.
#[derive(Debug, Error)]
#[error("{kind}{}", LocationSuffix(.location.as_ref()))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Stream location of the event being processed, when known.
    pub location: Option<Location>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Attaches a stream location, keeping an existing one.
    #[must_use]
    pub fn at(mut self, location: Option<Location>) -> Self {
        if self.location.is_none() {
            self.location = location;
        }
        self
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Creates a cardinality-exceeded error.
    #[must_use]
    pub fn cardinality_exceeded(element: QName, limit: u32) -> Self {
        Self::new(ErrorKind::CardinalityExceeded { element, limit })
    }

    /// Wraps an error raised by a handler callback.
    #[must_use]
    pub fn handler(source: BoxError) -> Self {
        Self::new(ErrorKind::Handler(source))
    }

    /// Wraps an error raised by the event source.
    #[must_use]
    pub fn source_error(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Source(source.into()))
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol(message.into()))
    }

    /// Creates a nesting depth error.
    #[must_use]
    pub fn depth_exceeded(limit: usize) -> Self {
        Self::new(ErrorKind::DepthExceeded { limit })
    }

    /// Returns true for configuration errors.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration(_))
    }

    /// Returns true for cardinality errors.
    #[must_use]
    pub fn is_cardinality(&self) -> bool {
        matches!(self.kind, ErrorKind::CardinalityExceeded { .. })
    }
}

/// Categorized error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Invalid declaration, raised while a model is being built.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An `only(n)` limited element occurred more than `n` times.
    #[error("element {element} exceeded its limit of {limit} occurrence(s)")]
    CardinalityExceeded {
        /// The element that exceeded the limit.
        element: QName,
        /// The configured limit.
        limit: u32,
    },

    /// A handler callback failed.
    #[error("{0}")]
    Handler(#[source] BoxError),

    /// The event source failed.
    #[error("event source error: {0}")]
    Source(#[source] BoxError),

    /// The executor was driven out of order.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Element nesting exceeded the configured depth.
    #[error("nesting depth limit ({limit}) exceeded")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

struct LocationSuffix<'a>(Option<&'a Location>);

impl fmt::Display for LocationSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, " at {location}"),
            None => Ok(()),
        }
    }
}
