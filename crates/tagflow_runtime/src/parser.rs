//! The parser facade: batch and incremental runs over a shared model.

use std::fmt;
use std::sync::Arc;

use tagflow_engine::{Executor, Model};
use tagflow_foundation::{Error, EventSource, Result, XmlEvent};
use tracing::debug;

use crate::config::ParserConfig;
#[cfg(feature = "quick-xml")]
use crate::xml::XmlReaderSource;

// =============================================================================
// Parser
// =============================================================================

/// Runs a compiled [`Model`] over event sources.
///
/// A parser is cheap to clone and holds no per-run state; every call to
/// [`parse`](Self::parse) or [`start_parsing`](Self::start_parsing) starts a
/// fresh run with fresh cardinality counters.
pub struct Parser<T> {
    model: Arc<Model<T>>,
    config: ParserConfig,
}

impl<T> Parser<T> {
    /// Creates a parser owning `model`.
    #[must_use]
    pub fn new(model: Model<T>) -> Self {
        Self::from_shared(Arc::new(model))
    }

    /// Creates a parser over a model shared with other parsers.
    #[must_use]
    pub fn from_shared(model: Arc<Model<T>>) -> Self {
        Self {
            model,
            config: ParserConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// The model this parser runs.
    #[must_use]
    pub fn model(&self) -> &Arc<Model<T>> {
        &self.model
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn executor(&self) -> Executor<T> {
        Executor::with_config(Arc::clone(&self.model), self.config.run.clone())
    }

    /// Consumes every event of `source`.
    ///
    /// # Errors
    /// Returns the first source, handler, cardinality or protocol error.
    pub fn parse<S: EventSource>(&self, source: S, data: &mut T) -> Result<()> {
        self.executor().run(source, data)
    }

    /// Tokenizes and processes a complete document.
    ///
    /// # Errors
    /// Returns malformed markup as a source error, and every error
    /// [`parse`](Self::parse) can return.
    #[cfg(feature = "quick-xml")]
    pub fn parse_str(&self, xml: &str, data: &mut T) -> Result<()> {
        debug!(bytes = xml.len(), trim_text = self.config.trim_text, "parsing text");
        self.parse(self.text_source(xml), data)
    }

    /// Starts an incremental run over `source`.
    #[must_use]
    pub fn start_parsing<S: EventSource>(&self, source: S) -> ParseSession<T, S> {
        ParseSession {
            executor: self.executor(),
            source,
            pending: None,
            exhausted: false,
        }
    }

    /// Starts an incremental run over markup text.
    #[cfg(feature = "quick-xml")]
    #[must_use]
    pub fn start_parsing_str<'i>(&self, xml: &'i str) -> ParseSession<T, XmlReaderSource<'i>> {
        self.start_parsing(self.text_source(xml))
    }

    #[cfg(feature = "quick-xml")]
    fn text_source<'i>(&self, xml: &'i str) -> XmlReaderSource<'i> {
        XmlReaderSource::new(xml).with_trim_text(self.config.trim_text)
    }
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            config: self.config.clone(),
        }
    }
}

impl<T> fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Incremental Session
// =============================================================================

/// One incremental run, advanced one event at a time by the caller.
pub struct ParseSession<T, S: EventSource> {
    executor: Executor<T>,
    source: S,
    pending: Option<std::result::Result<XmlEvent, S::Error>>,
    exhausted: bool,
}

impl<T, S: EventSource> ParseSession<T, S> {
    /// Returns true if another event is available.
    ///
    /// Pulls at most one event from the source and holds it for the next
    /// [`process_event`](Self::process_event).
    pub fn has_more_events(&mut self) -> bool {
        if self.pending.is_none() && !self.exhausted {
            self.pending = self.source.next_event();
            self.exhausted = self.pending.is_none();
        }
        self.pending.is_some()
    }

    /// Processes the next event and returns it.
    ///
    /// # Errors
    /// Returns a protocol error when the source is exhausted, the source's own
    /// error when it fails, and every error [`Executor::step`] can return.
    pub fn process_event(&mut self, data: &mut T) -> Result<XmlEvent> {
        if !self.has_more_events() {
            return Err(Error::protocol("no more events to process").at(self.executor.location()));
        }
        let event = match self.pending.take() {
            Some(Ok(event)) => event,
            Some(Err(e)) => {
                self.exhausted = true;
                return Err(Error::source_error(e));
            }
            None => return Err(Error::protocol("no more events to process")),
        };
        self.executor.step(&event, data)?;
        Ok(event)
    }

    /// The executor driving this run, for introspection.
    #[must_use]
    pub fn executor(&self) -> &Executor<T> {
        &self.executor
    }
}

impl<T, S: EventSource> fmt::Debug for ParseSession<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseSession")
            .field("executor", &self.executor)
            .field("buffered", &self.pending.is_some())
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
