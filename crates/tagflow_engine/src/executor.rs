//! The streaming executor.
//!
//! An [`Executor`] interprets one event sequence against a shared [`Model`].
//! It keeps a stack of frames mirroring the open elements. Each frame records
//! the state it entered and the states whose descendant rules are in scope,
//! most specific first. Cardinality counters live in the executor, so every
//! run starts with fresh limits.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use im::Vector;
use tagflow_foundation::{
    BoxError, Characters, EndElement, Error, EventSource, Location, Result, StartElement,
    XmlEvent,
};
use tracing::{debug, trace};

use crate::automaton::StateId;
use crate::config::RunConfig;
use crate::handler::DeclarationHandler;
use crate::model::Model;

/// One open element.
#[derive(Clone, Debug)]
struct Frame {
    state: StateId,
    inherited: Vector<StateId>,
    element: StartElement,
}

/// Drives one run of a model.
pub struct Executor<T> {
    model: Arc<Model<T>>,
    config: RunConfig,
    stack: Vec<Frame>,
    root_inherited: Vector<StateId>,
    counters: HashMap<StateId, u32>,
    done: bool,
    poisoned: bool,
    location: Option<Location>,
}

impl<T> Executor<T> {
    /// Starts a run with the default configuration.
    #[must_use]
    pub fn new(model: Arc<Model<T>>) -> Self {
        Self::with_config(model, RunConfig::default())
    }

    /// Starts a run with a custom configuration.
    #[must_use]
    pub fn with_config(model: Arc<Model<T>>, config: RunConfig) -> Self {
        let root = model.root();
        let root_inherited = if model.state(root).declares_rules() {
            Vector::unit(root)
        } else {
            Vector::new()
        };
        Self {
            model,
            config,
            stack: Vec::new(),
            root_inherited,
            counters: HashMap::new(),
            done: false,
            poisoned: false,
            location: None,
        }
    }

    /// The model being executed.
    #[must_use]
    pub fn model(&self) -> &Arc<Model<T>> {
        &self.model
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns true once the document element has closed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The state of the innermost open element, or the root.
    #[must_use]
    pub fn current_state(&self) -> StateId {
        self.stack.last().map_or(self.model.root(), |frame| frame.state)
    }

    /// The last stream location seen.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Consumes every event of `source`.
    ///
    /// # Errors
    /// Returns the first error raised by the source, a handler, or the
    /// executor itself. Source errors are passed through as-is.
    pub fn run<S: EventSource>(&mut self, mut source: S, data: &mut T) -> Result<()> {
        debug!(root = ?self.model.root(), "run started");
        while let Some(event) = source.next_event() {
            let event = event.map_err(|e| {
                self.poisoned = true;
                Error::source_error(e)
            })?;
            self.step(&event, data)?;
        }
        debug!(done = self.done, depth = self.stack.len(), "run finished");
        Ok(())
    }

    /// Consumes exactly one event.
    ///
    /// # Errors
    /// Returns handler failures, cardinality and depth violations, and
    /// protocol errors, each tagged with the current stream location. After
    /// any error every further call fails.
    pub fn step(&mut self, event: &XmlEvent, data: &mut T) -> Result<()> {
        if let Some(location) = event.location() {
            self.location = Some(*location);
        }
        if self.poisoned {
            return Err(Error::protocol("executor used after an error").at(self.location));
        }

        let outcome = match event {
            XmlEvent::StartElement(element) => self.start_element(element, data),
            XmlEvent::EndElement(element) => self.end_element(element, data),
            XmlEvent::Characters(text) => self.characters(text, data),
            XmlEvent::Dtd(dtd) => self.declaration(|h, data| h.dtd(dtd, data), data),
            XmlEvent::EntityDeclaration(decl) => {
                self.declaration(|h, data| h.entity_declaration(decl, data), data)
            }
            XmlEvent::EntityReference(reference) => {
                self.declaration(|h, data| h.entity_reference(reference, data), data)
            }
            XmlEvent::NotationDeclaration(decl) => {
                self.declaration(|h, data| h.notation_declaration(decl, data), data)
            }
        };

        outcome.map_err(|e| {
            self.poisoned = true;
            e.at(self.location)
        })
    }

    fn start_element(&mut self, element: &StartElement, data: &mut T) -> Result<()> {
        if self.done {
            return Err(Error::protocol(format!(
                "element {} after the document element closed",
                element.name
            )));
        }
        if let Some(limit) = self.config.max_depth {
            if self.stack.len() >= limit {
                return Err(Error::depth_exceeded(limit));
            }
        }

        let (current, inherited) = match self.stack.last() {
            Some(frame) => (frame.state, &frame.inherited),
            None => (self.model.root(), &self.root_inherited),
        };
        let next = self.model.graph().resolve(current, inherited, element);
        let state = self.model.state(next);

        let mut scope = inherited.clone();
        if state.declares_rules() && scope.front() != Some(&next) {
            scope.push_front(next);
        }

        if let Some(limit) = state.limit() {
            let remaining = self.counters.entry(next).or_insert(limit.get());
            if *remaining == 0 {
                return Err(Error::cardinality_exceeded(element.name.clone(), limit.get()));
            }
            *remaining -= 1;
        }

        trace!(
            element = %element.name,
            from = ?current,
            to = ?next,
            depth = self.stack.len() + 1,
            "enter"
        );
        self.stack.push(Frame {
            state: next,
            inherited: scope,
            element: element.clone(),
        });

        for handler in self.model.state(next).handlers() {
            handler.start_element(element, data).map_err(Error::handler)?;
        }
        Ok(())
    }

    fn end_element(&mut self, element: &EndElement, data: &mut T) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            return Err(Error::protocol(format!(
                "end of {} with no open element",
                element.name
            )));
        };
        trace!(element = %element.name, state = ?frame.state, depth = self.stack.len(), "leave");

        for handler in self.model.state(frame.state).handlers() {
            handler.end_element(element, data).map_err(Error::handler)?;
        }
        if self.stack.is_empty() {
            self.done = true;
        }
        Ok(())
    }

    fn characters(&mut self, text: &Characters, data: &mut T) -> Result<()> {
        let Some(frame) = self.stack.last() else {
            return Ok(());
        };
        for handler in self.model.state(frame.state).handlers() {
            handler
                .characters(&frame.element, text, data)
                .map_err(Error::handler)?;
        }
        Ok(())
    }

    fn declaration<F>(&self, dispatch: F, data: &mut T) -> Result<()>
    where
        F: Fn(&dyn DeclarationHandler<T>, &mut T) -> Result<(), BoxError>,
    {
        for handler in self.model.declaration_handlers() {
            dispatch(handler.as_ref(), data).map_err(Error::handler)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Executor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("depth", &self.stack.len())
            .field("current_state", &self.current_state())
            .field("done", &self.done)
            .field("poisoned", &self.poisoned)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
