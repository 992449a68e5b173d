//! The compiled, immutable automaton.

use std::fmt;
use std::sync::Arc;

use crate::automaton::{State, StateGraph, StateId};
use crate::handler::DeclarationHandler;

/// A compiled selector model.
///
/// A model is never mutated after [`ModelBuilder::build`](crate::ModelBuilder::build)
/// and can be shared across any number of runs, including from several
/// threads at once, behind an `Arc`.
pub struct Model<T> {
    graph: StateGraph<T>,
    root: StateId,
    declaration_handlers: Vec<Arc<dyn DeclarationHandler<T>>>,
}

impl<T> Model<T> {
    pub(crate) fn new(
        graph: StateGraph<T>,
        root: StateId,
        declaration_handlers: Vec<Arc<dyn DeclarationHandler<T>>>,
    ) -> Self {
        Self {
            graph,
            root,
            declaration_handlers,
        }
    }

    /// The state every run starts in.
    #[must_use]
    pub fn root(&self) -> StateId {
        self.root
    }

    /// Returns a state.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this model.
    #[must_use]
    pub fn state(&self, id: StateId) -> &State<T> {
        self.graph.state(id)
    }

    /// Number of states, including the EMPTY sink.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.graph.len()
    }

    /// The underlying state arena.
    #[must_use]
    pub fn graph(&self) -> &StateGraph<T> {
        &self.graph
    }

    /// Handlers for document-level declarations, in registration order.
    #[must_use]
    pub fn declaration_handlers(&self) -> &[Arc<dyn DeclarationHandler<T>>] {
        &self.declaration_handlers
    }

    /// Moves the model behind an `Arc` for sharing between runs.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<T> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("root", &self.root)
            .field("states", &self.graph.len())
            .field("declaration_handlers", &self.declaration_handlers.len())
            .finish()
    }
}
