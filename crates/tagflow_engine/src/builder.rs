//! Selector compilation and model construction.
//!
//! A [`ModelBuilder`] owns the selector arena of one declaration scope and the
//! state arena shared by every scope of the model being built. The top-level
//! builder is rooted at [`StateId::ROOT`]; the builders handed to
//! [`ElementHandler::build`] are rooted at the state the handler is attached
//! to and write into the same arena.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use tagflow_foundation::{Error, QName, Result};
use tracing::{debug, warn};

use crate::automaton::{StateGraph, StateId};
use crate::config::ModelConfig;
use crate::constraint::{AttributeMatcher, Constraint, ElementFilter};
use crate::handler::{DeclarationHandler, ElementHandler};
use crate::model::Model;
use crate::selector::{Selector, SelectorId, SelectorKind, SelectorNode};

type Attachment<T> = (StateId, Arc<dyn ElementHandler<T>>);

// =============================================================================
// Attach Point
// =============================================================================

/// A handle to a compiled state, usable as the target of an explicit
/// transition from any builder of the same model.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AttachPoint {
    graph: u64,
    state: StateId,
}

impl AttachPoint {
    /// The target state.
    #[must_use]
    pub fn state(&self) -> StateId {
        self.state
    }
}

// =============================================================================
// Model Builder
// =============================================================================

/// Declares selectors and compiles them into a [`Model`].
pub struct ModelBuilder<T> {
    graph: StateGraph<T>,
    root: StateId,
    config: ModelConfig,
    selectors: Vec<SelectorNode>,
    children: HashMap<Option<SelectorId>, Vec<SelectorId>>,
    attachments: Vec<Attachment<T>>,
    declaration_handlers: Vec<Arc<dyn DeclarationHandler<T>>>,
}

impl<T> ModelBuilder<T> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    /// Creates a builder with a custom configuration.
    #[must_use]
    pub fn with_config(config: ModelConfig) -> Self {
        Self::rooted(StateGraph::new(), StateId::ROOT, config)
    }

    fn rooted(graph: StateGraph<T>, root: StateId, config: ModelConfig) -> Self {
        Self {
            graph,
            root,
            config,
            selectors: Vec::new(),
            children: HashMap::new(),
            attachments: Vec::new(),
            declaration_handlers: Vec::new(),
        }
    }

    /// The state this builder's selectors are relative to.
    #[must_use]
    pub fn root_state(&self) -> StateId {
        self.root
    }

    /// A cursor at the builder root.
    pub fn root(&mut self) -> Selector<'_, T> {
        Selector::new(self, None)
    }

    /// A cursor at a previously declared selector.
    pub fn selector(&mut self, id: SelectorId) -> Selector<'_, T> {
        Selector::new(self, Some(id))
    }

    /// Starts an attribute constraint.
    #[must_use]
    pub fn with(&self, name: impl Into<QName>) -> AttributeMatcher {
        crate::constraint::with(name)
    }

    // -------------------------------------------------------------------------
    // Combinators at the root
    // -------------------------------------------------------------------------

    /// A child of the root named `name`.
    pub fn element(&mut self, name: impl Into<QName>) -> Selector<'_, T> {
        self.root().element(name)
    }

    /// A child of the root named `name` satisfying every constraint.
    pub fn element_where<I, C>(&mut self, name: impl Into<QName>, constraints: I) -> Selector<'_, T>
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.root().element_where(name, constraints)
    }

    /// A path of children starting at the root.
    pub fn elements<I, N>(&mut self, names: I) -> Selector<'_, T>
    where
        I: IntoIterator<Item = N>,
        N: Into<QName>,
    {
        self.root().elements(names)
    }

    /// Any child of the root.
    pub fn child(&mut self) -> Selector<'_, T> {
        self.root().child()
    }

    /// Any child of the root satisfying every constraint.
    pub fn child_where<I, C>(&mut self, constraints: I) -> Selector<'_, T>
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.root().child_where(constraints)
    }

    /// Any child of the root accepted by `filter`.
    pub fn child_matching(&mut self, filter: impl ElementFilter + 'static) -> Selector<'_, T> {
        self.root().child_matching(filter)
    }

    /// Any child of the root accepted by a filter shared with other selectors.
    pub fn child_matching_shared(&mut self, filter: Arc<dyn ElementFilter>) -> Selector<'_, T> {
        self.root().child_matching_shared(filter)
    }

    /// Every element below the root.
    pub fn descendant(&mut self) -> Selector<'_, T> {
        self.root().descendant()
    }

    /// Every element below the root satisfying every constraint.
    pub fn descendant_where<I, C>(&mut self, constraints: I) -> Selector<'_, T>
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.root().descendant_where(constraints)
    }

    /// Every element named `name` below the root.
    pub fn descendant_named(&mut self, name: impl Into<QName>) -> Selector<'_, T> {
        self.root().descendant_named(name)
    }

    /// Every element named `name` below the root satisfying every constraint.
    pub fn descendant_named_where<I, C>(
        &mut self,
        name: impl Into<QName>,
        constraints: I,
    ) -> Selector<'_, T>
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.root().descendant_named_where(name, constraints)
    }

    /// Registers a handler for document-level declarations.
    pub fn attach_declaration_handler(&mut self, handler: impl DeclarationHandler<T> + 'static) {
        self.declaration_handlers.push(Arc::new(handler));
    }

    // -------------------------------------------------------------------------
    // Selector arena
    // -------------------------------------------------------------------------

    /// Declares a selector, returning an existing structurally equal one.
    pub(crate) fn declare(
        &mut self,
        parent: Option<SelectorId>,
        kind: SelectorKind,
        constraints: Vec<Constraint>,
    ) -> SelectorId {
        let siblings = self.children.entry(parent).or_default();
        if let Some(&existing) = siblings
            .iter()
            .find(|id| self.selectors[id.0].same_as(&kind, &constraints))
        {
            return existing;
        }
        let id = SelectorId(self.selectors.len());
        siblings.push(id);
        self.selectors.push(SelectorNode::new(parent, kind, constraints));
        id
    }

    pub(crate) fn limit(&mut self, id: Option<SelectorId>, limit: NonZeroU32) -> Result<()> {
        let Some(id) = id else {
            if self.root == StateId::ROOT {
                return Err(Error::configuration(
                    "only() cannot limit the document root; select an element first",
                ));
            }
            self.set_state_limit(self.root, limit);
            return Ok(());
        };
        let node = &mut self.selectors[id.0];
        node.limit = Some(limit);
        if let Some(state) = node.state {
            self.set_state_limit(state, limit);
        }
        Ok(())
    }

    fn set_state_limit(&mut self, state: StateId, limit: NonZeroU32) {
        match self.graph.set_limit(state, limit) {
            Some(previous) if previous != limit => warn!(
                ?state,
                previous = previous.get(),
                limit = limit.get(),
                "cardinality limit overwritten"
            ),
            _ => {}
        }
    }

    /// Compiles a selector and its uncompiled ancestors, parent first.
    pub(crate) fn state_of(&mut self, id: Option<SelectorId>) -> StateId {
        let mut pending = Vec::new();
        let mut base = self.root;
        let mut cursor = id;
        while let Some(current) = cursor {
            let node = &self.selectors[current.0];
            if let Some(state) = node.state {
                base = state;
                break;
            }
            pending.push(current);
            cursor = node.parent;
        }

        for current in pending.into_iter().rev() {
            let node = &self.selectors[current.0];
            let state = compile(&mut self.graph, base, &node.kind, node.test());
            let limit = node.limit;
            self.selectors[current.0].state = Some(state);
            if let Some(limit) = limit {
                self.set_state_limit(state, limit);
            }
            base = state;
        }
        base
    }

    pub(crate) fn attach_to(&mut self, state: StateId, handler: Arc<dyn ElementHandler<T>>) {
        self.graph.attach(state, Arc::clone(&handler));
        self.attachments.push((state, handler));
    }

    pub(crate) fn attach_point_for(&self, state: StateId) -> AttachPoint {
        AttachPoint {
            graph: self.graph.id(),
            state,
        }
    }

    pub(crate) fn link(&mut self, from: StateId, test: Constraint, target: &AttachPoint) -> Result<()> {
        if target.graph != self.graph.id() || !self.graph.contains(target.state) {
            return Err(Error::configuration(format!(
                "attach point {:?} belongs to a different model",
                target.state
            )));
        }
        let linked = self.graph.link(from, test, target.state);
        if linked != target.state {
            warn!(
                ?from,
                existing = ?linked,
                requested = ?target.state,
                "transition already declared; keeping the existing target"
            );
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Compiles every declaration, resolving handler-declared sub-selectors
    /// until no new attachments appear.
    ///
    /// # Errors
    /// Returns a configuration error raised by a handler's `build`, or when
    /// the number of handler builds exceeds
    /// [`ModelConfig::max_handler_builds`].
    pub fn build(mut self) -> Result<Model<T>> {
        let mut worklist: VecDeque<Attachment<T>> = std::mem::take(&mut self.attachments).into();
        let mut built = HashSet::new();
        let mut builds = 0_usize;

        while let Some((state, handler)) = worklist.pop_front() {
            if !built.insert((state, Arc::as_ptr(&handler).cast::<()>())) {
                continue;
            }
            builds += 1;
            if builds > self.config.max_handler_builds {
                return Err(Error::configuration(format!(
                    "handler build limit of {} exceeded",
                    self.config.max_handler_builds
                )));
            }

            let graph = std::mem::take(&mut self.graph);
            let mut scope = Self::rooted(graph, state, self.config.clone());
            let outcome = handler.build(&mut scope);
            let Self {
                graph,
                attachments,
                declaration_handlers,
                ..
            } = scope;
            self.graph = graph;
            outcome?;
            worklist.extend(attachments);
            self.declaration_handlers.extend(declaration_handlers);
        }

        debug!(
            states = self.graph.len(),
            handler_builds = builds,
            declaration_handlers = self.declaration_handlers.len(),
            "model built"
        );
        Ok(Model::new(self.graph, self.root, self.declaration_handlers))
    }
}

fn compile<T>(graph: &mut StateGraph<T>, base: StateId, kind: &SelectorKind, test: Constraint) -> StateId {
    match kind {
        SelectorKind::NamedChild(_) | SelectorKind::AnyChild | SelectorKind::Filter(_) => {
            graph.add_transition(base, test)
        }
        SelectorKind::Descendant if test.is_trivial() => graph.default_state(base),
        SelectorKind::Descendant | SelectorKind::NamedDescendant(_) => {
            graph.add_descendant_match(base, test)
        }
    }
}

impl<T> Default for ModelBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ModelBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("root", &self.root)
            .field("selectors", &self.selectors.len())
            .field("states", &self.graph.len())
            .field("attachments", &self.attachments.len())
            .finish_non_exhaustive()
    }
}
