//! The compiled automaton: an arena of states addressed by [`StateId`].
//!
//! Each state owns three kinds of outgoing edges:
//! - direct transitions, tested only against the immediate children of an
//!   element in that state
//! - descendant rules, inherited by every frame opened below the state and
//!   consulted only after the current state's direct transitions fail
//! - an optional default target, the state an unconstrained `descendant()`
//!   compiles to, consulted after the state's own descendant rules
//!
//! Index 0 is the immutable EMPTY sink and index 1 the document root.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tagflow_foundation::StartElement;

use crate::constraint::Constraint;
use crate::handler::ElementHandler;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// State Identifiers
// =============================================================================

/// Handle to a state in a [`StateGraph`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    /// The sink entered when nothing matches. It has no edges and no handlers.
    pub const EMPTY: StateId = StateId(0);

    /// The document root of a top-level model.
    pub const ROOT: StateId = StateId(1);

    /// Returns the arena index of this state.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EMPTY => f.write_str("StateId(EMPTY)"),
            Self(i) => write!(f, "StateId({i})"),
        }
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// A constraint-guarded edge.
#[derive(Clone, Debug)]
pub struct Transition {
    test: Constraint,
    target: StateId,
}

impl Transition {
    /// The test an element must pass to follow this edge.
    #[must_use]
    pub fn test(&self) -> &Constraint {
        &self.test
    }

    /// The state this edge leads to.
    #[must_use]
    pub fn target(&self) -> StateId {
        self.target
    }
}

fn first_match(edges: &[Transition], element: &StartElement) -> Option<StateId> {
    edges
        .iter()
        .find(|edge| edge.test.matches(element))
        .map(|edge| edge.target)
}

// =============================================================================
// State
// =============================================================================

/// One automaton node.
pub struct State<T> {
    transitions: Vec<Transition>,
    descendant_rules: Vec<Transition>,
    default_target: Option<StateId>,
    handlers: Vec<Arc<dyn ElementHandler<T>>>,
    limit: Option<NonZeroU32>,
    reentry: Vec<Constraint>,
}

impl<T> State<T> {
    fn new() -> Self {
        Self {
            transitions: Vec::new(),
            descendant_rules: Vec::new(),
            default_target: None,
            handlers: Vec::new(),
            limit: None,
            reentry: Vec::new(),
        }
    }

    /// Direct transitions in declaration order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Constrained descendant rules in declaration order.
    #[must_use]
    pub fn descendant_rules(&self) -> &[Transition] {
        &self.descendant_rules
    }

    /// Target of the unconstrained descendant rule, if one was declared.
    #[must_use]
    pub fn default_target(&self) -> Option<StateId> {
        self.default_target
    }

    /// Handlers in attachment order.
    #[must_use]
    pub fn handlers(&self) -> &[Arc<dyn ElementHandler<T>>] {
        &self.handlers
    }

    /// Maximum number of entries per run, if limited.
    #[must_use]
    pub fn limit(&self) -> Option<NonZeroU32> {
        self.limit
    }

    /// Returns true if frames below this state inherit rules from it.
    #[must_use]
    pub fn declares_rules(&self) -> bool {
        !self.descendant_rules.is_empty() || self.default_target.is_some()
    }

    /// Follows the first matching direct transition.
    #[must_use]
    pub fn follow(&self, element: &StartElement) -> Option<StateId> {
        first_match(&self.transitions, element)
    }

    /// Follows this state's descendant rules: constrained rules first, in
    /// declaration order, then the unconstrained default.
    #[must_use]
    pub fn follow_rules(&self, element: &StartElement) -> Option<StateId> {
        first_match(&self.descendant_rules, element).or(self.default_target)
    }
}

impl<T> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("transitions", &self.transitions)
            .field("descendant_rules", &self.descendant_rules)
            .field("default_target", &self.default_target)
            .field("handlers", &self.handlers.len())
            .field("limit", &self.limit)
            .finish()
    }
}

// =============================================================================
// State Graph
// =============================================================================

/// Arena of states shared by a builder and every sub-builder it spawns.
pub struct StateGraph<T> {
    id: u64,
    states: Vec<State<T>>,
}

impl<T> Default for StateGraph<T> {
    /// An unusable placeholder with no states, used while a sub-builder
    /// temporarily owns the real arena.
    fn default() -> Self {
        Self {
            id: 0,
            states: Vec::new(),
        }
    }
}

impl<T> StateGraph<T> {
    /// Creates a graph holding only the EMPTY sink and the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            states: vec![State::new(), State::new()],
        }
    }

    /// Identity of this arena; attach points carry it to reject foreign targets.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of states, including the EMPTY sink.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if the graph holds no states (only for placeholders).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns a state.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this graph.
    #[must_use]
    pub fn state(&self, id: StateId) -> &State<T> {
        &self.states[id.0]
    }

    /// Returns true if `id` addresses a state of this graph.
    #[must_use]
    pub fn contains(&self, id: StateId) -> bool {
        id.0 < self.states.len()
    }

    /// Iterates all states with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &State<T>)> {
        self.states.iter().enumerate().map(|(i, s)| (StateId(i), s))
    }

    /// Resolves the state entered by `element` from `current`.
    ///
    /// Direct transitions of `current` win; otherwise the inherited rule
    /// sources are tried most specific first; otherwise the EMPTY sink.
    pub fn resolve<'a>(
        &self,
        current: StateId,
        inherited: impl IntoIterator<Item = &'a StateId>,
        element: &StartElement,
    ) -> StateId {
        if let Some(next) = self.state(current).follow(element) {
            return next;
        }
        inherited
            .into_iter()
            .find_map(|source| self.state(*source).follow_rules(element))
            .unwrap_or(StateId::EMPTY)
    }

    // -------------------------------------------------------------------------
    // Construction (builder only)
    // -------------------------------------------------------------------------

    fn add_state(&mut self) -> StateId {
        self.states.push(State::new());
        StateId(self.states.len() - 1)
    }

    fn state_mut(&mut self, id: StateId) -> &mut State<T> {
        debug_assert_ne!(id, StateId::EMPTY, "the EMPTY sink is immutable");
        &mut self.states[id.0]
    }

    /// Adds a direct transition to a fresh state, or returns the target of an
    /// existing transition with an equal test.
    pub(crate) fn add_transition(&mut self, from: StateId, test: Constraint) -> StateId {
        if let Some(existing) = find_equal(&self.state(from).transitions, &test) {
            return existing;
        }
        let target = self.add_state();
        self.state_mut(from)
            .transitions
            .push(Transition { test, target });
        target
    }

    /// Adds a direct transition to a known state. If an equal test already
    /// exists on `from`, its existing target is returned instead.
    pub(crate) fn link(&mut self, from: StateId, test: Constraint, target: StateId) -> StateId {
        if let Some(existing) = find_equal(&self.state(from).transitions, &test) {
            return existing;
        }
        self.state_mut(from)
            .transitions
            .push(Transition { test, target });
        target
    }

    /// Adds a constrained descendant rule to a fresh state, or returns the
    /// target of an existing rule with an equal test.
    pub(crate) fn add_descendant_rule(&mut self, from: StateId, test: Constraint) -> StateId {
        if let Some(existing) = find_equal(&self.state(from).descendant_rules, &test) {
            return existing;
        }
        let target = self.add_state();
        self.state_mut(from)
            .descendant_rules
            .push(Transition { test, target });
        target
    }

    /// Adds a constrained descendant rule whose target is re-entered on a
    /// repeat match, both from its direct children and from its own default
    /// state at any depth.
    pub(crate) fn add_descendant_match(&mut self, from: StateId, test: Constraint) -> StateId {
        let target = self.add_descendant_rule(from, test.clone());
        if self.state(target).reentry.contains(&test) {
            return target;
        }
        self.link(target, test.clone(), target);
        if let Some(default) = self.state(target).default_target {
            self.link(default, test.clone(), target);
        }
        self.state_mut(target).reentry.push(test);
        target
    }

    /// Returns the default (unconstrained descendant) state of `from`,
    /// creating it on first use.
    pub(crate) fn default_state(&mut self, from: StateId) -> StateId {
        if let Some(existing) = self.state(from).default_target {
            return existing;
        }
        let target = self.add_state();
        self.state_mut(from).default_target = Some(target);
        let reentry = self.state(from).reentry.clone();
        for test in reentry {
            self.link(target, test, from);
        }
        target
    }

    pub(crate) fn attach(&mut self, state: StateId, handler: Arc<dyn ElementHandler<T>>) {
        self.state_mut(state).handlers.push(handler);
    }

    /// Sets the cardinality limit, returning the previous one.
    pub(crate) fn set_limit(&mut self, state: StateId, limit: NonZeroU32) -> Option<NonZeroU32> {
        self.state_mut(state).limit.replace(limit)
    }
}

fn find_equal(edges: &[Transition], test: &Constraint) -> Option<StateId> {
    edges
        .iter()
        .find(|edge| edge.test == *test)
        .map(|edge| edge.target)
}

impl<T> fmt::Debug for StateGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
