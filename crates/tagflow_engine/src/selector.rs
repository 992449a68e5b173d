//! The declarative selector tree and its fluent combinator API.
//!
//! Selectors live in a per-builder arena. A [`Selector`] is a short-lived
//! cursor into that arena borrowing the builder mutably, so declarations read
//! as one chain:
//!
//! ```
//! use tagflow_engine::{FnHandler, ModelBuilder, with};
//!
//! let mut builder = ModelBuilder::<Vec<String>>::new();
//! builder
//!     .element("feed")
//!     .descendant_named_where("entry", [with("lang").equal_to("en")])
//!     .attach(FnHandler::new().on_start(|el, out: &mut Vec<String>| out.push(el.name.to_string())));
//! let model = builder.build().unwrap();
//! assert!(model.state_count() > 2);
//! ```

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use tagflow_foundation::{Error, QName, Result};

use crate::automaton::StateId;
use crate::builder::{AttachPoint, ModelBuilder};
use crate::constraint::{Constraint, ElementFilter};
use crate::handler::ElementHandler;

// =============================================================================
// Selector Nodes
// =============================================================================

/// Handle to a declared selector within one builder.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SelectorId(pub(crate) usize);

/// The positional kind of a selector step.
#[derive(Clone)]
pub enum SelectorKind {
    /// A direct child with the given name
    NamedChild(QName),
    /// Any direct child
    AnyChild,
    /// Any element at any depth
    Descendant,
    /// An element with the given name at any depth
    NamedDescendant(QName),
    /// A direct child accepted by an external predicate
    Filter(Arc<dyn ElementFilter>),
}

impl SelectorKind {
    /// Returns true for the kinds matched at any depth.
    #[must_use]
    pub fn is_descendant(&self) -> bool {
        matches!(self, Self::Descendant | Self::NamedDescendant(_))
    }

    fn implied_test(&self) -> Option<Constraint> {
        match self {
            Self::NamedChild(name) | Self::NamedDescendant(name) => {
                Some(Constraint::Name(name.clone()))
            }
            Self::Filter(filter) => Some(Constraint::Filter(Arc::clone(filter))),
            Self::AnyChild | Self::Descendant => None,
        }
    }
}

impl PartialEq for SelectorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NamedChild(a), Self::NamedChild(b))
            | (Self::NamedDescendant(a), Self::NamedDescendant(b)) => a == b,
            (Self::AnyChild, Self::AnyChild) | (Self::Descendant, Self::Descendant) => true,
            (Self::Filter(a), Self::Filter(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Debug for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedChild(name) => write!(f, "NamedChild({name})"),
            Self::AnyChild => f.write_str("AnyChild"),
            Self::Descendant => f.write_str("Descendant"),
            Self::NamedDescendant(name) => write!(f, "NamedDescendant({name})"),
            Self::Filter(_) => f.write_str("Filter(<filter>)"),
        }
    }
}

/// One declared selector step.
#[derive(Debug)]
pub(crate) struct SelectorNode {
    pub(crate) parent: Option<SelectorId>,
    pub(crate) kind: SelectorKind,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) limit: Option<NonZeroU32>,
    pub(crate) state: Option<StateId>,
}

impl SelectorNode {
    pub(crate) fn new(
        parent: Option<SelectorId>,
        kind: SelectorKind,
        constraints: Vec<Constraint>,
    ) -> Self {
        Self {
            parent,
            kind,
            constraints,
            limit: None,
            state: None,
        }
    }

    /// Structural equality used for hash-consing.
    pub(crate) fn same_as(&self, kind: &SelectorKind, constraints: &[Constraint]) -> bool {
        self.kind == *kind && self.constraints == constraints
    }

    /// The combined edge test: the kind's implied test, then the constraints.
    pub(crate) fn test(&self) -> Constraint {
        Constraint::all(
            self.kind
                .implied_test()
                .into_iter()
                .chain(self.constraints.iter().cloned()),
        )
    }
}

fn collect<I, C>(constraints: I) -> Vec<Constraint>
where
    I: IntoIterator<Item = C>,
    C: Into<Constraint>,
{
    constraints.into_iter().map(Into::into).collect()
}

// =============================================================================
// Fluent Selector
// =============================================================================

/// A cursor at one selector of a [`ModelBuilder`].
///
/// `id() == None` denotes the builder's root.
pub struct Selector<'b, T> {
    builder: &'b mut ModelBuilder<T>,
    id: Option<SelectorId>,
}

impl<'b, T> Selector<'b, T> {
    pub(crate) fn new(builder: &'b mut ModelBuilder<T>, id: Option<SelectorId>) -> Self {
        Self { builder, id }
    }

    fn step(self, kind: SelectorKind, constraints: Vec<Constraint>) -> Self {
        let id = self.builder.declare(self.id, kind, constraints);
        Self {
            builder: self.builder,
            id: Some(id),
        }
    }

    /// The selector this cursor points at, `None` for the builder root.
    #[must_use]
    pub fn id(&self) -> Option<SelectorId> {
        self.id
    }

    /// A direct child named `name`.
    #[must_use]
    pub fn element(self, name: impl Into<QName>) -> Self {
        self.step(SelectorKind::NamedChild(name.into()), Vec::new())
    }

    /// A direct child named `name` satisfying every constraint.
    #[must_use]
    pub fn element_where<I, C>(self, name: impl Into<QName>, constraints: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.step(SelectorKind::NamedChild(name.into()), collect(constraints))
    }

    /// A path of direct children, one per name. An empty path selects `self`.
    #[must_use]
    pub fn elements<I, N>(self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<QName>,
    {
        names.into_iter().fold(self, |selector, name| selector.element(name))
    }

    /// Any direct child.
    #[must_use]
    pub fn child(self) -> Self {
        self.step(SelectorKind::AnyChild, Vec::new())
    }

    /// Any direct child satisfying every constraint.
    #[must_use]
    pub fn child_where<I, C>(self, constraints: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.step(SelectorKind::AnyChild, collect(constraints))
    }

    /// Any direct child accepted by `filter`.
    #[must_use]
    pub fn child_matching(self, filter: impl ElementFilter + 'static) -> Self {
        self.child_matching_shared(Arc::new(filter))
    }

    /// Any direct child accepted by a filter shared with other selectors.
    ///
    /// Filters compare by identity, so declaring the same shared filter twice
    /// under one parent selects the same state.
    #[must_use]
    pub fn child_matching_shared(self, filter: Arc<dyn ElementFilter>) -> Self {
        self.step(SelectorKind::Filter(filter), Vec::new())
    }

    /// Every element at any depth below this point.
    #[must_use]
    pub fn descendant(self) -> Self {
        self.step(SelectorKind::Descendant, Vec::new())
    }

    /// Every element at any depth below this point satisfying every constraint.
    #[must_use]
    pub fn descendant_where<I, C>(self, constraints: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.step(SelectorKind::Descendant, collect(constraints))
    }

    /// Every element named `name` at any depth below this point.
    #[must_use]
    pub fn descendant_named(self, name: impl Into<QName>) -> Self {
        self.step(SelectorKind::NamedDescendant(name.into()), Vec::new())
    }

    /// Every element named `name` at any depth below this point satisfying
    /// every constraint.
    #[must_use]
    pub fn descendant_named_where<I, C>(self, name: impl Into<QName>, constraints: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        self.step(SelectorKind::NamedDescendant(name.into()), collect(constraints))
    }

    /// Limits the selected element to `n` occurrences per run.
    ///
    /// # Errors
    /// Returns a configuration error if `n` is zero, or if this cursor is the
    /// document root of a top-level builder.
    pub fn only(self, n: u32) -> Result<Self> {
        let limit = NonZeroU32::new(n)
            .ok_or_else(|| Error::configuration("only() requires a limit of at least 1"))?;
        self.builder.limit(self.id, limit)?;
        Ok(self)
    }

    /// Compiles this selector (and its ancestors) and returns its state.
    pub fn build_state(&mut self) -> StateId {
        self.builder.state_of(self.id)
    }

    /// Registers a handler on this selector's state.
    pub fn attach(self, handler: impl ElementHandler<T> + 'static) -> Self {
        self.attach_shared(Arc::new(handler))
    }

    /// Registers an already shared handler on this selector's state.
    pub fn attach_shared(mut self, handler: Arc<dyn ElementHandler<T>>) -> Self {
        let state = self.build_state();
        self.builder.attach_to(state, handler);
        self
    }

    /// Returns a handle to this selector's state for explicit transitions.
    pub fn attach_point(&mut self) -> AttachPoint {
        let state = self.build_state();
        self.builder.attach_point_for(state)
    }

    /// Adds a direct edge to `target` taken by children named `name`.
    ///
    /// # Errors
    /// Returns a configuration error if `target` belongs to another model.
    pub fn add_transition(&mut self, name: impl Into<QName>, target: &AttachPoint) -> Result<()> {
        self.add_transition_where(Constraint::Name(name.into()), target)
    }

    /// Adds a direct edge to `target` taken by children satisfying `test`.
    ///
    /// # Errors
    /// Returns a configuration error if `target` belongs to another model.
    pub fn add_transition_where(
        &mut self,
        test: impl Into<Constraint>,
        target: &AttachPoint,
    ) -> Result<()> {
        let from = self.build_state();
        self.builder.link(from, test.into(), target)
    }
}

impl<T> fmt::Debug for Selector<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector").field("id", &self.id).finish()
    }
}
