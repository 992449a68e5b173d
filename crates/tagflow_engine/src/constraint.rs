//! Element constraints.
//!
//! A [`Constraint`] is a boolean predicate over one start element. Constraints
//! compare by value so that two independently written but identical
//! declarations compile onto the same automaton state. Externally supplied
//! filters have no structural identity and compare by pointer.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tagflow_foundation::{Error, QName, Result, StartElement};

// =============================================================================
// External Filters
// =============================================================================

/// An externally supplied element predicate.
pub trait ElementFilter: Send + Sync {
    /// Returns true if the element is accepted.
    fn matches(&self, element: &StartElement) -> bool;
}

impl<F> ElementFilter for F
where
    F: Fn(&StartElement) -> bool + Send + Sync,
{
    fn matches(&self, element: &StartElement) -> bool {
        self(element)
    }
}

/// An externally supplied attribute value predicate.
pub trait AttributeFilter: Send + Sync {
    /// Returns true if the attribute value is accepted.
    fn matches(&self, name: &QName, value: &str) -> bool;
}

impl<F> AttributeFilter for F
where
    F: Fn(&QName, &str) -> bool + Send + Sync,
{
    fn matches(&self, name: &QName, value: &str) -> bool {
        self(name, value)
    }
}

// =============================================================================
// Attribute Pattern
// =============================================================================

/// A regular expression matched against a whole attribute value.
#[derive(Clone)]
pub struct AttributePattern {
    source: String,
    regex: Regex,
}

impl AttributePattern {
    /// Compiles a pattern; the match is anchored at both ends.
    ///
    /// # Errors
    /// Returns a configuration error if the pattern is not a valid regex.
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$"))
            .map_err(|e| Error::configuration(format!("invalid pattern {source:?}: {e}")))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the whole value matches.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for AttributePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for AttributePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

// =============================================================================
// Constraint
// =============================================================================

/// A predicate over one element's name and attributes.
#[derive(Clone)]
pub enum Constraint {
    /// The element name equals this name
    Name(QName),
    /// The attribute is present
    AttributePresent(QName),
    /// The attribute value equals `value` (or, negated, does not)
    AttributeEquals {
        /// Attribute name
        name: QName,
        /// Expected value
        value: String,
        /// Invert the test; an absent attribute then passes
        negated: bool,
    },
    /// The attribute value contains `value` (or, negated, does not)
    AttributeContains {
        /// Attribute name
        name: QName,
        /// Expected substring
        value: String,
        /// Invert the test; an absent attribute then passes
        negated: bool,
    },
    /// The whole attribute value matches `pattern` (or, negated, does not)
    AttributeMatches {
        /// Attribute name
        name: QName,
        /// Anchored pattern
        pattern: AttributePattern,
        /// Invert the test; an absent attribute then passes
        negated: bool,
    },
    /// The attribute is present and its value is accepted by `filter`
    AttributeFilter {
        /// Attribute name
        name: QName,
        /// External predicate
        filter: Arc<dyn AttributeFilter>,
    },
    /// The element is accepted by an external predicate
    Filter(Arc<dyn ElementFilter>),
    /// Every nested constraint holds
    All(Vec<Constraint>),
}

impl Constraint {
    /// Name equality constraint.
    #[must_use]
    pub fn name(name: impl Into<QName>) -> Self {
        Self::Name(name.into())
    }

    /// Wraps an external element predicate.
    #[must_use]
    pub fn filter(filter: impl ElementFilter + 'static) -> Self {
        Self::Filter(Arc::new(filter))
    }

    /// Wraps a shared external element predicate; clones of the same `Arc`
    /// compare equal.
    #[must_use]
    pub fn filter_shared(filter: Arc<dyn ElementFilter>) -> Self {
        Self::Filter(filter)
    }

    /// Conjunction of constraints.
    ///
    /// Nested conjunctions are flattened and a single constraint is returned
    /// unwrapped, so equal conjunctions compare equal however they were
    /// assembled.
    #[must_use]
    pub fn all<I, C>(constraints: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        let mut flat = Vec::new();
        for constraint in constraints {
            match constraint.into() {
                Self::All(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap_or(Self::All(Vec::new()))
        } else {
            Self::All(flat)
        }
    }

    /// Returns true if this constraint accepts every element.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        matches!(self, Self::All(inner) if inner.is_empty())
    }

    /// Tests the constraint against an element.
    #[must_use]
    pub fn matches(&self, element: &StartElement) -> bool {
        match self {
            Self::Name(name) => element.name == *name,
            Self::AttributePresent(name) => element.attribute(name).is_some(),
            Self::AttributeEquals {
                name,
                value,
                negated,
            } => element.attribute(name).is_some_and(|v| v == value) != *negated,
            Self::AttributeContains {
                name,
                value,
                negated,
            } => element.attribute(name).is_some_and(|v| v.contains(value.as_str())) != *negated,
            Self::AttributeMatches {
                name,
                pattern,
                negated,
            } => element.attribute(name).is_some_and(|v| pattern.is_match(v)) != *negated,
            Self::AttributeFilter { name, filter } => element
                .attribute(name)
                .is_some_and(|v| filter.matches(name, v)),
            Self::Filter(filter) => filter.matches(element),
            Self::All(constraints) => constraints.iter().all(|c| c.matches(element)),
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Name(a), Self::Name(b)) | (Self::AttributePresent(a), Self::AttributePresent(b)) => {
                a == b
            }
            (
                Self::AttributeEquals {
                    name: n1,
                    value: v1,
                    negated: g1,
                },
                Self::AttributeEquals {
                    name: n2,
                    value: v2,
                    negated: g2,
                },
            )
            | (
                Self::AttributeContains {
                    name: n1,
                    value: v1,
                    negated: g1,
                },
                Self::AttributeContains {
                    name: n2,
                    value: v2,
                    negated: g2,
                },
            ) => n1 == n2 && v1 == v2 && g1 == g2,
            (
                Self::AttributeMatches {
                    name: n1,
                    pattern: p1,
                    negated: g1,
                },
                Self::AttributeMatches {
                    name: n2,
                    pattern: p2,
                    negated: g2,
                },
            ) => n1 == n2 && p1 == p2 && g1 == g2,
            (
                Self::AttributeFilter {
                    name: n1,
                    filter: f1,
                },
                Self::AttributeFilter {
                    name: n2,
                    filter: f2,
                },
            ) => n1 == n2 && std::ptr::addr_eq(Arc::as_ptr(f1), Arc::as_ptr(f2)),
            (Self::Filter(f1), Self::Filter(f2)) => {
                std::ptr::addr_eq(Arc::as_ptr(f1), Arc::as_ptr(f2))
            }
            (Self::All(a), Self::All(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = |negated: bool| if negated { "!" } else { "" };
        match self {
            Self::Name(name) => write!(f, "name={name}"),
            Self::AttributePresent(name) => write!(f, "@{name}"),
            Self::AttributeEquals {
                name,
                value,
                negated,
            } => write!(f, "@{name}{}={value:?}", not(*negated)),
            Self::AttributeContains {
                name,
                value,
                negated,
            } => write!(f, "@{name}{}~{value:?}", not(*negated)),
            Self::AttributeMatches {
                name,
                pattern,
                negated,
            } => write!(f, "@{name}{}={pattern:?}", not(*negated)),
            Self::AttributeFilter { name, .. } => write!(f, "@{name}=<filter>"),
            Self::Filter(_) => f.write_str("<filter>"),
            Self::All(constraints) => f.debug_list().entries(constraints).finish(),
        }
    }
}

// =============================================================================
// Attribute Matcher
// =============================================================================

/// Factory for attribute constraints, obtained from [`with`].
///
/// Used directly as a constraint it tests for presence of the attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMatcher {
    name: QName,
}

/// Starts an attribute constraint: `with("id").equal_to("x")`.
#[must_use]
pub fn with(name: impl Into<QName>) -> AttributeMatcher {
    AttributeMatcher { name: name.into() }
}

impl AttributeMatcher {
    /// The attribute is present.
    #[must_use]
    pub fn present(self) -> Constraint {
        Constraint::AttributePresent(self.name)
    }

    /// The attribute value equals `value`.
    #[must_use]
    pub fn equal_to(self, value: impl Into<String>) -> Constraint {
        Constraint::AttributeEquals {
            name: self.name,
            value: value.into(),
            negated: false,
        }
    }

    /// The attribute is absent or its value differs from `value`.
    #[must_use]
    pub fn not_equal_to(self, value: impl Into<String>) -> Constraint {
        Constraint::AttributeEquals {
            name: self.name,
            value: value.into(),
            negated: true,
        }
    }

    /// The attribute value contains `value`.
    #[must_use]
    pub fn contains(self, value: impl Into<String>) -> Constraint {
        Constraint::AttributeContains {
            name: self.name,
            value: value.into(),
            negated: false,
        }
    }

    /// The attribute is absent or its value does not contain `value`.
    #[must_use]
    pub fn does_not_contain(self, value: impl Into<String>) -> Constraint {
        Constraint::AttributeContains {
            name: self.name,
            value: value.into(),
            negated: true,
        }
    }

    /// The whole attribute value matches a regular expression.
    ///
    /// # Errors
    /// Returns a configuration error if the pattern is invalid.
    pub fn matches(self, pattern: &str) -> Result<Constraint> {
        Ok(Constraint::AttributeMatches {
            name: self.name,
            pattern: AttributePattern::new(pattern)?,
            negated: false,
        })
    }

    /// The attribute is absent or its value does not match a regular expression.
    ///
    /// # Errors
    /// Returns a configuration error if the pattern is invalid.
    pub fn does_not_match(self, pattern: &str) -> Result<Constraint> {
        Ok(Constraint::AttributeMatches {
            name: self.name,
            pattern: AttributePattern::new(pattern)?,
            negated: true,
        })
    }

    /// The attribute is present and accepted by an external predicate.
    #[must_use]
    pub fn filter(self, filter: impl AttributeFilter + 'static) -> Constraint {
        Constraint::AttributeFilter {
            name: self.name,
            filter: Arc::new(filter),
        }
    }
}

impl From<AttributeMatcher> for Constraint {
    fn from(matcher: AttributeMatcher) -> Self {
        matcher.present()
    }
}
