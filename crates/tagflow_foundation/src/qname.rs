//! Namespace-qualified names.
//!
//! Two names are equal when their namespace URI and local part are equal.
//! The prefix is carried for display only, so `a:item` and `b:item` bound to
//! the same URI compare equal.

use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A qualified element or attribute name.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    namespace: Option<String>,
    local: String,
    prefix: Option<String>,
}

impl QName {
    /// Creates a name with no namespace.
    #[must_use]
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
            prefix: None,
        }
    }

    /// Creates a name in the given namespace.
    ///
    /// An empty namespace URI is treated as no namespace.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            namespace: (!namespace.is_empty()).then_some(namespace),
            local: local.into(),
            prefix: None,
        }
    }

    /// Sets the display prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Returns the namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Returns the prefix the name was written with, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl From<&str> for QName {
    fn from(local: &str) -> Self {
        Self::local(local)
    }
}

impl From<String> for QName {
    fn from(local: String) -> Self {
        Self::local(local)
    }
}

impl From<&QName> for QName {
    fn from(name: &QName) -> Self {
        name.clone()
    }
}

/// Displays in Clark notation: `{uri}local`, or just `local`.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}
