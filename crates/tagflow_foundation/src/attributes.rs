//! Attribute map carried by start elements.

use crate::qname::QName;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Attributes of one element, in document order.
///
/// Elements rarely carry more than a handful of attributes, so lookups are a
/// linear scan over a vector rather than a hash table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attributes {
    entries: Vec<(QName, String)>,
}

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing any existing value for the same name.
    pub fn insert(&mut self, name: impl Into<QName>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn get(&self, name: &QName) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn contains(&self, name: &QName) -> bool {
        self.get(name).is_some()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates attributes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.entries.iter().map(|(n, v)| (n, v.as_str()))
    }
}

impl<N: Into<QName>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}
