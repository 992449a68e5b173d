//! The markup event vocabulary.
//!
//! Events are produced by an external tokenizer and consumed one at a time by
//! the executor. Declaration payloads are opaque: they are forwarded verbatim
//! to declaration handlers and never interpreted.

use crate::attributes::Attributes;
use crate::location::Location;
use crate::qname::QName;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Element Events
// =============================================================================

/// An element start tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartElement {
    /// Element name
    pub name: QName,
    /// Attributes in document order
    pub attributes: Attributes,
    /// Position of the tag in the source
    pub location: Option<Location>,
}

impl StartElement {
    /// Creates a start element with no attributes.
    #[must_use]
    pub fn new(name: impl Into<QName>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            location: None,
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<QName>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes.get(name)
    }
}

/// An element end tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EndElement {
    /// Element name
    pub name: QName,
    /// Position of the tag in the source
    pub location: Option<Location>,
}

impl EndElement {
    /// Creates an end element.
    #[must_use]
    pub fn new(name: impl Into<QName>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Character data inside an element.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Characters {
    /// The (unescaped) text
    pub text: String,
    /// Position of the text in the source
    pub location: Option<Location>,
}

impl Characters {
    /// Creates a text event.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns true if the text is entirely whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

// =============================================================================
// Declaration Events
// =============================================================================

/// A document type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dtd {
    /// The raw declaration text
    pub text: String,
    /// Position in the source
    pub location: Option<Location>,
}

/// An entity declaration found in a DTD.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityDeclaration {
    /// Entity name
    pub name: String,
    /// Replacement text, for internal entities
    pub replacement: Option<String>,
    /// System identifier, for external entities
    pub system_id: Option<String>,
    /// Position in the source
    pub location: Option<Location>,
}

/// An unresolved entity reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityReference {
    /// Entity name
    pub name: String,
    /// Position in the source
    pub location: Option<Location>,
}

/// A notation declaration found in a DTD.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NotationDeclaration {
    /// Notation name
    pub name: String,
    /// Public identifier
    pub public_id: Option<String>,
    /// System identifier
    pub system_id: Option<String>,
    /// Position in the source
    pub location: Option<Location>,
}

// =============================================================================
// Event
// =============================================================================

/// One event of a markup stream.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum XmlEvent {
    /// An element was opened
    StartElement(StartElement),
    /// An element was closed
    EndElement(EndElement),
    /// Text content
    Characters(Characters),
    /// Document type declaration
    Dtd(Dtd),
    /// Entity declaration
    EntityDeclaration(EntityDeclaration),
    /// Entity reference
    EntityReference(EntityReference),
    /// Notation declaration
    NotationDeclaration(NotationDeclaration),
}

impl XmlEvent {
    /// Shorthand for a start element without attributes.
    #[must_use]
    pub fn start(name: impl Into<QName>) -> Self {
        Self::StartElement(StartElement::new(name))
    }

    /// Shorthand for an end element.
    #[must_use]
    pub fn end(name: impl Into<QName>) -> Self {
        Self::EndElement(EndElement::new(name))
    }

    /// Shorthand for a text event.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Characters(Characters::new(text))
    }

    /// Returns the source location of the event, if known.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::StartElement(e) => e.location.as_ref(),
            Self::EndElement(e) => e.location.as_ref(),
            Self::Characters(e) => e.location.as_ref(),
            Self::Dtd(e) => e.location.as_ref(),
            Self::EntityDeclaration(e) => e.location.as_ref(),
            Self::EntityReference(e) => e.location.as_ref(),
            Self::NotationDeclaration(e) => e.location.as_ref(),
        }
    }

    /// Returns true for the four declaration events.
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Self::Dtd(_)
                | Self::EntityDeclaration(_)
                | Self::EntityReference(_)
                | Self::NotationDeclaration(_)
        )
    }
}

impl From<StartElement> for XmlEvent {
    fn from(e: StartElement) -> Self {
        Self::StartElement(e)
    }
}

impl From<EndElement> for XmlEvent {
    fn from(e: EndElement) -> Self {
        Self::EndElement(e)
    }
}

impl From<Characters> for XmlEvent {
    fn from(e: Characters) -> Self {
        Self::Characters(e)
    }
}
