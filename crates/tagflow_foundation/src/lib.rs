//! Core types, events, and errors for tagflow.
//!
//! This crate provides:
//! - [`QName`] - Namespace-qualified element and attribute names
//! - [`Attributes`] - The attribute map carried by a start element
//! - [`Location`] - Source positions attached to events and errors
//! - [`XmlEvent`] - The event vocabulary consumed by the executor
//! - [`EventSource`] - The pull interface an external tokenizer implements
//! - [`Error`] - Error type shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attributes;
pub mod error;
pub mod event;
pub mod location;
pub mod qname;
pub mod source;

pub use attributes::Attributes;
pub use error::{BoxError, Error, ErrorKind, Result};
pub use event::{
    Characters, Dtd, EndElement, EntityDeclaration, EntityReference, NotationDeclaration,
    StartElement, XmlEvent,
};
pub use location::Location;
pub use qname::QName;
pub use source::EventSource;
