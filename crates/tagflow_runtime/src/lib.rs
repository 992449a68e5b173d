//! Parser facade and markup tokenizer integration for tagflow.
//!
//! This crate provides:
//! - [`Parser`] - Batch runs of a compiled model over any event source
//! - [`ParseSession`] - Incremental runs advanced one event at a time
//! - [`ParserConfig`] - Run limits and text handling
//! - [`XmlReaderSource`] - An event source over markup text (feature `quick-xml`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod parser;
#[cfg(feature = "quick-xml")]
pub mod xml;

pub use config::ParserConfig;
pub use parser::{ParseSession, Parser};
#[cfg(feature = "quick-xml")]
pub use xml::{SourceError, XmlReaderSource};
