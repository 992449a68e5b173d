//! tagflow - Declarative selector automata for streaming markup events
//!
//! This crate re-exports all layers of the tagflow system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: tagflow_runtime    — Parser facade, incremental sessions, quick-xml source
//! Layer 1: tagflow_engine     — Constraints, selectors, automaton builder, executor
//! Layer 0: tagflow_foundation — Core types (QName, XmlEvent, Location, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use tagflow::engine::{FnHandler, ModelBuilder};
//! use tagflow::runtime::Parser;
//!
//! let mut builder = ModelBuilder::<Vec<String>>::new();
//! builder
//!     .elements(["xml", "foo", "bar"])
//!     .attach(FnHandler::new().on_characters(|_, text, out: &mut Vec<String>| out.push(text.text.clone())));
//! let parser = Parser::new(builder.build().unwrap());
//!
//! let mut out = Vec::new();
//! parser
//!     .parse_str("<xml><foo><bar>FOO</bar></foo></xml>", &mut out)
//!     .unwrap();
//! assert_eq!(out, vec!["FOO"]);
//! ```

pub use tagflow_engine as engine;
pub use tagflow_foundation as foundation;
pub use tagflow_runtime as runtime;
