//! Selector compiler, automaton model, and streaming executor for tagflow.
//!
//! This crate provides:
//! - [`Constraint`] - Predicates over an element's name and attributes
//! - [`ModelBuilder`] / [`Selector`] - The declarative selector DSL
//! - [`Model`] - The compiled, shareable automaton
//! - [`Executor`] - Drives one event sequence against a model
//! - [`ElementHandler`] / [`DeclarationHandler`] - Callbacks invoked on matches
//! - [`ListHandler`] - Ready-made handler for repeated list items

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod automaton;
pub mod builder;
pub mod config;
pub mod constraint;
pub mod executor;
pub mod handler;
pub mod list;
pub mod model;
pub mod selector;

pub use automaton::{State, StateGraph, StateId, Transition};
pub use builder::{AttachPoint, ModelBuilder};
pub use config::{ModelConfig, RunConfig};
pub use constraint::{
    AttributeFilter, AttributeMatcher, AttributePattern, Constraint, ElementFilter, with,
};
pub use executor::Executor;
pub use handler::{DeclarationHandler, ElementHandler, FnHandler};
pub use list::{ListConsumer, ListHandler, VecListConsumer};
pub use model::Model;
pub use selector::{Selector, SelectorId, SelectorKind};
