//! Integration tests for attribute constraints
//!
//! Tests each attribute predicate end to end, namespaced names, and
//! conjunctions of constraints on a single step.

use tagflow::engine::{Constraint, ModelBuilder, with};
use tagflow::foundation::QName;

use crate::support::{Log, compile, run, starts};

const ITEMS: &str = "<list>\
    <item id='a1' kind='book'/>\
    <item id='b2' kind='bookmark'/>\
    <item id='c3'/>\
    <item kind='film'/>\
    </list>";

fn ids(constraint: Constraint) -> Vec<String> {
    let model = compile(|b| {
        b.element("list")
            .element_where("item", [constraint])
            .attach(tagflow::engine::FnHandler::new().on_start(|el, log: &mut Log| {
                log.push(el.attribute(&"id".into()).unwrap_or("-").to_string());
            }));
    });
    run(&model, ITEMS).unwrap()
}

// =============================================================================
// Attribute Predicates
// =============================================================================

#[test]
fn present() {
    assert_eq!(ids(with("kind").present()), vec!["a1", "b2", "-"]);
    assert_eq!(ids(with("kind").into()), vec!["a1", "b2", "-"]);
}

#[test]
fn equal_and_not_equal() {
    assert_eq!(ids(with("kind").equal_to("book")), vec!["a1"]);
    // an absent attribute is not equal to anything
    assert_eq!(ids(with("kind").not_equal_to("book")), vec!["b2", "c3", "-"]);
}

#[test]
fn contains_and_does_not_contain() {
    assert_eq!(ids(with("kind").contains("book")), vec!["a1", "b2"]);
    assert_eq!(ids(with("kind").does_not_contain("book")), vec!["c3", "-"]);
}

#[test]
fn whole_value_pattern() {
    assert_eq!(ids(with("id").matches("[a-z][0-9]").unwrap()), vec!["a1", "b2", "c3"]);
    // anchored: a partial match is not enough
    assert!(ids(with("id").matches("[0-9]").unwrap()).is_empty());
    assert_eq!(ids(with("id").does_not_match("b.").unwrap()), vec!["a1", "c3", "-"]);
}

#[test]
fn invalid_pattern_is_a_configuration_error() {
    let err = with("id").matches("(").unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn attribute_filter_sees_name_and_value() {
    let constraint = with("id").filter(|name: &QName, value: &str| {
        name.local_name() == "id" && value.ends_with('2')
    });
    assert_eq!(ids(constraint), vec!["b2"]);
}

#[test]
fn conjunction_on_one_step() {
    let model = compile(|b| {
        b.element("list")
            .element_where("item", [with("kind").contains("book"), with("id").equal_to("b2")])
            .attach(starts("h"));
    });
    assert_eq!(run(&model, ITEMS).unwrap(), vec!["h:item"]);
}

#[test]
fn equal_constraints_share_a_state() {
    let mut builder = ModelBuilder::<Log>::new();
    let first = builder
        .element_where("item", [with("kind").equal_to("book")])
        .build_state();
    let second = builder
        .element_where("item", [with("kind").equal_to("book")])
        .build_state();
    let other = builder
        .element_where("item", [with("kind").equal_to("film")])
        .build_state();
    assert_eq!(first, second);
    assert_ne!(first, other);
}

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn namespaced_names_match_by_uri_not_prefix() {
    let model = compile(|b| {
        b.element(QName::namespaced("urn:feed", "feed"))
            .element_where(
                QName::namespaced("urn:feed", "entry"),
                [with(QName::namespaced("urn:meta", "tag")).equal_to("x")],
            )
            .attach(starts("h"));
    });
    let log = run(
        &model,
        "<f:feed xmlns:f='urn:feed' xmlns:m='urn:meta'>\
         <f:entry m:tag='x'/>\
         <entry m:tag='x'/>\
         <g:entry xmlns:g='urn:feed' m:tag='x'/>\
         <f:entry tag='x'/>\
         </f:feed>",
    )
    .unwrap();
    assert_eq!(log, vec!["h:entry", "h:entry"]);
}
