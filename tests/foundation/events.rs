//! Integration tests for the event vocabulary
//!
//! Tests qualified names, attribute maps, and event construction.

use std::collections::HashSet;

use tagflow::foundation::{
    Attributes, Characters, Dtd, EndElement, EventSource, Location, QName, StartElement,
    XmlEvent,
};

// =============================================================================
// Qualified Names
// =============================================================================

#[test]
fn qname_equality_ignores_prefix() {
    let a = QName::namespaced("urn:x", "item").with_prefix("a");
    let b = QName::namespaced("urn:x", "item").with_prefix("b");
    assert_eq!(a, b);
    assert_ne!(a, QName::local("item"));

    let set: HashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn qname_display_uses_clark_notation() {
    assert_eq!(QName::local("item").to_string(), "item");
    assert_eq!(QName::namespaced("urn:x", "item").to_string(), "{urn:x}item");
}

#[test]
fn qname_from_str_is_unqualified() {
    let name: QName = "item".into();
    assert_eq!(name.namespace(), None);
    assert_eq!(name.local_name(), "item");
    assert_eq!(name.prefix(), None);
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn attributes_keep_document_order_and_replace_duplicates() {
    let mut attributes = Attributes::new();
    attributes.insert("b", "1");
    attributes.insert("a", "2");
    attributes.insert("b", "3");

    let entries: Vec<_> = attributes
        .iter()
        .map(|(n, v)| (n.local_name().to_string(), v.to_string()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("b".to_string(), "3".to_string()),
            ("a".to_string(), "2".to_string())
        ]
    );
}

#[test]
fn attributes_distinguish_namespaces() {
    let attributes: Attributes = [
        (QName::local("id"), "plain"),
        (QName::namespaced("urn:x", "id"), "qualified"),
    ]
    .into_iter()
    .collect();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get(&QName::local("id")), Some("plain"));
    assert_eq!(
        attributes.get(&QName::namespaced("urn:x", "id")),
        Some("qualified")
    );
    assert!(!attributes.contains(&QName::namespaced("urn:y", "id")));
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn start_element_builder() {
    let start = StartElement::new("item")
        .with_attribute("id", "7")
        .at(Location::new(3, 5));
    assert_eq!(start.attribute(&"id".into()), Some("7"));
    assert_eq!(start.attribute(&"missing".into()), None);
    assert_eq!(start.location, Some(Location::new(3, 5)));
}

#[test]
fn event_location_reports_every_variant() {
    let here = Location::new(2, 4).with_offset(10);
    let events = [
        XmlEvent::from(StartElement::new("a").at(here)),
        XmlEvent::from(EndElement::new("a").at(here)),
        XmlEvent::from(Characters::new("x").at(here)),
        XmlEvent::Dtd(Dtd {
            text: "<!DOCTYPE a>".to_string(),
            location: Some(here),
        }),
    ];
    for event in &events {
        assert_eq!(event.location(), Some(&here), "{event:?}");
    }
    assert_eq!(XmlEvent::start("a").location(), None);
}

#[test]
fn declarations_are_classified() {
    let dtd = XmlEvent::Dtd(Dtd {
        text: String::new(),
        location: None,
    });
    assert!(dtd.is_declaration());
    assert!(!XmlEvent::start("a").is_declaration());
    assert!(!XmlEvent::text("x").is_declaration());
}

#[test]
fn whitespace_text() {
    assert!(Characters::new(" \n\t").is_whitespace());
    assert!(!Characters::new(" x ").is_whitespace());
}

#[test]
fn location_display() {
    assert_eq!(Location::new(12, 3).to_string(), "12:3");
}

#[test]
fn vectors_of_results_are_sources() {
    let events: Vec<Result<XmlEvent, std::io::Error>> = vec![
        Ok(XmlEvent::start("a")),
        Err(std::io::Error::other("truncated")),
    ];
    let mut source = events.into_iter();
    assert!(matches!(source.next_event(), Some(Ok(_))));
    assert!(matches!(source.next_event(), Some(Err(_))));
    assert!(source.next_event().is_none());
}
