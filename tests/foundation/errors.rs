//! Integration tests for Error types
//!
//! Tests error construction, display, locations, and error kinds.

use tagflow::foundation::{BoxError, Error, ErrorKind, Location, QName};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_configuration() {
    let err = Error::configuration("only() requires a limit of at least 1");
    assert!(err.is_configuration());
    assert!(!err.is_cardinality());
    assert!(err.to_string().contains("at least 1"));
}

#[test]
fn error_cardinality() {
    let err = Error::cardinality_exceeded(QName::local("foo"), 2);
    assert!(err.is_cardinality());
    let msg = err.to_string();
    assert!(msg.contains("foo"));
    assert!(msg.contains('2'));
}

#[test]
fn error_handler_displays_the_inner_message() {
    let inner: BoxError = "bad row".into();
    let err = Error::handler(inner);
    assert!(matches!(err.kind, ErrorKind::Handler(_)));
    assert_eq!(err.to_string(), "bad row");
}

#[test]
fn error_source_keeps_the_original() {
    let err = Error::source_error(std::io::Error::other("disk"));
    let ErrorKind::Source(inner) = &err.kind else {
        panic!("expected a source error");
    };
    assert!(inner.downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn error_protocol_and_depth() {
    assert!(matches!(
        Error::protocol("late").kind,
        ErrorKind::Protocol(ref m) if m == "late"
    ));
    assert!(matches!(
        Error::depth_exceeded(8).kind,
        ErrorKind::DepthExceeded { limit: 8 }
    ));
}

// =============================================================================
// Locations
// =============================================================================

#[test]
fn error_display_appends_location() {
    let err = Error::protocol("late").at(Some(Location::new(4, 2)));
    assert_eq!(err.to_string(), "protocol error: late at 4:2");
}

#[test]
fn error_at_keeps_the_first_location() {
    let err = Error::protocol("late")
        .at(Some(Location::new(1, 1)))
        .at(Some(Location::new(9, 9)));
    assert_eq!(err.location, Some(Location::new(1, 1)));

    let err = Error::protocol("late").at(None);
    assert_eq!(err.location, None);
    assert_eq!(err.to_string(), "protocol error: late");
}
