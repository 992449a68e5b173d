//! Integration tests for batch parsing
//!
//! Tests the parser facade over markup text and over caller-supplied events.

use std::sync::Arc;
use std::thread;

use tagflow::engine::{FnHandler, ModelBuilder};
use tagflow::foundation::{ErrorKind, XmlEvent};
use tagflow::runtime::{Parser, ParserConfig};

type Log = Vec<String>;

fn traced() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn text_parser(declare: impl FnOnce(&mut ModelBuilder<Log>)) -> Parser<Log> {
    let mut builder = ModelBuilder::new();
    declare(&mut builder);
    Parser::new(builder.build().unwrap())
}

fn record_text(tag: &'static str) -> FnHandler<Log> {
    FnHandler::new().on_characters(move |_, text, log: &mut Log| {
        log.push(format!("{tag}:{}", text.text));
    })
}

fn record_start(tag: &'static str) -> FnHandler<Log> {
    FnHandler::new().on_start(move |el, log: &mut Log| {
        log.push(format!("{tag}:{}", el.name.local_name()));
    })
}

// =============================================================================
// Text Input
// =============================================================================

#[test]
fn element_text_is_delivered_once() {
    traced();
    let parser = text_parser(|b| {
        b.elements(["xml", "foo", "bar"]).attach(record_text("h"));
    });
    let mut log = Vec::new();
    parser
        .parse_str("<xml><foo><bar>FOO</bar></foo></xml>", &mut log)
        .unwrap();
    assert_eq!(log, vec!["h:FOO"]);
}

#[test]
fn sibling_handlers_see_their_own_elements() {
    let parser = text_parser(|b| {
        b.elements(["xml", "foo"]).attach(record_start("foo"));
        b.elements(["xml", "bar"]).attach(record_start("bar"));
    });
    let mut log = Vec::new();
    parser.parse_str("<xml><foo/><bar/></xml>", &mut log).unwrap();
    assert_eq!(log, vec!["foo:foo", "bar:bar"]);
}

#[test]
fn whitespace_is_reported_unless_trimmed() {
    let xml = "<a>\n  <b> x </b>\n</a>";
    let declare = |b: &mut ModelBuilder<Log>| {
        b.descendant().attach(record_text("t"));
    };

    let mut log = Vec::new();
    text_parser(declare).parse_str(xml, &mut log).unwrap();
    assert_eq!(log, vec!["t:\n  ", "t: x ", "t:\n"]);

    let mut log = Vec::new();
    text_parser(declare)
        .with_config(ParserConfig::default().with_trim_text(true))
        .parse_str(xml, &mut log)
        .unwrap();
    assert_eq!(log, vec!["t:x"]);
}

#[test]
fn entities_and_cdata_become_text() {
    let parser = text_parser(|b| {
        b.element("a").attach(record_text("t"));
    });
    let mut log = Vec::new();
    parser
        .parse_str("<a>1 &lt; 2<![CDATA[ & <b/> ]]></a>", &mut log)
        .unwrap();
    assert_eq!(log, vec!["t:1 < 2", "t: & <b/> "]);
}

#[test]
fn comments_and_processing_instructions_are_skipped() {
    let parser = text_parser(|b| {
        b.descendant().attach(record_start("e"));
    });
    let mut log = Vec::new();
    parser
        .parse_str(
            "<?xml version='1.0'?><!-- c --><a><?pi data?><b/><!-- d --></a>",
            &mut log,
        )
        .unwrap();
    assert_eq!(log, vec!["e:a", "e:b"]);
}

#[test]
fn external_entities_are_never_expanded() {
    let parser = text_parser(|b| {
        b.element("foo").attach(record_text("t"));
    });
    let mut log = Vec::new();
    let _ = parser.parse_str(
        "<!DOCTYPE foo [<!ENTITY xxe SYSTEM \"file:///etc/passwd\">]><foo>&xxe;</foo>",
        &mut log,
    );
    assert!(log.is_empty());
}

#[test]
fn malformed_markup_stops_the_run() {
    let parser = text_parser(|b| {
        b.descendant().attach(record_start("e"));
    });
    let mut log = Vec::new();
    let err = parser.parse_str("<a><b></a>", &mut log).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Source(_)));
    assert_eq!(log, vec!["e:a", "e:b"]);
}

#[test]
fn depth_limit_from_parser_config() {
    let parser = text_parser(|b| {
        b.descendant().attach(record_start("e"));
    })
    .with_config(ParserConfig::default().with_max_depth(1));
    let err = parser.parse_str("<a><b/></a>", &mut Vec::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DepthExceeded { limit: 1 }));
}

// =============================================================================
// Caller-Supplied Events
// =============================================================================

#[test]
fn parse_accepts_any_event_iterator() {
    let parser = text_parser(|b| {
        b.elements(["xml", "foo"]).attach(record_text("h"));
    });
    let events = vec![
        XmlEvent::start("xml"),
        XmlEvent::start("foo"),
        XmlEvent::text("YES"),
        XmlEvent::end("foo"),
        XmlEvent::end("xml"),
    ];
    let mut log = Vec::new();
    parser
        .parse(
            events.into_iter().map(Ok::<_, std::convert::Infallible>),
            &mut log,
        )
        .unwrap();
    assert_eq!(log, vec!["h:YES"]);
}

// =============================================================================
// Sharing
// =============================================================================

#[test]
fn one_model_serves_concurrent_runs() {
    let parser = text_parser(|b| {
        b.descendant_named("n").attach(record_start("n"));
    });
    let model = Arc::clone(parser.model());

    let handles: Vec<_> = (1..=4)
        .map(|count| {
            let parser = Parser::from_shared(Arc::clone(&model));
            thread::spawn(move || {
                let xml = format!("<root>{}</root>", "<n/>".repeat(count));
                let mut log = Vec::new();
                parser.parse_str(&xml, &mut log).unwrap();
                log.len()
            })
        })
        .collect();

    let counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
}

#[test]
fn repeated_runs_start_fresh() {
    let parser = text_parser(|b| {
        b.elements(["xml", "foo"]).only(1).unwrap().attach(record_start("h"));
    });
    let copy = parser.clone();
    for parser in [&parser, &copy, &parser] {
        let mut log = Vec::new();
        parser.parse_str("<xml><foo/></xml>", &mut log).unwrap();
        assert_eq!(log, vec!["h:foo"]);
    }
}
