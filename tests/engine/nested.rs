//! Integration tests for nested builders and explicit transitions
//!
//! Tests handlers that declare selectors relative to their own state, cyclic
//! transitions between attach points, and the list handler.

use std::sync::Arc;

use tagflow::engine::{
    Constraint, ElementHandler, Executor, ListConsumer, ListHandler, ModelBuilder,
};
use tagflow::foundation::{BoxError, Result, StartElement};
use tagflow::runtime::XmlReaderSource;

use crate::support::{Log, compile, run, starts, texts};

/// Declares `element(child)` below wherever it is attached.
struct Scoped {
    child: &'static str,
    inner: Option<Arc<dyn ElementHandler<Log>>>,
}

impl ElementHandler<Log> for Scoped {
    fn build(&self, builder: &mut ModelBuilder<Log>) -> Result<()> {
        let selector = builder.element(self.child);
        match &self.inner {
            Some(inner) => selector.attach_shared(Arc::clone(inner)),
            None => selector.attach(texts("nested")),
        };
        Ok(())
    }
}

// =============================================================================
// Nested Builders
// =============================================================================

#[test]
fn nested_builder_declares_relative_to_its_attachment() {
    let model = compile(|b| {
        b.element("xml").attach(Scoped {
            child: "foo",
            inner: None,
        });
    });
    assert_eq!(
        run(&model, "<xml><foo>YES</foo></xml>").unwrap(),
        vec!["nested:YES"]
    );
    assert!(run(&model, "<foo>NO</foo>").unwrap().is_empty());
}

#[test]
fn nested_builders_nest() {
    let inner: Arc<dyn ElementHandler<Log>> = Arc::new(Scoped {
        child: "bar",
        inner: None,
    });
    let model = compile(|b| {
        b.element("xml").attach(Scoped {
            child: "foo",
            inner: Some(inner),
        });
    });
    assert_eq!(
        run(&model, "<xml><foo><bar>YES</bar></foo></xml>").unwrap(),
        vec!["nested:YES"]
    );
}

#[test]
fn nested_builder_under_a_descendant() {
    let model = compile(|b| {
        b.descendant_named("section").attach(Scoped {
            child: "title",
            inner: None,
        });
    });
    let log = run(
        &model,
        "<doc><section><title>A</title><section><title>B</title></section></section></doc>",
    )
    .unwrap();
    assert_eq!(log, vec!["nested:A", "nested:B"]);
}

#[test]
fn nested_build_errors_abort_the_model() {
    struct Invalid;
    impl ElementHandler<Log> for Invalid {
        fn build(&self, builder: &mut ModelBuilder<Log>) -> Result<()> {
            builder.element("x").only(0)?;
            Ok(())
        }
    }

    let mut builder = ModelBuilder::<Log>::new();
    builder.element("xml").attach(Invalid);
    assert!(builder.build().unwrap_err().is_configuration());
}

// =============================================================================
// Explicit Transitions
// =============================================================================

const CYCLES: [&str; 3] = [
    "<a>Text</a>",
    "<a><b><a>Text</a></b></a>",
    "<a><b><a><b><a>Text</a></b></a></b></a>",
];

#[test]
fn named_transition_back_to_an_ancestor() {
    let mut builder = ModelBuilder::<Log>::new();
    let target = builder.element("a").attach_point();
    builder
        .element("a")
        .element("b")
        .add_transition("a", &target)
        .unwrap();
    builder.element("a").attach(texts("text"));
    builder.element("a").attach(starts("start"));
    let model = builder.build().unwrap().into_shared();

    for (depth, xml) in CYCLES.into_iter().enumerate() {
        let log = run(&model, xml).unwrap();
        let starts = log.iter().filter(|l| l.starts_with("start:")).count();
        assert_eq!(starts, depth + 1, "{xml}");
        assert_eq!(log.last().map(String::as_str), Some("text:Text"), "{xml}");
    }
}

#[test]
fn filtered_transition_back_to_an_ancestor() {
    let mut builder = ModelBuilder::<Log>::new();
    let target = builder.element("a").attach_point();
    builder
        .element("a")
        .element("b")
        .add_transition_where(
            Constraint::filter(|el: &StartElement| el.name.local_name() == "a"),
            &target,
        )
        .unwrap();
    builder.element("a").attach(texts("text"));
    let model = builder.build().unwrap().into_shared();

    for xml in CYCLES {
        assert_eq!(run(&model, xml).unwrap(), vec!["text:Text"], "{xml}");
    }
}

#[test]
fn attach_point_from_another_model_is_rejected() {
    let mut other = ModelBuilder::<Log>::new();
    let foreign = other.element("a").attach_point();

    let mut builder = ModelBuilder::<Log>::new();
    let err = builder
        .element("a")
        .add_transition("b", &foreign)
        .unwrap_err();
    assert!(err.is_configuration());
}

// =============================================================================
// List Handler
// =============================================================================

#[derive(Default)]
struct Rows {
    events: Vec<String>,
}

impl ListConsumer for Rows {
    fn begin_list(&mut self) {
        self.events.push("begin".to_string());
    }

    fn consume_element_start(&mut self, element: &StartElement) -> Result<(), BoxError> {
        let id = element.attribute(&"id".into()).unwrap_or("?");
        self.events.push(format!("row {id}"));
        Ok(())
    }

    fn end_list(&mut self) {
        self.events.push("end".to_string());
    }
}

#[test]
fn list_handler_feeds_each_item() {
    let mut builder = ModelBuilder::<Rows>::new();
    builder.elements(["doc", "table"]).attach(ListHandler::new("row"));
    let model = builder.build().unwrap().into_shared();

    let mut rows = Rows::default();
    Executor::new(model)
        .run(
            XmlReaderSource::new(
                "<doc><table><row id='1'/><other id='x'/><row id='2'>text</row></table></doc>",
            ),
            &mut rows,
        )
        .unwrap();
    assert_eq!(rows.events, vec!["begin", "row 1", "row 2", "end"]);
}

#[test]
fn list_consumer_errors_abort_the_run() {
    struct Strict;
    impl ListConsumer for Strict {
        fn consume_element_start(&mut self, element: &StartElement) -> Result<(), BoxError> {
            Err(format!("unexpected {}", element.name).into())
        }
    }

    let mut builder = ModelBuilder::<Strict>::new();
    builder.element("list").attach(ListHandler::new("item"));
    let model = builder.build().unwrap().into_shared();

    let err = Executor::new(model)
        .run(XmlReaderSource::new("<list><item/></list>"), &mut Strict)
        .unwrap_err();
    assert_eq!(err.to_string(), "unexpected item at 1:7");
}
