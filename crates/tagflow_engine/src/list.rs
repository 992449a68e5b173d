//! Ready-made handler for flat lists of repeated items.

use std::fmt;

use tagflow_foundation::{BoxError, EndElement, QName, Result, StartElement};

use crate::builder::ModelBuilder;
use crate::handler::ElementHandler;

/// Receives the items of a list selected by a [`ListHandler`].
pub trait ListConsumer {
    /// The list element opened.
    fn begin_list(&mut self) {}

    /// An item element opened.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn consume_element_start(&mut self, element: &StartElement) -> Result<(), BoxError>;

    /// An item element closed.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn consume_element_end(&mut self, element: &EndElement) -> Result<(), BoxError> {
        let _ = element;
        Ok(())
    }

    /// The list element closed.
    fn end_list(&mut self) {}
}

/// A [`ListConsumer`] that maps each item element to a value and keeps them
/// in document order.
///
/// The collected items are cleared whenever a list opens, so after a run they
/// hold the items of the last list seen.
pub struct VecListConsumer<I, F> {
    items: Vec<I>,
    map: F,
}

impl<I, F> VecListConsumer<I, F>
where
    F: FnMut(&StartElement) -> Result<I, BoxError>,
{
    /// Creates an empty consumer converting item elements with `map`.
    #[must_use]
    pub fn new(map: F) -> Self {
        Self {
            items: Vec::new(),
            map,
        }
    }
}

impl<I, F> VecListConsumer<I, F> {
    /// The items collected so far.
    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Consumes the collector, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<I> {
        self.items
    }
}

impl<I, F> ListConsumer for VecListConsumer<I, F>
where
    F: FnMut(&StartElement) -> Result<I, BoxError>,
{
    fn begin_list(&mut self) {
        self.items.clear();
    }

    fn consume_element_start(&mut self, element: &StartElement) -> Result<(), BoxError> {
        let item = (self.map)(element)?;
        self.items.push(item);
        Ok(())
    }
}

impl<I: fmt::Debug, F> fmt::Debug for VecListConsumer<I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecListConsumer")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

/// Attached to a list element, feeds its `item` children to the run data.
///
/// ```
/// use tagflow_engine::{ListConsumer, ListHandler, ModelBuilder};
/// use tagflow_foundation::{BoxError, StartElement};
///
/// #[derive(Default)]
/// struct Rows(Vec<String>);
///
/// impl ListConsumer for Rows {
///     fn consume_element_start(&mut self, el: &StartElement) -> Result<(), BoxError> {
///         self.0.push(el.name.local_name().to_string());
///         Ok(())
///     }
/// }
///
/// let mut builder = ModelBuilder::<Rows>::new();
/// builder.element("table").attach(ListHandler::new("row"));
/// let model = builder.build().unwrap();
/// assert_eq!(model.state_count(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListHandler {
    item: QName,
}

impl ListHandler {
    /// Creates a handler selecting children named `item`.
    #[must_use]
    pub fn new(item: impl Into<QName>) -> Self {
        Self { item: item.into() }
    }

    /// The item element name.
    #[must_use]
    pub fn item(&self) -> &QName {
        &self.item
    }
}

impl<T: ListConsumer> ElementHandler<T> for ListHandler {
    fn start_element(&self, _element: &StartElement, data: &mut T) -> Result<(), BoxError> {
        data.begin_list();
        Ok(())
    }

    fn end_element(&self, _element: &EndElement, data: &mut T) -> Result<(), BoxError> {
        data.end_list();
        Ok(())
    }

    fn build(&self, builder: &mut ModelBuilder<T>) -> Result<()> {
        builder.element(self.item.clone()).attach(ListItemHandler);
        Ok(())
    }
}

struct ListItemHandler;

impl<T: ListConsumer> ElementHandler<T> for ListItemHandler {
    fn start_element(&self, element: &StartElement, data: &mut T) -> Result<(), BoxError> {
        data.consume_element_start(element)
    }

    fn end_element(&self, element: &EndElement, data: &mut T) -> Result<(), BoxError> {
        data.consume_element_end(element)
    }
}
