//! Callback interfaces invoked by the executor.
//!
//! Handlers are shared by the compiled model and must not hold per-run state;
//! everything a run produces goes into the caller's `&mut T`.

use std::fmt;

use tagflow_foundation::{
    BoxError, Characters, Dtd, EndElement, EntityDeclaration, EntityReference,
    NotationDeclaration, Result, StartElement,
};

use crate::builder::ModelBuilder;

// =============================================================================
// Element Handler
// =============================================================================

/// Callbacks for the elements matched by one selector.
///
/// Every method has a no-op default.
pub trait ElementHandler<T>: Send + Sync {
    /// Called when a matched element opens.
    ///
    /// # Errors
    /// Any error aborts the run; the executor wraps it with the event location.
    fn start_element(&self, element: &StartElement, data: &mut T) -> Result<(), BoxError> {
        let _ = (element, data);
        Ok(())
    }

    /// Called when a matched element closes.
    ///
    /// # Errors
    /// Any error aborts the run; the executor wraps it with the event location.
    fn end_element(&self, element: &EndElement, data: &mut T) -> Result<(), BoxError> {
        let _ = (element, data);
        Ok(())
    }

    /// Called for text directly inside a matched element.
    ///
    /// # Errors
    /// Any error aborts the run; the executor wraps it with the event location.
    fn characters(
        &self,
        parent: &StartElement,
        text: &Characters,
        data: &mut T,
    ) -> Result<(), BoxError> {
        let _ = (parent, text, data);
        Ok(())
    }

    /// Declares further selectors relative to the state this handler is
    /// attached to. Runs once per attachment while the model is built.
    ///
    /// # Errors
    /// Configuration errors from the declarations abort [`ModelBuilder::build`].
    fn build(&self, builder: &mut ModelBuilder<T>) -> Result<()> {
        let _ = builder;
        Ok(())
    }
}

// =============================================================================
// Declaration Handler
// =============================================================================

/// Callbacks for document-level declarations. Payloads are forwarded as-is.
pub trait DeclarationHandler<T>: Send + Sync {
    /// A document type declaration.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn dtd(&self, dtd: &Dtd, data: &mut T) -> Result<(), BoxError> {
        let _ = (dtd, data);
        Ok(())
    }

    /// An entity declaration.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn entity_declaration(
        &self,
        declaration: &EntityDeclaration,
        data: &mut T,
    ) -> Result<(), BoxError> {
        let _ = (declaration, data);
        Ok(())
    }

    /// An unresolved entity reference.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn entity_reference(&self, reference: &EntityReference, data: &mut T) -> Result<(), BoxError> {
        let _ = (reference, data);
        Ok(())
    }

    /// A notation declaration.
    ///
    /// # Errors
    /// Any error aborts the run.
    fn notation_declaration(
        &self,
        declaration: &NotationDeclaration,
        data: &mut T,
    ) -> Result<(), BoxError> {
        let _ = (declaration, data);
        Ok(())
    }
}

// =============================================================================
// Closure Handler
// =============================================================================

type StartFn<T> = Box<dyn Fn(&StartElement, &mut T) + Send + Sync>;
type EndFn<T> = Box<dyn Fn(&EndElement, &mut T) + Send + Sync>;
type TextFn<T> = Box<dyn Fn(&StartElement, &Characters, &mut T) + Send + Sync>;

/// An [`ElementHandler`] assembled from closures.
///
/// ```
/// use tagflow_engine::FnHandler;
///
/// let handler = FnHandler::<Vec<String>>::new()
///     .on_start(|el, out| out.push(el.name.local_name().to_string()))
///     .on_characters(|_, text, out| out.push(text.text.clone()));
/// # let _ = handler;
/// ```
pub struct FnHandler<T> {
    start: Option<StartFn<T>>,
    end: Option<EndFn<T>>,
    characters: Option<TextFn<T>>,
}

impl<T> FnHandler<T> {
    /// Creates a handler that does nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: None,
            end: None,
            characters: None,
        }
    }

    /// Sets the element start callback.
    #[must_use]
    pub fn on_start(mut self, f: impl Fn(&StartElement, &mut T) + Send + Sync + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    /// Sets the element end callback.
    #[must_use]
    pub fn on_end(mut self, f: impl Fn(&EndElement, &mut T) + Send + Sync + 'static) -> Self {
        self.end = Some(Box::new(f));
        self
    }

    /// Sets the text callback.
    #[must_use]
    pub fn on_characters(
        mut self,
        f: impl Fn(&StartElement, &Characters, &mut T) + Send + Sync + 'static,
    ) -> Self {
        self.characters = Some(Box::new(f));
        self
    }
}

impl<T> Default for FnHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FnHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("start", &self.start.is_some())
            .field("end", &self.end.is_some())
            .field("characters", &self.characters.is_some())
            .finish()
    }
}

impl<T> ElementHandler<T> for FnHandler<T> {
    fn start_element(&self, element: &StartElement, data: &mut T) -> Result<(), BoxError> {
        if let Some(f) = &self.start {
            f(element, data);
        }
        Ok(())
    }

    fn end_element(&self, element: &EndElement, data: &mut T) -> Result<(), BoxError> {
        if let Some(f) = &self.end {
            f(element, data);
        }
        Ok(())
    }

    fn characters(
        &self,
        parent: &StartElement,
        text: &Characters,
        data: &mut T,
    ) -> Result<(), BoxError> {
        if let Some(f) = &self.characters {
            f(parent, text, data);
        }
        Ok(())
    }
}
