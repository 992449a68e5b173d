//! An [`EventSource`] over markup text, backed by `quick-xml`.
//!
//! Namespaces are resolved by the tokenizer; `xmlns` declarations are not
//! reported as attributes. Self-closing tags produce a start and an end
//! event. Comments, processing instructions and the XML declaration are
//! skipped. Every event carries the line and column where it begins.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName as RawName, ResolveResult};
use tagflow_foundation::{
    Attributes, Characters, Dtd, EndElement, EventSource, Location, QName, StartElement, XmlEvent,
};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Failure reported by [`XmlReaderSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input is not well-formed.
    #[error("malformed markup at {location}: {source}")]
    Syntax {
        /// The tokenizer error.
        #[source]
        source: quick_xml::Error,
        /// Where reading started.
        location: Location,
    },

    /// A name uses a prefix with no namespace declaration in scope.
    #[error("undeclared namespace prefix {prefix:?} at {location}")]
    UnknownPrefix {
        /// The prefix as written.
        prefix: String,
        /// Where the name occurs.
        location: Location,
    },
}

impl SourceError {
    fn syntax(source: impl Into<quick_xml::Error>, location: Location) -> Self {
        Self::Syntax {
            source: source.into(),
            location,
        }
    }

    /// Where the failure occurred.
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Self::Syntax { location, .. } | Self::UnknownPrefix { location, .. } => *location,
        }
    }
}

// =============================================================================
// Line Tracking
// =============================================================================

/// Converts monotonically increasing byte offsets to line and column.
#[derive(Debug)]
struct LineTracker<'i> {
    input: &'i [u8],
    offset: usize,
    line: u32,
    column: u32,
}

impl<'i> LineTracker<'i> {
    fn new(input: &'i [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self, to: usize) -> Location {
        let to = to.min(self.input.len());
        if to > self.offset {
            for &byte in &self.input[self.offset..to] {
                if byte == b'\n' {
                    self.line = self.line.saturating_add(1);
                    self.column = 1;
                } else if byte & 0xC0 != 0x80 {
                    // count characters, not UTF-8 continuation bytes
                    self.column = self.column.saturating_add(1);
                }
            }
            self.offset = to;
        }
        Location::new(self.line, self.column).with_offset(self.offset as u64)
    }
}

// =============================================================================
// Source
// =============================================================================

/// Tokenizes borrowed markup text into [`XmlEvent`]s.
pub struct XmlReaderSource<'i> {
    reader: NsReader<&'i [u8]>,
    lines: LineTracker<'i>,
    trim_text: bool,
    pending_end: Option<EndElement>,
    finished: bool,
}

impl<'i> XmlReaderSource<'i> {
    /// Creates a source reporting text exactly as written.
    #[must_use]
    pub fn new(xml: &'i str) -> Self {
        Self {
            reader: NsReader::from_str(xml),
            lines: LineTracker::new(xml.as_bytes()),
            trim_text: false,
            pending_end: None,
            finished: false,
        }
    }

    /// Trims whitespace around text and drops whitespace-only text.
    #[must_use]
    pub fn with_trim_text(mut self, trim: bool) -> Self {
        self.reader.config_mut().trim_text(trim);
        self.trim_text = trim;
        self
    }

    fn location_before_read(&mut self) -> Location {
        let raw = self.reader.buffer_position();
        let mut offset = usize::try_from(raw).unwrap_or(usize::MAX);
        // the tokenizer may already have consumed the `<` that ended a text run
        if offset > 0 && self.lines.input.get(offset - 1) == Some(&b'<') {
            offset -= 1;
        }
        if self.trim_text {
            while self
                .lines
                .input
                .get(offset)
                .is_some_and(u8::is_ascii_whitespace)
            {
                offset += 1;
            }
        }
        self.lines.advance(offset)
    }

    fn read(&mut self) -> Result<Option<XmlEvent>, SourceError> {
        if let Some(end) = self.pending_end.take() {
            return Ok(Some(end.into()));
        }
        loop {
            let location = self.location_before_read();
            let (resolved, event) = self
                .reader
                .read_resolved_event()
                .map_err(|e| SourceError::syntax(e, location))?;
            let namespace = namespace_of(resolved, location)?;

            match event {
                Event::Start(start) => {
                    return self.start(&start, namespace, location).map(|s| Some(s.into()));
                }
                Event::Empty(start) => {
                    let element = self.start(&start, namespace, location)?;
                    self.pending_end = Some(EndElement {
                        name: element.name.clone(),
                        location: Some(location),
                    });
                    return Ok(Some(element.into()));
                }
                Event::End(end) => {
                    let name = qualify(namespace, end.name());
                    return Ok(Some(EndElement::new(name).at(location).into()));
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| SourceError::syntax(e, location))?;
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(Characters::new(text).at(location).into()));
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    return Ok(Some(Characters::new(text).at(location).into()));
                }
                Event::DocType(doctype) => {
                    return Ok(Some(XmlEvent::Dtd(Dtd {
                        text: String::from_utf8_lossy(&doctype).into_owned(),
                        location: Some(location),
                    })));
                }
                Event::Eof => return Ok(None),
                // comments, processing instructions, the XML declaration
                _ => {}
            }
        }
    }

    fn start(
        &self,
        start: &BytesStart<'_>,
        namespace: Option<String>,
        location: Location,
    ) -> Result<StartElement, SourceError> {
        let mut attributes = Attributes::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| SourceError::syntax(e, location))?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }
            let (resolved, _) = self.reader.resolve_attribute(attribute.key);
            let attribute_namespace = namespace_of(resolved, location)?;
            let value = attribute
                .unescape_value()
                .map_err(|e| SourceError::syntax(e, location))?;
            attributes.insert(
                qualify(attribute_namespace, attribute.key),
                value.into_owned(),
            );
        }
        Ok(StartElement {
            name: qualify(namespace, start.name()),
            attributes,
            location: Some(location),
        })
    }
}

impl EventSource for XmlReaderSource<'_> {
    type Error = SourceError;

    fn next_event(&mut self) -> Option<Result<XmlEvent, SourceError>> {
        if self.finished {
            return None;
        }
        match self.read() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl std::fmt::Debug for XmlReaderSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlReaderSource")
            .field("offset", &self.lines.offset)
            .field("trim_text", &self.trim_text)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

fn namespace_of(resolved: ResolveResult<'_>, location: Location) -> Result<Option<String>, SourceError> {
    match resolved {
        ResolveResult::Bound(namespace) => {
            Ok(Some(String::from_utf8_lossy(namespace.as_ref()).into_owned()))
        }
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(SourceError::UnknownPrefix {
            prefix: String::from_utf8_lossy(&prefix).into_owned(),
            location,
        }),
    }
}

fn qualify(namespace: Option<String>, raw: RawName<'_>) -> QName {
    let local = String::from_utf8_lossy(raw.local_name().as_ref()).into_owned();
    let name = match namespace {
        Some(uri) => QName::namespaced(uri, local),
        None => QName::local(local),
    };
    match raw.prefix() {
        Some(prefix) => name.with_prefix(String::from_utf8_lossy(prefix.as_ref()).into_owned()),
        None => name,
    }
}
