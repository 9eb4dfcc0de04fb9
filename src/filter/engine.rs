//! Single-pass streaming filter.
//!
//! The reply is tokenized into start-tag, end-tag and text events. Nothing
//! outside the current candidate subtree is buffered:
//!
//! - Outside a candidate, tags and text are copied to the output, and open
//!   tags are tracked on a shadow stack.
//! - A start tag with the target's local name opens a candidate. The whole
//!   subtree is buffered until its end tag, then kept or dropped depending
//!   on the predicate.
//! - At end of input (or at the first malformed token) every tag still on
//!   the shadow stack is closed, so truncated replies keep their wrapper
//!   structure.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::{Error, Result};
use crate::format;

use super::expression::{FilterSpec, Predicate};

// ============================================================================
// Candidate
// ============================================================================

/// Buffered state of the target subtree being read.
#[derive(Debug, Default)]
struct Candidate {
    /// Rendered subtree so far.
    buffer: String,
    /// Nesting depth inside the subtree; 0 when not collecting.
    depth: usize,
    /// Predicate matched somewhere in this subtree.
    keep: bool,
    /// The previous event opened the predicate field.
    awaiting_value: bool,
}

impl Candidate {
    fn is_open(&self) -> bool {
        self.depth > 0
    }

    fn open(&mut self, start: &BytesStart<'_>) {
        self.buffer.clear();
        render_start(&mut self.buffer, start);
        self.depth = 1;
        self.keep = false;
        self.awaiting_value = false;
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Parses `expression` and applies it to `xml`.
///
/// # Errors
///
/// Same as [`FilterSpec::parse`] and [`apply`].
pub fn filter_response(xml: &str, expression: &str) -> Result<String> {
    let spec = FilterSpec::parse(expression)?;
    apply(xml, &spec)
}

/// Keeps only the target subtrees whose predicate holds.
///
/// Everything outside target subtrees passes through. The result is run
/// through [`format::tidy`], the same transform used for unfiltered output.
///
/// Malformed or truncated input never fails: the pass stops at the first
/// bad token and closes whatever wrapper tags are still open.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPredicate`] if the predicate is not
/// `start-with`.
pub fn apply(xml: &str, spec: &FilterSpec) -> Result<String> {
    let Predicate::StartsWith { field, prefix } = spec.predicate() else {
        return Err(Error::unsupported_predicate(spec.predicate().to_string()));
    };
    let target = spec.target().as_bytes();
    let field = field.as_bytes();

    let mut reader = Reader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut output = String::with_capacity(xml.len());
    let mut open_tags: Vec<String> = Vec::new();
    let mut candidate = Candidate::default();
    let mut kept = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(e) => {
                debug!(
                    position = reader.buffer_position(),
                    error = %e,
                    "Malformed input, closing open tags"
                );
                break;
            }
        };

        match event {
            Event::Start(start) => {
                let name = start.local_name();
                if candidate.is_open() {
                    candidate.depth += 1;
                    render_start(&mut candidate.buffer, &start);
                    candidate.awaiting_value = name.as_ref() == field;
                } else if name.as_ref() == target {
                    candidate.open(&start);
                } else {
                    render_start(&mut output, &start);
                    open_tags.push(lossy(name.as_ref()).into_owned());
                }
            }

            Event::End(end) => {
                let name = lossy(end.local_name().as_ref()).into_owned();
                if candidate.is_open() {
                    candidate.awaiting_value = false;
                    candidate.depth -= 1;
                    render_end(&mut candidate.buffer, &name);

                    if !candidate.is_open() {
                        if candidate.keep {
                            output.push_str(&candidate.buffer);
                            output.push('\n');
                            kept += 1;
                        }
                        candidate.keep = false;
                    }
                } else if open_tags.pop().is_some() {
                    render_end(&mut output, &name);
                    output.push('\n');
                }
            }

            Event::Text(text) => {
                let raw = lossy(&text);
                if candidate.is_open() {
                    if candidate.awaiting_value {
                        let value = text.unescape().unwrap_or(Cow::Borrowed(&*raw));
                        candidate.keep |= value.starts_with(prefix.as_str());
                        candidate.awaiting_value = false;
                    }
                    candidate.buffer.push_str(&raw);
                } else {
                    output.push_str(&raw);
                }
            }

            Event::CData(cdata) => {
                let value = lossy(&cdata);
                let rendered = format!("<![CDATA[{value}]]>");
                if candidate.is_open() {
                    if candidate.awaiting_value {
                        candidate.keep |= value.starts_with(prefix.as_str());
                        candidate.awaiting_value = false;
                    }
                    candidate.buffer.push_str(&rendered);
                } else {
                    output.push_str(&rendered);
                }
            }

            // Declarations, comments and processing instructions are dropped.
            _ => {}
        }
    }

    for name in open_tags.iter().rev() {
        render_end(&mut output, name);
        output.push('\n');
    }

    debug!(
        element = spec.target(),
        kept,
        unclosed = open_tags.len(),
        "Filter applied"
    );

    Ok(format::tidy(&output))
}

// ============================================================================
// Rendering
// ============================================================================

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Writes `<local-name attr="value" ...>`.
fn render_start(out: &mut String, start: &BytesStart<'_>) {
    out.push('<');
    out.push_str(&lossy(start.local_name().as_ref()));

    for attr in start.attributes().flatten() {
        let value = match attr.unescape_value() {
            Ok(value) => escape(&*value).into_owned(),
            Err(_) => lossy(&attr.value).into_owned(),
        };
        out.push(' ');
        out.push_str(&lossy(attr.key.as_ref()));
        out.push_str("=\"");
        out.push_str(&value);
        out.push('"');
    }

    out.push('>');
}

fn render_end(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

// ============================================================================
// Tests
// ============================================================================
