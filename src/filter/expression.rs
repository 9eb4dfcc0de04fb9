//! Filter expression parsing.
//!
//! Accepts a path with one bracketed predicate on its last segment:
//!
//! ```text
//! /rpc-reply/data/terminal-device/logical-channels/channel[start-with(index,'10115')]
//! ```
//!
//! Only the last path segment and the predicate mean anything. Earlier
//! segments are kept for display but never matched against the document.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Predicate
// ============================================================================

/// Selection condition applied to each candidate subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `start-with(field,'prefix')`: the text of child `field` begins with
    /// `prefix` (case-sensitive).
    StartsWith {
        /// Child element whose text is tested.
        field: String,
        /// Required prefix.
        prefix: String,
    },

    /// Any other predicate. Parses, but cannot be evaluated.
    Unsupported(String),
}

impl Predicate {
    /// Parses the text between the brackets.
    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        let Some(args) = text.strip_prefix("start-with(") else {
            return Ok(Self::Unsupported(text.to_string()));
        };
        let args = args.strip_suffix(')').unwrap_or(args);

        let Some((field, prefix)) = args.split_once(',') else {
            return Err(Error::parse(format!("invalid start-with predicate: {text}")));
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(Error::parse(format!("invalid start-with predicate: {text}")));
        }

        Ok(Self::StartsWith {
            field: field.to_string(),
            prefix: prefix.trim().trim_matches(['\'', '"']).to_string(),
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartsWith { field, prefix } => write!(f, "start-with({field},'{prefix}')"),
            Self::Unsupported(text) => f.write_str(text),
        }
    }
}

// ============================================================================
// FilterSpec
// ============================================================================

/// Parsed filter expression. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Path segments, target last.
    path: Vec<String>,
    /// Selection condition for the target element.
    predicate: Predicate,
}

impl FilterSpec {
    /// Parses a filter expression.
    ///
    /// Surrounding whitespace and leading/trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] `"no predicate found"` if there is no `[`
    /// - [`Error::Parse`] `"empty path"` if the target segment is empty
    /// - [`Error::Parse`] if a `start-with` predicate lacks two arguments
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim_matches(|c: char| c == '/' || c == ' ');

        let Some(open) = expression.find('[') else {
            return Err(Error::parse("no predicate found"));
        };

        let path: Vec<String> = expression[..open]
            .split('/')
            .map(|segment| segment.trim().to_string())
            .collect();

        if path.last().is_none_or(String::is_empty) {
            return Err(Error::parse("empty path"));
        }

        let predicate_text = expression[open..].trim_matches(['[', ']']);
        let predicate = Predicate::parse(predicate_text)?;

        Ok(Self { path, predicate })
    }

    /// Returns the local name of the element the predicate selects.
    #[must_use]
    pub fn target(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    /// Returns all path segments, target last.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Returns the predicate.
    #[inline]
    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl FromStr for FilterSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}[{}]", self.path.join("/"), self.predicate)
    }
}

// ============================================================================
// Tests
// ============================================================================
