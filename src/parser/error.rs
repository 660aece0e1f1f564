use thiserror::Error;

use crate::base::Location;

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub location: Location,
    pub message: String,
    /// The error was caused by braces, brackets or parentheses that do not
    /// pair up inside the parsed range.
    pub unbalanced_delimiters: bool,
}

impl ParseError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            unbalanced_delimiters: false,
        }
    }

    pub fn unbalanced(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            unbalanced_delimiters: true,
        }
    }
}

/// Parse result with optional content and errors.
///
/// Module parsing recovers at item boundaries, so `content` may be present
/// together with errors.
#[derive(Debug, Clone)]
pub struct ParseResult<T> {
    pub content: Option<T>,
    pub errors: Vec<ParseError>,
}

impl<T> ParseResult<T> {
    pub fn ok(content: T) -> Self {
        Self {
            content: Some(content),
            errors: Vec::new(),
        }
    }

    pub fn ok_with_errors(content: T, errors: Vec<ParseError>) -> Self {
        Self {
            content: Some(content),
            errors,
        }
    }

    pub fn err(errors: Vec<ParseError>) -> Self {
        Self {
            content: None,
            errors,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.content.is_some() && self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
