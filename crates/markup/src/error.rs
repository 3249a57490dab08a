//! Parse errors for tokenization and tree building.
//!
//! A `ParseError` is fatal to the current parse call: no recovery or
//! resynchronization is attempted, and events already delivered form a valid
//! prefix of the input.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// An opening tag ran to end of input or hit a stray byte where its `>`
    /// belonged.
    UnterminatedOpeningTag { position: usize },
    /// A closing tag ran to end of input without its `>`.
    UnterminatedClosingTag { position: usize },
    /// A closing tag did not match the element currently open.
    MismatchedClosingTag { expected: String, found: String },
    /// A closing tag arrived with no opening tag in scope.
    UnexpectedClosingTag { tag: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnterminatedOpeningTag { position } => {
                write!(f, "opening tag at byte {position} not terminated by \">\"")
            }
            ParseError::UnterminatedClosingTag { position } => {
                write!(f, "closing tag at byte {position} not terminated by \">\"")
            }
            ParseError::MismatchedClosingTag { expected, found } => {
                write!(
                    f,
                    "got closing tag for \"{found}\"; was expecting \"{expected}\""
                )
            }
            ParseError::UnexpectedClosingTag { tag } => {
                write!(f, "closing tag for \"{tag}\" when no opening tag was in scope")
            }
        }
    }
}

impl std::error::Error for ParseError {}
