//! sexpread - reader, printer and variable environment for a small S-expression language
//!
//! This crate turns text into symbolic data, prints that data back in canonical form,
//! and resolves names against a chained, persistent environment. It does not evaluate
//! anything: there is no `quote` special form, no function application and no arithmetic.
//!
//! ## Grammar
//!
//! ```text
//! 42  -7              ; integers, optionally `-`-prefixed runs of decimal digits
//! 'foo                ; quoted symbol, reads as the symbol `foo`
//! (1 2 (3 4))         ; proper lists
//! (1 . 2)             ; dotted pairs / improper lists
//! '(1 2)              ; quoted list, reads as the list itself
//! ```
//!
//! Every read consumes exactly one expression. Errors are returned as values, the
//! library itself never writes to stdout or stderr.
//!
//! ```
//! use sexpread::{read, print, empty_environment, extend, lookup};
//!
//! let value = read("(1 (2 3) . 4)").unwrap();
//! assert_eq!(print(&value), "(1 (2 3) . 4)");
//!
//! let env = extend(&empty_environment(), "x", value.clone());
//! assert_eq!(lookup(&env, "x").unwrap(), value);
//! assert!(lookup(&env, "y").is_err());
//! ```
//!
//! ## Modules
//!
//! - `ast`: the symbolic object model ([`ast::Value`])
//! - `lexer`: splits text into parenthesis and atom tokens
//! - `reader`: recursive-descent construction of values from tokens
//! - `printer`: canonical textual rendering
//! - `environment`: persistent name to value bindings

use std::fmt;

/// Default maximum nesting of lists and quotes accepted by the reader.
/// Deeper input is rejected instead of exhausting the native stack.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Empty input, or a token that starts no valid expression
    InvalidSyntax,
    /// Parentheses do not balance (unclosed list, stray `)`)
    MismatchedParen,
    /// Numeric literal with a non-digit character, or outside the `i64` range
    InvalidInteger,
    /// Nesting exceeded the configured maximum depth
    TooDeeplyNested,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ParseErrorKind::InvalidSyntax => "invalid syntax",
            ParseErrorKind::MismatchedParen => "mismatched parenthesis",
            ParseErrorKind::InvalidInteger => "invalid integer",
            ParseErrorKind::TooDeeplyNested => "too deeply nested",
        };
        f.write_str(name)
    }
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Byte offset into the input where the problem was detected
    pub offset: usize,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with all fields
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        offset: usize,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            offset,
            context,
            found,
        }
    }

    /// Create a ParseError with context extracted from input at a given offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        // Show up to 20 characters before the error
        let error_char = input
            .char_indices()
            .take_while(|(i, _)| *i < error_offset)
            .count();
        let context_start = error_char.saturating_sub(20);

        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < input.chars().count() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, error_offset, Some(display_context), found)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParseError: {}", self.message)?;
        if let Some(found) = &self.found {
            write!(f, "\nFound: {found}")?;
        }
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Error types for the reader, accessors and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ParseError(ParseError),
    /// An accessor was applied to the wrong kind of object
    TypeMismatch(String),
    UnboundVariable(String),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::ParseError(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => write!(f, "{e}"),
            Error::TypeMismatch(msg) => write!(f, "Type error: {msg}"),
            Error::UnboundVariable(var) => write!(f, "Unbound variable: {var}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

pub mod ast;
pub mod environment;
pub mod lexer;
pub mod printer;
pub mod reader;

pub use ast::Value;
pub use environment::{Environment, empty_environment, extend, lookup};
pub use printer::print;
pub use reader::{ReadConfig, read, read_with_config};
