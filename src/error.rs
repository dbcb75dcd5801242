//! Centralised error hierarchy for the **Went interpreter**.
//!
//! Every stage (lexer, parser, interpreter) reports failures as a [`WentError`]
//! carrying the input name, the source position and a message, so callers can
//! tell lexical, syntax, type, zero-division and other runtime failures apart
//! programmatically while still printing one uniform line per error.
//!
//! The module **does not** print diagnostics itself.

use std::fmt;

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::token::Pos;

/// The category of a [`WentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Lex,
    Syntax,
    Type,
    ZeroDivision,
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lex => "LexError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Runtime => "RuntimeError",
        };
        f.write_str(name)
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WentError {
    /// Lexical error, reported by the lexer's error handler.
    #[error("{}", render(.input, .pos, .message))]
    Lex {
        /// Name of the input (usually a file name); may be empty.
        input: String,

        /// Where the offending character was read.
        pos: Pos,

        /// Human‑readable description.
        message: String,
    },

    /// Syntactic (parser) error.
    #[error("{}", render(.input, .pos, .message))]
    Syntax {
        input: String,
        pos: Pos,
        message: String,
    },

    /// Operand types not supported by an operator.
    #[error("{}", render(.input, .pos, .message))]
    Type {
        input: String,
        pos: Pos,
        message: String,
    },

    /// Division or modulo by zero.
    #[error("{}", render(.input, .pos, .message))]
    ZeroDivision {
        input: String,
        pos: Pos,
        message: String,
    },

    /// Any other evaluation failure (e.g. an undefined name).
    #[error("{}", render(.input, .pos, .message))]
    Runtime {
        input: String,
        pos: Pos,
        message: String,
    },
}

/// `<name>:<line>:<col>: <message>`, dropping whichever prefix is unknown.
fn render(input: &str, pos: &Pos, message: &str) -> String {
    match (input.is_empty(), pos.is_valid()) {
        (false, true) => format!("{}:{}: {}", input, pos, message),
        (true, true) => format!("{}: {}", pos, message),
        (false, false) => format!("{}: {}", input, message),
        (true, false) => message.to_owned(),
    }
}

impl WentError {
    /// Helper constructor for the **lexer**.
    pub fn lex<I: Into<String>, S: Into<String>>(input: I, pos: Pos, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: pos={}, msg={}", pos, message);

        WentError::Lex {
            input: input.into(),
            pos,
            message,
        }
    }

    /// Helper constructor for the **parser**.
    pub fn syntax<I: Into<String>, S: Into<String>>(input: I, pos: Pos, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Syntax error: pos={}, msg={}", pos, message);

        WentError::Syntax {
            input: input.into(),
            pos,
            message,
        }
    }

    /// Helper constructor for operand type mismatches.
    pub fn type_error<I: Into<String>, S: Into<String>>(input: I, pos: Pos, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Type error: pos={}, msg={}", pos, message);

        WentError::Type {
            input: input.into(),
            pos,
            message,
        }
    }

    /// Helper constructor for division/modulo by zero.
    pub fn zero_division<I: Into<String>, S: Into<String>>(input: I, pos: Pos, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating ZeroDivision error: pos={}, msg={}", pos, message);

        WentError::ZeroDivision {
            input: input.into(),
            pos,
            message,
        }
    }

    /// Helper constructor for other runtime failures.
    pub fn runtime<I: Into<String>, S: Into<String>>(input: I, pos: Pos, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: pos={}, msg={}", pos, message);

        WentError::Runtime {
            input: input.into(),
            pos,
            message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WentError::Lex { .. } => ErrorKind::Lex,
            WentError::Syntax { .. } => ErrorKind::Syntax,
            WentError::Type { .. } => ErrorKind::Type,
            WentError::ZeroDivision { .. } => ErrorKind::ZeroDivision,
            WentError::Runtime { .. } => ErrorKind::Runtime,
        }
    }

    pub fn input_name(&self) -> &str {
        match self {
            WentError::Lex { input, .. }
            | WentError::Syntax { input, .. }
            | WentError::Type { input, .. }
            | WentError::ZeroDivision { input, .. }
            | WentError::Runtime { input, .. } => input,
        }
    }

    pub fn position(&self) -> Pos {
        match self {
            WentError::Lex { pos, .. }
            | WentError::Syntax { pos, .. }
            | WentError::Type { pos, .. }
            | WentError::ZeroDivision { pos, .. }
            | WentError::Runtime { pos, .. } => *pos,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            WentError::Lex { message, .. }
            | WentError::Syntax { message, .. }
            | WentError::Type { message, .. }
            | WentError::ZeroDivision { message, .. }
            | WentError::Runtime { message, .. } => message,
        }
    }

    /// Did this error come from the front end (lexer or parser)?
    pub fn is_syntactic(&self) -> bool {
        matches!(self.kind(), ErrorKind::Lex | ErrorKind::Syntax)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, WentError>;

/// An accumulating list of errors, e.g. every lexical error of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    errors: Vec<WentError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, err: WentError) {
        self.errors.push(err);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first(&self) -> Option<&WentError> {
        self.errors.first()
    }

    pub fn get(&self, index: usize) -> Option<&WentError> {
        self.errors.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WentError> {
        self.errors.iter()
    }

    /// Order by input name, then line, column and message.
    pub fn sort(&mut self) {
        self.errors.sort_by(|a, b| {
            a.input_name()
                .cmp(b.input_name())
                .then_with(|| a.position().cmp(&b.position()))
                .then_with(|| a.message().cmp(b.message()))
        });
    }

    /// Sort, then keep only the first error reported on each line.
    pub fn remove_multiples(&mut self) {
        self.sort();
        self.errors.dedup_by(|b, a| {
            a.input_name() == b.input_name() && a.position().line == b.position().line
        });
    }

    /// `None` when nothing was reported.
    pub fn err(self) -> Option<ErrorList> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("no errors"),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more errors)", first, rest.len()),
        }
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = WentError;
    type IntoIter = std::vec::IntoIter<WentError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'l> IntoIterator for &'l ErrorList {
    type Item = &'l WentError;
    type IntoIter = std::slice::Iter<'l, WentError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
