//! Went: lexer, parser and tree walking interpreter for a small dynamically
//! typed scripting language.
//!
//! ```rust
//! let value = went::evaluate("demo", "(1 + 2) * 3").unwrap();
//! assert_eq!(value, went::value::Value::int(9));
//! ```

pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use error::{ErrorKind, ErrorList, Result, WentError};
pub use parser::parse;

use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::token::Token;
use crate::value::Value;

/// Scan all of `src`, returning every token up to and including `EOF` along
/// with the lexical errors, sorted with one error kept per line.
pub fn tokenize<'a>(name: &str, src: &'a str) -> (Vec<Token<'a>>, ErrorList) {
    let mut lexer = Lexer::new(name, src);
    let tokens: Vec<Token<'a>> = lexer.by_ref().collect();

    let mut errors = lexer.take_errors();
    errors.remove_multiples();

    (tokens, errors)
}

/// Parse and evaluate `src` in a fresh global scope.
pub fn evaluate(name: &str, src: &str) -> Result<Value> {
    let ast = parse(name, src)?;

    Interpreter::new().evaluate(&ast)
}
