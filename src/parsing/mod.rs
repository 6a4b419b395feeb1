//! The SaneQL surface syntax
//!
//! This module turns raw query text into the abstract syntax tree the
//! semantic analyzer consumes. The parser only ensures the syntax is well
//! formed; whether a table exists or a function application makes sense is
//! the job of the analyzer.

pub mod ast;
mod lexer;
mod parser;

pub use lexer::{Keyword, Lexer, Token};
pub use parser::Parser;
