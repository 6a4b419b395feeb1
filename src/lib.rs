//! A sane query language that compiles to SQL
//!
//! SaneQL composes queries through left to right method chaining over
//! tables and scalars instead of SQL's clause order. This crate contains
//! the whole compilation pipeline: lexer and parser, semantic analysis
//! with a small type system and user defined lets, the typed relational
//! algebra, and the SQL emitter. Compilation is a pure translation against
//! a caller supplied schema; the result is a single SQL select statement.

pub mod algebra;
mod compiler;
mod error;
pub mod parsing;
pub mod semantic;
pub mod sql;
pub mod types;

pub use compiler::{CachingCompiler, Compiler};
pub use error::{Error, Result};
pub use types::{Schema, Type};

/// Compile one query against a schema into a SQL select statement
pub fn compile(schema: &Schema, query: &str) -> Result<String> {
    Compiler::new(schema).compile(query)
}
