//! SQL generation

pub mod writer;

pub use writer::SqlWriter;
