//! Shared helpers for the compiler tests

#![allow(dead_code)]

use saneql::{Error, Result, Schema};

/// Compile a query against the TPC-H schema, panicking on failure
pub fn compile(query: &str) -> String {
    try_compile(query).expect("query should compile")
}

/// Compile a query against the TPC-H schema
pub fn try_compile(query: &str) -> Result<String> {
    saneql::compile(&Schema::tpch(), query)
}

/// Compile a query that is expected to fail and return the error
pub fn compile_err(query: &str) -> Error {
    match try_compile(query) {
        Ok(sql) => panic!("query unexpectedly compiled to: {}", sql),
        Err(err) => err,
    }
}
