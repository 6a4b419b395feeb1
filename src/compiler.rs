//! The compilation pipeline
//!
//! Parse, analyze, emit. A scalar result compiles to `select <expr>`; a
//! table result compiles to a select that names the output columns, with a
//! top level sort hoisted around it so the query's order survives the
//! outermost projection.

use crate::algebra::Operator;
use crate::error::Result;
use crate::parsing::Parser;
use crate::semantic::{ExpressionResult, SemanticAnalysis};
use crate::sql::SqlWriter;
use crate::types::Schema;
use lru::LruCache;
use std::num::NonZeroUsize;

/// A compiler for one schema
pub struct Compiler<'a> {
    schema: &'a Schema,
}

impl<'a> Compiler<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Compiler { schema }
    }

    /// Compile one query into a single SQL select statement
    pub fn compile(&self, query: &str) -> Result<String> {
        let tree = Parser::parse(query)?;
        let mut analysis = SemanticAnalysis::new(self.schema);
        let result = analysis.analyze_query(&tree)?;

        let mut out = SqlWriter::new();
        match result {
            ExpressionResult::Scalar { expression, .. } => {
                out.write("select ");
                expression.generate(&mut out);
            }
            ExpressionResult::Table { op, binding } => {
                // Hoist a top level sort around the column naming select
                let (tree, sort) = match op {
                    Operator::Sort { input, order, limit, offset } => {
                        (*input, Some((order, limit, offset)))
                    }
                    other => (other, None),
                };
                out.write("select ");
                for (index, column) in binding.columns().iter().enumerate() {
                    if index != 0 {
                        out.write(", ");
                    }
                    out.write_iu(column.iu.id);
                    out.write(" as ");
                    out.write_name(&column.name);
                }
                out.write(" from ");
                tree.generate(&mut out);
                out.write(" s");
                if let Some((order, limit, offset)) = sort {
                    if !order.is_empty() {
                        out.write(" order by ");
                        for (index, entry) in order.iter().enumerate() {
                            if index != 0 {
                                out.write(", ");
                            }
                            entry.generate(&mut out);
                        }
                    }
                    if let Some(limit) = limit {
                        out.write(" limit ");
                        out.write(&limit.to_string());
                    }
                    if let Some(offset) = offset {
                        out.write(" offset ");
                        out.write(&offset.to_string());
                    }
                }
            }
        }
        Ok(out.into_result())
    }
}

/// Default capacity for the compile cache
const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// A caching wrapper around the compiler. Compiled SQL is cached by the
/// normalized query text.
pub struct CachingCompiler<'a> {
    compiler: Compiler<'a>,
    cache: LruCache<String, String>,
}

impl<'a> CachingCompiler<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_capacity(schema, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(schema: &'a Schema, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap());
        CachingCompiler {
            compiler: Compiler::new(schema),
            cache: LruCache::new(capacity),
        }
    }

    /// Compile with caching
    pub fn compile(&mut self, query: &str) -> Result<String> {
        let normalized = query.trim().to_string();
        if let Some(sql) = self.cache.get(&normalized) {
            return Ok(sql.clone());
        }
        let sql = self.compiler.compile(query)?;
        self.cache.put(normalized, sql.clone());
        Ok(sql)
    }

    /// Drop all cached results
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caching_returns_identical_sql() {
        let schema = Schema::tpch();
        let mut compiler = CachingCompiler::with_capacity(&schema, 4);
        let first = compiler.compile("nation").unwrap();
        let second = compiler.compile("  nation  ").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn errors_are_not_cached() {
        let schema = Schema::tpch();
        let mut compiler = CachingCompiler::new(&schema);
        assert!(compiler.compile("missing_table").is_err());
        assert!(compiler.compile("missing_table").is_err());
    }
}
