//! Semantic analysis
//!
//! Walks the AST, resolves names and functions, checks types, expands lets,
//! and builds the typed algebra tree.

pub mod analyzer;
pub mod binding;
pub mod functions;

pub use analyzer::{ExpressionResult, SemanticAnalysis};
pub use binding::{BindingInfo, OrderingInfo};
