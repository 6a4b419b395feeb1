//! The typed relational algebra the analyzer produces
//!
//! Algebra trees are pure data; every node knows how to print itself as a
//! parenthesized SQL fragment, which makes each subtree usable both as a
//! table expression and as an operand.

pub mod expression;
pub mod operator;

pub use expression::{
    Aggregation, AggregateOp, BinaryOp, CallType, Collate, ComparisonMode, DatePart, Expression,
    Iu, IuId, UnaryOp, WindowOp,
};
pub use operator::{JoinType, Operator, SetOperationKind, SortEntry};
