//! The type model and the external schema

pub mod data_type;
pub mod schema;

pub use data_type::{Type, TypeKind};
pub use schema::{Column, Schema, Table};
