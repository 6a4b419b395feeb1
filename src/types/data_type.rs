//! SQL value types with nullability
//!
//! A `Type` is the identity of a column or scalar expression: a tag with
//! optional parameters (decimal precision/scale, char/varchar length) plus
//! a nullable flag. Nullability may change freely without changing the
//! identity class; every other change requires an explicit cast.

use serde::{Deserialize, Serialize};

/// The type tag, carrying type parameters where the type has them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Only produced by untyped NULL literals
    Unknown,
    Bool,
    Integer,
    Decimal { precision: u8, scale: u8 },
    Char { length: u32 },
    Varchar { length: u32 },
    Text,
    Date,
    Interval,
}

/// A SQL type: tag plus nullability. Compares by full identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    kind: TypeKind,
    nullable: bool,
}

impl Type {
    /// The unknown type, used for bare NULL literals
    pub const fn unknown() -> Self {
        Type { kind: TypeKind::Unknown, nullable: false }
    }

    pub const fn bool() -> Self {
        Type { kind: TypeKind::Bool, nullable: false }
    }

    pub const fn integer() -> Self {
        Type { kind: TypeKind::Integer, nullable: false }
    }

    pub const fn decimal(precision: u8, scale: u8) -> Self {
        Type { kind: TypeKind::Decimal { precision, scale }, nullable: false }
    }

    pub const fn char(length: u32) -> Self {
        Type { kind: TypeKind::Char { length }, nullable: false }
    }

    pub const fn varchar(length: u32) -> Self {
        Type { kind: TypeKind::Varchar { length }, nullable: false }
    }

    pub const fn text() -> Self {
        Type { kind: TypeKind::Text, nullable: false }
    }

    pub const fn date() -> Self {
        Type { kind: TypeKind::Date, nullable: false }
    }

    pub const fn interval() -> Self {
        Type { kind: TypeKind::Interval, nullable: false }
    }

    /// Get the type tag
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Is the type nullable?
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The same type, made nullable
    pub const fn as_nullable(&self) -> Self {
        Type { kind: self.kind, nullable: true }
    }

    /// The same type with explicit nullability
    pub const fn with_nullable(&self, nullable: bool) -> Self {
        Type { kind: self.kind, nullable }
    }

    /// Is this a numeric type (integer or decimal)?
    pub const fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Integer | TypeKind::Decimal { .. })
    }

    /// Is this a string type (char, varchar, or text)?
    pub const fn is_string(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Char { .. } | TypeKind::Varchar { .. } | TypeKind::Text
        )
    }

    /// The name used in diagnostics
    pub const fn name(&self) -> &'static str {
        match self.kind {
            TypeKind::Unknown => "unknown",
            TypeKind::Bool => "boolean",
            TypeKind::Integer => "integer",
            TypeKind::Decimal { .. } => "decimal",
            TypeKind::Char { .. } => "char",
            TypeKind::Varchar { .. } => "varchar",
            TypeKind::Text => "text",
            TypeKind::Date => "date",
            TypeKind::Interval => "interval",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullability_is_not_identity() {
        let t = Type::decimal(12, 2);
        assert_ne!(t, t.as_nullable());
        assert_eq!(t, t.as_nullable().with_nullable(false));
        assert_eq!(t.kind(), t.as_nullable().kind());
    }

    #[test]
    fn parameters_are_identity() {
        assert_ne!(Type::decimal(12, 2), Type::decimal(12, 3));
        assert_ne!(Type::char(10), Type::char(11));
        assert_eq!(Type::varchar(25), Type::varchar(25));
    }

    #[test]
    fn categories() {
        assert!(Type::integer().is_numeric());
        assert!(Type::decimal(10, 0).is_numeric());
        assert!(!Type::text().is_numeric());
        assert!(Type::char(1).is_string());
        assert!(Type::varchar(1).is_string());
        assert!(Type::text().is_string());
        assert!(!Type::date().is_string());
    }
}
