//! The builtin function tables
//!
//! A two level, statically constructed dictionary: method functions keyed
//! by the receiver's type category (scalar, text, date, table) and free
//! functions. The text and date tables inherit the scalar table through a
//! parent link. The tables are built once and shared across compilations.

use crate::types::{Type, TypeKind};
use std::collections::HashMap;
use std::sync::LazyLock;

/// The builtin functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Asc,
    Desc,
    Collate,
    Is,
    Like,
    Substr,
    Between,
    In,
    Extract,
    Case,
    Filter,
    Join,
    Gensym,
    GroupBy,
    Aggregate,
    Distinct,
    OrderBy,
    Map,
    Project,
    ProjectOut,
    Union,
    Except,
    Intersect,
    Window,
    As,
    Alias,
    AggCount,
    AggSum,
    AggAvg,
    AggMin,
    AggMax,
    WindowRowNumber,
    WindowRank,
    WindowDenseRank,
    WindowNTile,
    WindowLead,
    WindowLag,
    WindowFirstValue,
    WindowLastValue,
    Table,
    ForeignCall,
    Defun,
}

/// Argument categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Scalar,
    Table,
    Expression,
    ExpressionList,
    Symbol,
}

/// One formal parameter
#[derive(Debug, Clone)]
pub struct Argument {
    /// The name
    pub name: String,
    /// The argument category
    pub category: TypeCategory,
    /// Does it have a default value?
    pub has_default: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>, category: TypeCategory) -> Self {
        Argument { name: name.into(), category, has_default: false }
    }

    pub fn with_default(name: impl Into<String>, category: TypeCategory) -> Self {
        Argument { name: name.into(), category, has_default: true }
    }
}

/// A function signature
#[derive(Debug, Clone)]
pub struct Signature {
    /// The builtin
    pub builtin: Builtin,
    /// The ordered formal parameters
    pub arguments: Vec<Argument>,
}

/// A collection of functions, optionally inheriting a parent collection
pub struct Functions {
    parent: Option<&'static Functions>,
    functions: HashMap<&'static str, Signature>,
}

impl Functions {
    fn new(
        parent: Option<&'static Functions>,
        signatures: impl IntoIterator<Item = (&'static str, Builtin, Vec<Argument>)>,
    ) -> Self {
        let functions = signatures
            .into_iter()
            .map(|(name, builtin, arguments)| (name, Signature { builtin, arguments }))
            .collect();
        Functions { parent, functions }
    }

    /// Find a function, consulting parents
    pub fn lookup(&self, name: &str) -> Option<&Signature> {
        let mut current = Some(self);
        while let Some(functions) = current {
            if let Some(sig) = functions.functions.get(name) {
                return Some(sig);
            }
            current = functions.parent;
        }
        None
    }
}

use TypeCategory::{Expression, ExpressionList, Scalar, Symbol, Table};

fn arg(name: &'static str, category: TypeCategory) -> Argument {
    Argument::new(name, category)
}

fn opt(name: &'static str, category: TypeCategory) -> Argument {
    Argument::with_default(name, category)
}

/// Functions defined on all scalar types
static SCALAR_FUNCTIONS: LazyLock<Functions> = LazyLock::new(|| {
    Functions::new(None, [
        ("asc", Builtin::Asc, vec![]),
        ("desc", Builtin::Desc, vec![]),
        ("collate", Builtin::Collate, vec![arg("collate", Symbol)]),
        ("is", Builtin::Is, vec![arg("other", Scalar)]),
        ("between", Builtin::Between, vec![arg("lower", Scalar), arg("upper", Scalar)]),
        ("in", Builtin::In, vec![arg("values", ExpressionList)]),
    ])
});

/// Functions defined on text types
static TEXT_FUNCTIONS: LazyLock<Functions> = LazyLock::new(|| {
    Functions::new(Some(LazyLock::force(&SCALAR_FUNCTIONS)), [
        ("like", Builtin::Like, vec![arg("pattern", Scalar)]),
        ("substr", Builtin::Substr, vec![opt("from", Scalar), opt("for", Scalar)]),
    ])
});

/// Functions defined on dates
static DATE_FUNCTIONS: LazyLock<Functions> = LazyLock::new(|| {
    Functions::new(Some(LazyLock::force(&SCALAR_FUNCTIONS)), [
        ("extract", Builtin::Extract, vec![arg("part", Symbol)]),
    ])
});

/// Functions defined on tables
pub static TABLE_FUNCTIONS: LazyLock<Functions> = LazyLock::new(|| {
    Functions::new(None, [
        ("filter", Builtin::Filter, vec![arg("condition", Expression)]),
        ("join", Builtin::Join, vec![
            arg("table", Table),
            arg("on", Expression),
            opt("type", Symbol),
        ]),
        ("groupby", Builtin::GroupBy, vec![
            arg("groups", ExpressionList),
            opt("aggregates", ExpressionList),
            opt("type", Symbol),
            opt("sets", ExpressionList),
        ]),
        ("aggregate", Builtin::Aggregate, vec![arg("aggregate", Expression)]),
        ("distinct", Builtin::Distinct, vec![]),
        ("orderby", Builtin::OrderBy, vec![
            arg("expressions", ExpressionList),
            opt("limit", Expression),
            opt("offset", Expression),
        ]),
        ("map", Builtin::Map, vec![arg("expressions", ExpressionList)]),
        ("project", Builtin::Project, vec![arg("expressions", ExpressionList)]),
        ("projectout", Builtin::ProjectOut, vec![arg("columns", ExpressionList)]),
        ("union", Builtin::Union, vec![arg("table", Table), opt("all", Expression)]),
        ("except", Builtin::Except, vec![arg("table", Table), opt("all", Expression)]),
        ("intersect", Builtin::Intersect, vec![arg("table", Table), opt("all", Expression)]),
        ("window", Builtin::Window, vec![
            arg("expressions", ExpressionList),
            opt("partitionby", ExpressionList),
            opt("orderby", ExpressionList),
            opt("framebegin", Expression),
            opt("frameend", Expression),
            opt("frametype", Symbol),
        ]),
        ("as", Builtin::As, vec![arg("name", Symbol)]),
        ("alias", Builtin::Alias, vec![arg("name", Symbol)]),
    ])
});

/// The free functions
pub static FREE_FUNCTIONS: LazyLock<Functions> = LazyLock::new(|| {
    Functions::new(None, [
        ("count", Builtin::AggCount, vec![opt("value", Expression), opt("distinct", Expression)]),
        ("sum", Builtin::AggSum, vec![arg("value", Expression), opt("distinct", Expression)]),
        ("avg", Builtin::AggAvg, vec![arg("value", Expression), opt("distinct", Expression)]),
        ("min", Builtin::AggMin, vec![arg("value", Expression)]),
        ("max", Builtin::AggMax, vec![arg("value", Expression)]),
        ("row_number", Builtin::WindowRowNumber, vec![]),
        ("rank", Builtin::WindowRank, vec![arg("value", Expression)]),
        ("dense_rank", Builtin::WindowDenseRank, vec![arg("value", Expression)]),
        ("ntile", Builtin::WindowNTile, vec![arg("n", Expression)]),
        ("lead", Builtin::WindowLead, vec![
            arg("value", Expression),
            opt("offset", Expression),
            opt("default", Expression),
        ]),
        ("lag", Builtin::WindowLag, vec![
            arg("value", Expression),
            opt("offset", Expression),
            opt("default", Expression),
        ]),
        ("first_value", Builtin::WindowFirstValue, vec![arg("value", Expression)]),
        ("last_value", Builtin::WindowLastValue, vec![arg("value", Expression)]),
        ("table", Builtin::Table, vec![arg("values", ExpressionList)]),
        ("case", Builtin::Case, vec![
            arg("cases", ExpressionList),
            opt("else", Expression),
            opt("search", Expression),
        ]),
        ("gensym", Builtin::Gensym, vec![opt("name", Expression)]),
        ("foreigncall", Builtin::ForeignCall, vec![
            arg("name", Expression),
            arg("returns", Symbol),
            opt("arguments", ExpressionList),
            opt("type", Symbol),
        ]),
        ("defun", Builtin::Defun, vec![]),
    ])
});

/// The method functions for a scalar receiver type
pub fn functions_for(ty: Type) -> &'static Functions {
    match ty.kind() {
        TypeKind::Char { .. } | TypeKind::Varchar { .. } | TypeKind::Text => {
            LazyLock::force(&TEXT_FUNCTIONS)
        }
        TypeKind::Date => LazyLock::force(&DATE_FUNCTIONS),
        _ => LazyLock::force(&SCALAR_FUNCTIONS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_inherits_scalar_functions() {
        let text = functions_for(Type::text());
        assert!(text.lookup("like").is_some());
        assert!(text.lookup("asc").is_some());
        assert!(text.lookup("extract").is_none());

        let scalar = functions_for(Type::integer());
        assert!(scalar.lookup("like").is_none());
        assert!(scalar.lookup("between").is_some());

        let date = functions_for(Type::date());
        assert!(date.lookup("extract").is_some());
        assert!(date.lookup("desc").is_some());
    }

    #[test]
    fn free_functions_cover_aggregates_and_construction() {
        assert_eq!(FREE_FUNCTIONS.lookup("count").map(|s| s.builtin), Some(Builtin::AggCount));
        assert_eq!(FREE_FUNCTIONS.lookup("table").map(|s| s.builtin), Some(Builtin::Table));
        assert!(FREE_FUNCTIONS.lookup("filter").is_none());
        assert!(TABLE_FUNCTIONS.lookup("filter").is_some());
    }
}
