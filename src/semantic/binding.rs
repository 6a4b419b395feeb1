//! The name environment of the analyzer
//!
//! A `BindingInfo` is everything visible at one point during analysis: the
//! ordered output columns, the name lookup, named scopes for
//! `binding.column` access, aliases, captured let arguments, the parent
//! scope for argument resolution, and the active group-by context.
//!
//! Name collisions never silently shadow: a second binding under the same
//! name turns the entry ambiguous, and only a later use of the name raises.

use crate::algebra::{Aggregation, Collate, Iu};
use crate::error::{Error, Result};
use crate::parsing::ast;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Information about collation and ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderingInfo {
    /// The collate
    pub collate: Collate,
    /// Descending?
    pub descending: bool,
}

impl OrderingInfo {
    /// Construct the default order
    pub fn default_order() -> Self {
        OrderingInfo::default()
    }

    /// Look up a collate by name. The collation catalog is empty for now.
    pub fn lookup_collate(name: &str) -> Result<Collate> {
        Err(Error::analyze(format!("unknown collate '{}'", name)))
    }

    /// Unify two collate specifications
    pub fn unify_collate(a: OrderingInfo, b: OrderingInfo) -> Result<OrderingInfo> {
        if a.collate != b.collate {
            return Err(Error::analyze("collate mismatch"));
        }
        Ok(a)
    }
}

/// The result of a column lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Exactly one binding
    Unique(Iu),
    /// More than one binding, an error to use
    Ambiguous,
}

/// The result of a scoped `binding.column` lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScopedLookup {
    Found(Iu),
    AmbiguousColumn,
    AmbiguousScope,
    NotFound,
}

/// A named scope of columns
#[derive(Debug, Clone, Default)]
struct Scope {
    /// The columns
    columns: HashMap<String, Resolution>,
    /// Is the scope ambiguous?
    ambiguous: bool,
}

/// A column list alias
#[derive(Debug, Clone, Default)]
pub struct Alias {
    /// The columns
    pub columns: Vec<Iu>,
    /// Is the alias ambiguous?
    pub ambiguous: bool,
}

/// A captured let argument
#[derive(Clone)]
pub enum ArgumentInfo<'a> {
    /// A deferred value: the argument AST plus the caller state it is
    /// re-analyzed under at every use site
    Value {
        ast: &'a ast::Expr,
        scope: Rc<BindingInfo<'a>>,
        let_scope_limit: usize,
    },
    /// A symbol, resolved to a fixed string at binding time
    Symbol(String),
}

/// The context installed while aggregates or window expressions are
/// analyzed. Aggregate builtins look it up on the current binding and
/// append their entries to the shared aggregation list.
pub struct GroupByScope<'a> {
    /// The scope available within aggregations
    pub pre_aggregation: Rc<BindingInfo<'a>>,
    /// The aggregations computed so far
    pub aggregations: RefCell<Vec<Aggregation>>,
    /// Is this a window computation?
    pub is_window: bool,
}

/// One output column
#[derive(Debug, Clone)]
pub struct BindingColumn {
    /// The name
    pub name: String,
    /// The IU
    pub iu: Iu,
}

/// The name environment at one point of the analysis
#[derive(Clone, Default)]
pub struct BindingInfo<'a> {
    /// The well defined column order
    columns: Vec<BindingColumn>,
    /// Mapping from column name to IU
    column_lookup: HashMap<String, Resolution>,
    /// Scoped columns
    scopes: HashMap<String, Scope>,
    /// Column aliases
    aliases: HashMap<String, Alias>,
    /// Captured let arguments
    arguments: HashMap<String, ArgumentInfo<'a>>,
    /// The parent scope for argument resolution
    parent: Option<Rc<BindingInfo<'a>>>,
    /// The group by scope, if any
    group_by: Option<Rc<GroupByScope<'a>>>,
}

impl<'a> BindingInfo<'a> {
    /// The empty root scope
    pub fn root() -> Rc<Self> {
        Rc::new(BindingInfo::default())
    }

    /// Access all columns in output order
    pub fn columns(&self) -> &[BindingColumn] {
        &self.columns
    }

    /// Add a new scope. Marks it ambiguous and unusable if the name is
    /// already taken.
    pub fn add_scope(&mut self, name: &str) -> bool {
        if let Some(scope) = self.scopes.get_mut(name) {
            scope.columns.clear();
            scope.ambiguous = true;
            return false;
        }
        self.scopes.insert(name.to_string(), Scope::default());
        true
    }

    /// The number of distinct column names a scope holds
    pub fn scope_size(&self, name: &str) -> usize {
        self.scopes.get(name).map_or(0, |s| s.columns.len())
    }

    /// Add a binding, optionally into a named scope
    pub fn add_binding(&mut self, scope: Option<&str>, column: &str, iu: Iu) {
        if let Some(scope) = scope
            && let Some(scope) = self.scopes.get_mut(scope)
            && !scope.ambiguous
        {
            scope
                .columns
                .entry(column.to_string())
                .and_modify(|e| *e = Resolution::Ambiguous)
                .or_insert(Resolution::Unique(iu));
        }
        self.column_lookup
            .entry(column.to_string())
            .and_modify(|e| *e = Resolution::Ambiguous)
            .or_insert(Resolution::Unique(iu));
        self.columns.push(BindingColumn { name: column.to_string(), iu });
    }

    /// Look up a column
    pub fn lookup(&self, name: &str) -> Option<Resolution> {
        self.column_lookup.get(name).copied()
    }

    /// Look up a column within a named scope
    pub fn lookup_scoped(&self, binding: &str, name: &str) -> ScopedLookup {
        match self.scopes.get(binding) {
            Some(scope) if scope.ambiguous => ScopedLookup::AmbiguousScope,
            Some(scope) => match scope.columns.get(name) {
                Some(Resolution::Unique(iu)) => ScopedLookup::Found(*iu),
                Some(Resolution::Ambiguous) => ScopedLookup::AmbiguousColumn,
                None => ScopedLookup::NotFound,
            },
            None => ScopedLookup::NotFound,
        }
    }

    /// Register a captured argument
    pub fn register_argument(&mut self, name: &str, info: ArgumentInfo<'a>) {
        self.arguments.insert(name.to_string(), info);
    }

    /// Find an argument, walking the parent chain
    pub fn find_argument(&self, name: &str) -> Option<&ArgumentInfo<'a>> {
        if let Some(info) = self.arguments.get(name) {
            return Some(info);
        }
        self.parent.as_ref()?.find_argument(name)
    }

    /// Add an alias for a column list
    pub fn add_alias(&mut self, name: &str, columns: Vec<Iu>) {
        self.aliases
            .entry(name.to_string())
            .and_modify(|a| {
                a.columns.clear();
                a.ambiguous = true;
            })
            .or_insert(Alias { columns, ambiguous: false });
    }

    /// Look up an alias
    pub fn lookup_alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Find the name of a column by its IU
    pub fn column_name(&self, iu: Iu) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.iu.id == iu.id)
            .map(|c| c.name.as_str())
    }

    /// Merge another binding in after a join
    pub fn join(&mut self, other: &BindingInfo<'a>) {
        self.columns.extend(other.columns.iter().cloned());
        for (name, resolution) in &other.column_lookup {
            self.column_lookup
                .entry(name.clone())
                .and_modify(|e| *e = Resolution::Ambiguous)
                .or_insert(*resolution);
        }
        for (name, scope) in &other.scopes {
            self.scopes
                .entry(name.clone())
                .and_modify(|s| {
                    s.columns.clear();
                    s.ambiguous = true;
                })
                .or_insert_with(|| scope.clone());
        }
        for (name, alias) in &other.aliases {
            self.aliases
                .entry(name.clone())
                .and_modify(|a| {
                    a.columns.clear();
                    a.ambiguous = true;
                })
                .or_insert_with(|| alias.clone());
        }
    }

    /// Remove columns from the binding (for projectout)
    pub fn remove_columns(&mut self, remove: &[Iu]) {
        let removed = |iu: &Iu| remove.iter().any(|r| r.id == iu.id);
        self.columns.retain(|c| !removed(&c.iu));
        self.column_lookup
            .retain(|_, r| !matches!(r, Resolution::Unique(iu) if removed(iu)));
        for scope in self.scopes.values_mut() {
            scope
                .columns
                .retain(|_, r| !matches!(r, Resolution::Unique(iu) if removed(iu)));
        }
    }

    /// Replace all scopes by a single named scope holding every column
    /// (for `as`)
    pub fn replace_scopes(&mut self, name: &str) {
        let mut scope = Scope::default();
        for c in &self.columns {
            scope
                .columns
                .entry(c.name.clone())
                .and_modify(|e| *e = Resolution::Ambiguous)
                .or_insert(Resolution::Unique(c.iu));
        }
        self.scopes.clear();
        self.scopes.insert(name.to_string(), scope);
    }

    /// The active group by scope, if any
    pub fn group_by_scope(&self) -> Option<&Rc<GroupByScope<'a>>> {
        self.group_by.as_ref()
    }

    /// A copy of this binding with the given parent scope
    pub fn with_parent(self: &Rc<Self>, parent: &Rc<BindingInfo<'a>>) -> Rc<Self> {
        let mut copy = (**self).clone();
        copy.parent = Some(parent.clone());
        Rc::new(copy)
    }

    /// A copy of this binding with a group by scope installed
    pub fn with_group_by(self: &Rc<Self>, gbs: Rc<GroupByScope<'a>>) -> Rc<Self> {
        let mut copy = (**self).clone();
        copy.group_by = Some(gbs);
        Rc::new(copy)
    }

    /// Set the parent scope on an owned binding
    pub fn set_parent(&mut self, parent: &Rc<BindingInfo<'a>>) {
        self.parent = Some(parent.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::IuId;
    use crate::types::Type;

    fn iu(id: u64) -> Iu {
        Iu { id: IuId::for_tests(id), ty: Type::integer() }
    }

    #[test]
    fn duplicate_bindings_become_ambiguous() {
        let mut binding = BindingInfo::default();
        binding.add_scope("t");
        binding.add_binding(Some("t"), "a", iu(1));
        binding.add_binding(Some("t"), "a", iu(2));
        assert_eq!(binding.lookup("a"), Some(Resolution::Ambiguous));
        assert_eq!(binding.lookup_scoped("t", "a"), ScopedLookup::AmbiguousColumn);
        assert_eq!(binding.lookup("b"), None);
    }

    #[test]
    fn join_marks_shared_names_ambiguous() {
        let mut left = BindingInfo::default();
        left.add_scope("l");
        left.add_binding(Some("l"), "key", iu(1));
        left.add_binding(Some("l"), "a", iu(2));
        let mut right = BindingInfo::default();
        right.add_scope("r");
        right.add_binding(Some("r"), "key", iu(3));
        right.add_binding(Some("r"), "b", iu(4));

        left.join(&right);
        assert_eq!(left.lookup("key"), Some(Resolution::Ambiguous));
        assert_eq!(left.lookup("a"), Some(Resolution::Unique(iu(2))));
        assert_eq!(left.lookup("b"), Some(Resolution::Unique(iu(4))));
        // Scoped access still disambiguates
        assert_eq!(left.lookup_scoped("l", "key"), ScopedLookup::Found(iu(1)));
        assert_eq!(left.lookup_scoped("r", "key"), ScopedLookup::Found(iu(3)));
        assert_eq!(left.columns().len(), 4);
    }

    #[test]
    fn duplicate_scope_becomes_ambiguous_and_empty() {
        let mut binding = BindingInfo::default();
        assert!(binding.add_scope("t"));
        binding.add_binding(Some("t"), "a", iu(1));
        assert!(!binding.add_scope("t"));
        assert_eq!(binding.lookup_scoped("t", "a"), ScopedLookup::AmbiguousScope);
    }

    #[test]
    fn arguments_resolve_through_the_parent_chain() {
        let mut root = BindingInfo::default();
        root.register_argument("x", ArgumentInfo::Symbol("n_name".into()));
        let root = Rc::new(root);
        let child = BindingInfo::default();
        let child = Rc::new(child).with_parent(&root);
        assert!(matches!(
            child.find_argument("x"),
            Some(ArgumentInfo::Symbol(s)) if s == "n_name"
        ));
        assert!(child.find_argument("y").is_none());
    }

    #[test]
    fn remove_columns_updates_lookups() {
        let mut binding = BindingInfo::default();
        binding.add_scope("t");
        binding.add_binding(Some("t"), "a", iu(1));
        binding.add_binding(Some("t"), "b", iu(2));
        binding.remove_columns(&[iu(1)]);
        assert_eq!(binding.lookup("a"), None);
        assert_eq!(binding.lookup("b"), Some(Resolution::Unique(iu(2))));
        assert_eq!(binding.columns().len(), 1);
    }
}
