//! Semantic analysis for SaneQL queries
//!
//! `SemanticAnalysis` walks the AST and produces either a scalar expression
//! or a relational operator tree plus the binding that names its columns.
//! All name resolution, typing, implicit coercions, function dispatch, and
//! let expansion happen here; the algebra tree that comes out is fully
//! typed and ready for SQL emission.

use super::binding::{
    ArgumentInfo, BindingInfo, GroupByScope, OrderingInfo, Resolution, ScopedLookup,
};
use super::functions::{
    Argument, Builtin, FREE_FUNCTIONS, Signature, TABLE_FUNCTIONS, TypeCategory, functions_for,
};
use crate::algebra::{
    AggregateOp, Aggregation, CallType, ComparisonMode, DatePart, Expression, Iu, IuId, JoinType,
    Operator, SetOperationKind, SortEntry, WindowOp,
};
use crate::algebra::expression::{BinaryOp, UnaryOp};
use crate::error::{Error, Result};
use crate::parsing::ast;
use crate::types::{Schema, Type, TypeKind};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::LazyLock;

/// The result of analyzing one expression: a scalar computation or a table
pub enum ExpressionResult<'a> {
    /// A scalar expression with its collation and ordering
    Scalar {
        expression: Expression,
        ordering: OrderingInfo,
    },
    /// An operator tree with its column bindings
    Table {
        op: Operator,
        binding: Rc<BindingInfo<'a>>,
    },
}

impl ExpressionResult<'_> {
    pub fn is_scalar(&self) -> bool {
        matches!(self, ExpressionResult::Scalar { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self, ExpressionResult::Table { .. })
    }
}

/// Build a scalar result with default ordering
fn scalar<'a>(expression: Expression) -> ExpressionResult<'a> {
    ExpressionResult::Scalar { expression, ordering: OrderingInfo::default_order() }
}

/// Unwrap a scalar result or fail with the given message
fn require_scalar(
    result: ExpressionResult<'_>,
    message: impl Into<String>,
) -> Result<(Expression, OrderingInfo)> {
    match result {
        ExpressionResult::Scalar { expression, ordering } => Ok((expression, ordering)),
        ExpressionResult::Table { .. } => Err(Error::analyze(message)),
    }
}

/// Unwrap a table result or fail with the given message
fn require_table<'a>(
    result: ExpressionResult<'a>,
    message: impl Into<String>,
) -> Result<(Operator, Rc<BindingInfo<'a>>)> {
    match result {
        ExpressionResult::Table { op, binding } => Ok((op, binding)),
        ExpressionResult::Scalar { .. } => Err(Error::analyze(message)),
    }
}

/// Unwrap the receiver of a scalar method
fn scalar_base<'a>(
    name: &str,
    base: Option<ExpressionResult<'a>>,
) -> Result<(Expression, OrderingInfo)> {
    let base = base.ok_or_else(|| Error::analyze(format!("'{}' requires a value", name)))?;
    require_scalar(base, format!("'{}' requires a scalar value", name))
}

/// Unwrap the receiver of a table method
fn table_base<'a>(
    name: &str,
    base: Option<ExpressionResult<'a>>,
) -> Result<(Operator, Rc<BindingInfo<'a>>)> {
    let base = base.ok_or_else(|| Error::analyze(format!("'{}' requires a value", name)))?;
    require_table(base, format!("'{}' requires a table value", name))
}

/// Unwrap a formal that the assignment step guarantees to be present
fn required<'b>(
    arg: Option<&'b ast::FuncArg>,
    func: &str,
    name: &str,
) -> Result<&'b ast::FuncArg> {
    arg.ok_or_else(|| {
        Error::analyze(format!("parameter '{}' missing in call to '{}'", name, func))
    })
}

/// Names with a leading space are reserved for generated symbols; stuff
/// another space in front so user identifiers can never collide with them
fn internal_name(name: &str) -> String {
    if name.starts_with(' ') {
        return format!(" {}", name);
    }
    name.to_string()
}

/// Try to infer a column name from an expression
fn infer_name(expr: &ast::Expr) -> String {
    match expr {
        ast::Expr::Token(name) => internal_name(name),
        ast::Expr::Access { part, .. } => internal_name(part),
        _ => String::new(),
    }
}

/// Wrap an expression in a cast
fn cast_to(expression: Expression, ty: Type) -> Expression {
    Expression::Cast { input: Box::new(expression), ty }
}

/// Assign call arguments to formal parameters. Positional arguments come
/// first; the first named argument switches to name based assignment.
fn assign_arguments<'b>(
    func: &str,
    formals: &[Argument],
    args: &'b [ast::FuncArg],
) -> Result<Vec<Option<&'b ast::FuncArg>>> {
    let mut assigned: Vec<Option<&'b ast::FuncArg>> = Vec::new();
    let mut had_named = false;
    for arg in args {
        if let Some(arg_name) = &arg.name {
            if !had_named {
                assigned.resize(formals.len(), None);
                had_named = true;
            }
            let name = internal_name(arg_name);
            let slot = formals
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| {
                    Error::analyze(format!("parameter '{}' not found in call to '{}'", name, func))
                })?;
            if assigned[slot].is_some() {
                return Err(Error::analyze(format!(
                    "parameter '{}' provided more than once",
                    name
                )));
            }
            assigned[slot] = Some(arg);
        } else {
            if had_named {
                return Err(Error::analyze(format!(
                    "positional parameters cannot be used after named parameters in call to '{}'",
                    func
                )));
            }
            if assigned.len() >= formals.len() {
                return Err(Error::analyze(format!("too many parameters in call to '{}'", func)));
            }
            assigned.push(Some(arg));
        }
    }
    if !had_named {
        assigned.resize(formals.len(), None);
    }
    for (formal, slot) in formals.iter().zip(&assigned) {
        if slot.is_none() && !formal.has_default {
            return Err(Error::analyze(format!(
                "parameter '{}' missing in call to '{}'",
                formal.name, func
            )));
        }
    }
    Ok(assigned)
}

/// A named entry of an expression list argument
struct ExpressionArg<'a> {
    name: String,
    value: ExpressionResult<'a>,
}

/// A user defined let
struct LetInfo<'a> {
    /// The signature
    arguments: Vec<Argument>,
    /// The default value ASTs, parallel to the signature
    defaults: Vec<Option<&'a ast::Expr>>,
    /// The body
    body: &'a ast::Expr,
}

/// Semantic analysis for one compilation
pub struct SemanticAnalysis<'a> {
    /// The schema
    schema: &'a Schema,
    /// All lets, in declaration order
    lets: Vec<LetInfo<'a>>,
    /// Lookup of lets by name
    let_lookup: HashMap<String, usize>,
    /// Visibility limit for lets during expansion
    let_scope_limit: usize,
    /// The next gensym id
    next_symbol_id: u64,
    /// The next IU id
    next_iu_id: u64,
}

impl<'a> SemanticAnalysis<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        SemanticAnalysis {
            schema,
            lets: Vec::new(),
            let_lookup: HashMap::new(),
            let_scope_limit: usize::MAX,
            next_symbol_id: 1,
            next_iu_id: 0,
        }
    }

    /// Mint a fresh IU
    fn make_iu(&mut self, ty: Type) -> Iu {
        self.next_iu_id += 1;
        Iu { id: IuId::new(self.next_iu_id), ty }
    }

    /// Analyze a query
    pub fn analyze_query(&mut self, query: &'a ast::Query) -> Result<ExpressionResult<'a>> {
        let body = match query {
            ast::Query::DefineFunction => return Err(Error::NotImplemented("defun")),
            ast::Query::Body(body) => body,
        };
        for entry in &body.lets {
            self.analyze_let(entry)?;
        }
        self.analyze_expression(&BindingInfo::root(), &body.body)
    }

    /// Register a let construction
    fn analyze_let(&mut self, entry: &'a ast::LetEntry) -> Result<()> {
        let mut arguments = Vec::new();
        let mut defaults = Vec::new();
        let mut seen = HashSet::new();
        for arg in &entry.args {
            let name = internal_name(&arg.name);
            if !seen.insert(name.clone()) {
                return Err(Error::analyze(format!("duplicate function argument '{}'", name)));
            }
            let category = match arg.category.as_deref() {
                None => TypeCategory::Scalar,
                Some("table") => TypeCategory::Table,
                Some("expression") => TypeCategory::Expression,
                Some("symbol") => TypeCategory::Symbol,
                Some(other) => {
                    return Err(Error::analyze(format!("unsupported argument type '{}'", other)));
                }
            };
            arguments.push(Argument {
                name,
                category,
                has_default: arg.default.is_some(),
            });
            defaults.push(arg.default.as_ref());
        }
        let name = internal_name(&entry.name);
        if self.let_lookup.contains_key(&name) {
            return Err(Error::analyze(format!("duplicate let '{}'", name)));
        }
        self.lets.push(LetInfo { arguments, defaults, body: &entry.body });
        self.let_lookup.insert(name, self.lets.len() - 1);
        Ok(())
    }

    /// Analyze an expression
    pub fn analyze_expression(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        expr: &'a ast::Expr,
    ) -> Result<ExpressionResult<'a>> {
        match expr {
            ast::Expr::Literal(literal) => self.analyze_literal(literal),
            ast::Expr::Token(name) => self.analyze_token(scope, name),
            ast::Expr::Access { base, part } => self.analyze_access(scope, base, part),
            ast::Expr::Call { func, args } => self.analyze_call(scope, func, args),
            ast::Expr::Binary { op, left, right } => {
                self.analyze_binary_expression(scope, *op, left, right)
            }
            ast::Expr::Unary { op, value } => self.analyze_unary_expression(scope, *op, value),
            ast::Expr::Cast { value, ty } => self.analyze_cast(scope, value, ty),
        }
    }

    /// Analyze a literal
    fn analyze_literal(&mut self, literal: &ast::Literal) -> Result<ExpressionResult<'a>> {
        let expression = match literal {
            ast::Literal::Integer(value) => Expression::Const {
                value: value.clone(),
                ty: Type::integer(),
                null: false,
            },
            ast::Literal::Float(value) => {
                let digits = |s: &str| s.chars().filter(char::is_ascii_digit).count();
                let (before, after) = match value.split_once('.') {
                    Some((before, after)) => (digits(before), digits(after)),
                    None => (digits(value), 0),
                };
                if before + after > 38 {
                    return Err(Error::analyze("decimal precision overflow"));
                }
                Expression::Const {
                    value: value.clone(),
                    ty: Type::decimal((before + after) as u8, after as u8),
                    null: false,
                }
            }
            ast::Literal::String(value) => Expression::Const {
                value: value.clone(),
                ty: Type::text(),
                null: false,
            },
            ast::Literal::True => Expression::Const {
                value: "true".into(),
                ty: Type::bool(),
                null: false,
            },
            ast::Literal::False => Expression::Const {
                value: "false".into(),
                ty: Type::bool(),
                null: false,
            },
            ast::Literal::Null => Expression::Const {
                value: String::new(),
                ty: Type::unknown().as_nullable(),
                null: true,
            },
        };
        Ok(scalar(expression))
    }

    /// Analyze a bare token: column, captured argument, let, or table
    fn analyze_token(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
    ) -> Result<ExpressionResult<'a>> {
        if let Some(resolution) = scope.lookup(name) {
            return match resolution {
                Resolution::Unique(iu) => Ok(scalar(Expression::IuRef { iu })),
                Resolution::Ambiguous => Err(Error::Ambiguous(name.to_string())),
            };
        }
        if let Some(info) = scope.find_argument(name) {
            match info.clone() {
                ArgumentInfo::Value { ast, scope: captured, let_scope_limit } => {
                    // Re-analyze the captured AST under the caller's state
                    let old = std::mem::replace(&mut self.let_scope_limit, let_scope_limit);
                    let result = self.analyze_expression(&captured, ast);
                    self.let_scope_limit = old;
                    return result;
                }
                ArgumentInfo::Symbol(symbol) => return self.analyze_plain_name(scope, &symbol),
            }
        }
        self.analyze_plain_name(scope, name)
    }

    /// Resolve a name that is not a captured argument
    fn analyze_plain_name(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
    ) -> Result<ExpressionResult<'a>> {
        if let Some(resolution) = scope.lookup(name) {
            return match resolution {
                Resolution::Unique(iu) => Ok(scalar(Expression::IuRef { iu })),
                Resolution::Ambiguous => Err(Error::Ambiguous(name.to_string())),
            };
        }

        // A value let without parameters expands in place
        if let Some(&index) = self.let_lookup.get(name)
            && index < self.let_scope_limit
            && self.lets[index].arguments.is_empty()
        {
            let body = self.lets[index].body;
            let old = std::mem::replace(&mut self.let_scope_limit, index);
            let result = self.analyze_expression(&BindingInfo::root(), body);
            self.let_scope_limit = old;
            return result;
        }

        // A table scan introduces one scope named like the table
        let Some(table) = self.schema.lookup_table(name) else {
            return Err(Error::UnknownTable(name.to_string()));
        };
        let binding_name = internal_name(name);
        let mut binding = BindingInfo::default();
        binding.add_scope(&binding_name);
        let mut columns = Vec::new();
        for column in &table.columns {
            let iu = self.make_iu(column.ty);
            columns.push((column.name.clone(), iu));
            binding.add_binding(Some(&binding_name), &internal_name(&column.name), iu);
        }
        Ok(ExpressionResult::Table {
            op: Operator::TableScan { name: name.to_string(), columns },
            binding: Rc::new(binding),
        })
    }

    /// Analyze scoped access `base.part`
    fn analyze_access(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: &'a ast::Expr,
        part: &str,
    ) -> Result<ExpressionResult<'a>> {
        let name = internal_name(part);
        let Some(base_token) = base.as_token() else {
            return Err(Error::analyze(format!("invalid access to column '{}'", name)));
        };
        let mut base_name = internal_name(base_token);
        if let Some(ArgumentInfo::Symbol(symbol)) = scope.find_argument(&base_name) {
            base_name = symbol.clone();
        }
        match scope.lookup_scoped(&base_name, &name) {
            ScopedLookup::Found(iu) => Ok(scalar(Expression::IuRef { iu })),
            ScopedLookup::AmbiguousColumn => Err(Error::Ambiguous(name)),
            ScopedLookup::AmbiguousScope => Err(Error::Ambiguous(base_name)),
            ScopedLookup::NotFound => Err(Error::NotFound(format!("{}.{}", base_name, name))),
        }
    }

    /// Analyze a binary expression
    fn analyze_binary_expression(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        op: ast::BinaryOp,
        left: &'a ast::Expr,
        right: &'a ast::Expr,
    ) -> Result<ExpressionResult<'a>> {
        let left = self.analyze_expression(scope, left)?;
        let right = self.analyze_expression(scope, right)?;

        use ast::BinaryOp as Op;
        match op {
            Op::Plus => self.analyze_arithmetic("+", BinaryOp::Plus, left, right),
            Op::Minus => self.analyze_arithmetic("-", BinaryOp::Minus, left, right),
            Op::Mul => self.analyze_arithmetic("*", BinaryOp::Mul, left, right),
            Op::Div => self.analyze_arithmetic("/", BinaryOp::Div, left, right),
            Op::Mod => self.analyze_arithmetic("%", BinaryOp::Mod, left, right),
            Op::Pow => self.analyze_arithmetic("^", BinaryOp::Power, left, right),
            Op::Less => self.analyze_comparison("<", ComparisonMode::Less, left, right),
            Op::Greater => self.analyze_comparison(">", ComparisonMode::Greater, left, right),
            Op::Equals => self.analyze_comparison("=", ComparisonMode::Equal, left, right),
            Op::NotEquals => self.analyze_comparison("<>", ComparisonMode::NotEqual, left, right),
            Op::LessOrEqual => {
                self.analyze_comparison("<=", ComparisonMode::LessOrEqual, left, right)
            }
            Op::GreaterOrEqual => {
                self.analyze_comparison(">=", ComparisonMode::GreaterOrEqual, left, right)
            }
            Op::And => self.analyze_logic("&&", BinaryOp::And, left, right),
            Op::Or => self.analyze_logic("||", BinaryOp::Or, left, right),
        }
    }

    fn analyze_arithmetic(
        &mut self,
        name: &str,
        op: BinaryOp,
        left: ExpressionResult<'a>,
        right: ExpressionResult<'a>,
    ) -> Result<ExpressionResult<'a>> {
        let message = format!("scalar value required in operator '{}'", name);
        let (left, _) = require_scalar(left, message.clone())?;
        let (right, _) = require_scalar(right, message)?;
        let (lt, rt) = (left.result_type(), right.result_type());
        let nullable = lt.is_nullable() || rt.is_nullable();

        let (ty, op) = if lt.is_numeric() && rt.is_numeric() {
            // Decimal wins over integer; ties keep the left type
            let rank = |t: Type| matches!(t.kind(), TypeKind::Decimal { .. }) as u8;
            let wider = if rank(rt) > rank(lt) { rt } else { lt };
            (wider.with_nullable(nullable), op)
        } else if op == BinaryOp::Plus && lt.is_string() && rt.is_string() {
            (Type::text().with_nullable(nullable), BinaryOp::Concat)
        } else if lt.kind() == TypeKind::Date
            && rt.kind() == TypeKind::Interval
            && matches!(op, BinaryOp::Plus | BinaryOp::Minus)
        {
            (Type::date().with_nullable(nullable), op)
        } else {
            return Err(Error::analyze(format!("'{}' requires numerical arguments", name)));
        };
        Ok(scalar(Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            ty,
            op,
        }))
    }

    fn analyze_comparison(
        &mut self,
        name: &str,
        mode: ComparisonMode,
        left: ExpressionResult<'a>,
        right: ExpressionResult<'a>,
    ) -> Result<ExpressionResult<'a>> {
        let message = format!("scalar value required in operator '{}'", name);
        let (left, left_ordering) = require_scalar(left, message.clone())?;
        let (right, right_ordering) = require_scalar(right, message)?;
        let (left, right) = self.enforce_comparable(left, right)?;
        let order = OrderingInfo::unify_collate(left_ordering, right_ordering)?;
        Ok(scalar(Expression::Comparison {
            left: Box::new(left),
            right: Box::new(right),
            mode,
            collate: order.collate,
        }))
    }

    fn analyze_logic(
        &mut self,
        name: &str,
        op: BinaryOp,
        left: ExpressionResult<'a>,
        right: ExpressionResult<'a>,
    ) -> Result<ExpressionResult<'a>> {
        let message = format!("scalar value required in operator '{}'", name);
        let (mut left, _) = require_scalar(left, message.clone())?;
        let (mut right, _) = require_scalar(right, message)?;
        if left.result_type().kind() == TypeKind::Unknown {
            left = cast_to(left, Type::bool().as_nullable());
        }
        if right.result_type().kind() == TypeKind::Unknown {
            right = cast_to(right, Type::bool().as_nullable());
        }
        let (lt, rt) = (left.result_type(), right.result_type());
        if lt.kind() != TypeKind::Bool || rt.kind() != TypeKind::Bool {
            return Err(Error::analyze(format!("'{}' requires boolean arguments", name)));
        }
        let ty = Type::bool().with_nullable(lt.is_nullable() || rt.is_nullable());
        Ok(scalar(Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            ty,
            op,
        }))
    }

    /// Analyze a unary expression
    fn analyze_unary_expression(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        op: ast::UnaryOp,
        value: &'a ast::Expr,
    ) -> Result<ExpressionResult<'a>> {
        let value = self.analyze_expression(scope, value)?;
        let (name, op) = match op {
            ast::UnaryOp::Plus => ("+", UnaryOp::Plus),
            ast::UnaryOp::Minus => ("-", UnaryOp::Minus),
            ast::UnaryOp::Not => ("!", UnaryOp::Not),
        };
        let (value, _) =
            require_scalar(value, format!("scalar value required in operator '{}'", name))?;
        let ty = value.result_type();
        let valid = match op {
            UnaryOp::Plus | UnaryOp::Minus => {
                ty.is_numeric() || ty.kind() == TypeKind::Interval
            }
            UnaryOp::Not => ty.kind() == TypeKind::Bool,
        };
        if !valid {
            let kind = if op == UnaryOp::Not { "boolean" } else { "numerical" };
            return Err(Error::analyze(format!("'{}' requires {} arguments", name, kind)));
        }
        Ok(scalar(Expression::Unary { input: Box::new(value), ty, op }))
    }

    /// Make sure two values are comparable, inferring NULL types
    fn enforce_comparable(
        &self,
        a: Expression,
        b: Expression,
    ) -> Result<(Expression, Expression)> {
        let (ta, tb) = (a.result_type(), b.result_type());
        if ta.kind() == TypeKind::Unknown {
            if tb.kind() == TypeKind::Unknown {
                return Ok((a, b));
            }
            return Ok((cast_to(a, tb.as_nullable()), b));
        }
        if tb.kind() == TypeKind::Unknown {
            return Ok((a, cast_to(b, ta.as_nullable())));
        }
        let ok = match ta.kind() {
            TypeKind::Unknown => true,
            TypeKind::Bool => tb.kind() == TypeKind::Bool,
            TypeKind::Integer | TypeKind::Decimal { .. } => tb.is_numeric(),
            TypeKind::Char { .. } | TypeKind::Varchar { .. } | TypeKind::Text => tb.is_string(),
            TypeKind::Date => tb.kind() == TypeKind::Date,
            TypeKind::Interval => tb.kind() == TypeKind::Interval,
        };
        if !ok {
            return Err(Error::analyze(format!(
                "cannot compare '{}' and '{}'",
                ta.name(),
                tb.name()
            )));
        }
        Ok((a, b))
    }

    /// Analyze a cast expression
    fn analyze_cast(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        value: &'a ast::Expr,
        ty: &ast::TypeName,
    ) -> Result<ExpressionResult<'a>> {
        let value = self.analyze_expression(scope, value)?;
        let (expression, ordering) = require_scalar(value, "casts require scalar values")?;
        let ty = self.parse_simple_type_name(&ty.name)?;
        Ok(ExpressionResult::Scalar { expression: cast_to(expression, ty), ordering })
    }

    /// Parse a type string for a simple type
    fn parse_simple_type_name(&self, name: &str) -> Result<Type> {
        match name {
            "integer" => Ok(Type::integer()),
            "boolean" => Ok(Type::bool()),
            "text" => Ok(Type::text()),
            "date" => Ok(Type::date()),
            "interval" => Ok(Type::interval()),
            _ => Err(Error::analyze(format!("unknown type '{}'", name))),
        }
    }

    /// Analyze a call expression
    fn analyze_call(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        func: &'a ast::Expr,
        args: &'a [ast::FuncArg],
    ) -> Result<ExpressionResult<'a>> {
        let (base, name, sig): (Option<ExpressionResult<'a>>, &str, &'static Signature) =
            match func {
                ast::Expr::Access { base, part } => {
                    let base_result = self.analyze_expression(scope, base)?;
                    let (functions, type_name) = match &base_result {
                        ExpressionResult::Scalar { expression, .. } => {
                            let ty = expression.result_type();
                            (functions_for(ty), ty.name())
                        }
                        ExpressionResult::Table { .. } => {
                            (LazyLock::force(&TABLE_FUNCTIONS), "table")
                        }
                    };
                    let sig = functions.lookup(part).ok_or_else(|| {
                        Error::analyze(format!("'{}' not found for '{}'", part, type_name))
                    })?;
                    (Some(base_result), part.as_str(), sig)
                }
                ast::Expr::Token(name) => {
                    if let Some(&index) = self.let_lookup.get(name)
                        && index < self.let_scope_limit
                    {
                        return self.expand_let(scope, name, index, args);
                    }
                    let sig = FREE_FUNCTIONS
                        .lookup(name)
                        .ok_or_else(|| Error::FunctionNotFound(name.clone()))?;
                    (None, name.as_str(), sig)
                }
                _ => return Err(Error::analyze("invalid function name")),
            };

        // Table construction consumes its arguments as rows
        if sig.builtin == Builtin::Table {
            return self.analyze_table_construction(scope, name, args);
        }

        let assigned = assign_arguments(name, &sig.arguments, args)?;
        self.dispatch_builtin(scope, name, sig, base, &assigned)
    }

    /// Handle one builtin after argument assignment
    fn dispatch_builtin(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
        sig: &'static Signature,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        match sig.builtin {
            Builtin::Asc | Builtin::Desc => {
                let (expression, mut ordering) = scalar_base(name, base)?;
                ordering.descending = sig.builtin == Builtin::Desc;
                Ok(ExpressionResult::Scalar { expression, ordering })
            }
            Builtin::Collate => {
                let (expression, mut ordering) = scalar_base(name, base)?;
                let symbol =
                    self.symbol_argument(scope, name, "collate", required(assigned[0], name, "collate")?)?;
                ordering.collate = OrderingInfo::lookup_collate(&symbol)?;
                Ok(ExpressionResult::Scalar { expression, ordering })
            }
            Builtin::Is => {
                let (left, left_ordering) = scalar_base(name, base)?;
                let (right, right_ordering) =
                    self.scalar_argument(scope, name, "other", required(assigned[0], name, "other")?)?;
                let (left, right) = self.enforce_comparable(left, right)?;
                let order = OrderingInfo::unify_collate(left_ordering, right_ordering)?;
                Ok(scalar(Expression::Comparison {
                    left: Box::new(left),
                    right: Box::new(right),
                    mode: ComparisonMode::Is,
                    collate: order.collate,
                }))
            }
            Builtin::Like => {
                let (left, left_ordering) = scalar_base(name, base)?;
                let (right, right_ordering) =
                    self.scalar_argument(scope, name, "pattern", required(assigned[0], name, "pattern")?)?;
                if !left.result_type().is_string() || !right.result_type().is_string() {
                    return Err(Error::analyze("'like' requires string arguments"));
                }
                let order = OrderingInfo::unify_collate(left_ordering, right_ordering)?;
                Ok(scalar(Expression::Comparison {
                    left: Box::new(left),
                    right: Box::new(right),
                    mode: ComparisonMode::Like,
                    collate: order.collate,
                }))
            }
            Builtin::Between => {
                let (base, base_ordering) = scalar_base(name, base)?;
                let (lower, lower_ordering) =
                    self.scalar_argument(scope, name, "lower", required(assigned[0], name, "lower")?)?;
                let (upper, upper_ordering) =
                    self.scalar_argument(scope, name, "upper", required(assigned[1], name, "upper")?)?;
                let (base, lower) = self.enforce_comparable(base, lower)?;
                let (base, upper) = self.enforce_comparable(base, upper)?;
                let order = OrderingInfo::unify_collate(
                    OrderingInfo::unify_collate(base_ordering, lower_ordering)?,
                    upper_ordering,
                )?;
                Ok(scalar(Expression::Between {
                    base: Box::new(base),
                    lower: Box::new(lower),
                    upper: Box::new(upper),
                    collate: order.collate,
                }))
            }
            Builtin::In => {
                let (mut probe, mut ordering) = scalar_base(name, base)?;
                let entries = self
                    .expression_list_argument(scope, required(assigned[0], name, "values")?)?;
                if entries.is_empty() {
                    // x in () is always false
                    return Ok(scalar(Expression::Const {
                        value: "false".into(),
                        ty: Type::bool(),
                        null: false,
                    }));
                }
                let mut values = Vec::new();
                for entry in entries {
                    let (value, value_ordering) =
                        require_scalar(entry.value, "'in' requires scalar values")?;
                    let (new_probe, value) = self.enforce_comparable(probe, value)?;
                    probe = new_probe;
                    ordering = OrderingInfo::unify_collate(ordering, value_ordering)?;
                    values.push(value);
                }
                Ok(scalar(Expression::In {
                    probe: Box::new(probe),
                    values,
                    collate: ordering.collate,
                }))
            }
            Builtin::Substr => {
                let (value, ordering) = scalar_base(name, base)?;
                let bound = |arg: Option<&'a ast::FuncArg>,
                                 analysis: &mut Self,
                                 arg_name: &str|
                 -> Result<Option<Box<Expression>>> {
                    let Some(arg) = arg else { return Ok(None) };
                    let (value, _) = analysis.scalar_argument(scope, name, arg_name, arg)?;
                    if !value.result_type().is_numeric() {
                        return Err(Error::analyze("'substr' requires numerical arguments"));
                    }
                    Ok(Some(Box::new(value)))
                };
                let from = bound(assigned[0], self, "from")?;
                let len = bound(assigned[1], self, "for")?;
                if from.is_none() && len.is_none() {
                    return Err(Error::analyze("'substr' requires at least one argument"));
                }
                Ok(ExpressionResult::Scalar {
                    expression: Expression::Substr { value: Box::new(value), from, len },
                    ordering,
                })
            }
            Builtin::Extract => {
                let (value, _) = scalar_base(name, base)?;
                let part =
                    self.symbol_argument(scope, name, "part", required(assigned[0], name, "part")?)?;
                let part = match part.as_str() {
                    "year" => DatePart::Year,
                    "month" => DatePart::Month,
                    "day" => DatePart::Day,
                    other => {
                        return Err(Error::analyze(format!("unknown date part '{}'", other)));
                    }
                };
                Ok(scalar(Expression::Extract { input: Box::new(value), part }))
            }
            Builtin::Case => self.analyze_case(scope, assigned),
            Builtin::Filter => {
                let (op, binding) = table_base(name, base)?;
                let condition_scope = binding.with_parent(scope);
                let (condition, _) = self.scalar_argument(
                    &condition_scope,
                    name,
                    "condition",
                    required(assigned[0], name, "condition")?,
                )?;
                if condition.result_type().kind() != TypeKind::Bool {
                    return Err(Error::analyze("'filter' requires a boolean filter condition"));
                }
                Ok(ExpressionResult::Table {
                    op: Operator::Select { input: Box::new(op), condition },
                    binding,
                })
            }
            Builtin::Join => self.analyze_join(scope, base, assigned),
            Builtin::GroupBy => self.analyze_group_by(scope, base, assigned),
            Builtin::Aggregate => self.analyze_aggregate(scope, base, assigned),
            Builtin::Distinct => self.analyze_distinct(scope, base),
            Builtin::OrderBy => self.analyze_order_by(scope, base, assigned),
            Builtin::Map => self.analyze_map(scope, base, assigned, false),
            Builtin::Project => self.analyze_map(scope, base, assigned, true),
            Builtin::ProjectOut => self.analyze_project_out(scope, base, assigned),
            Builtin::Union | Builtin::Except | Builtin::Intersect => {
                self.analyze_set_operation(scope, sig.builtin, base, assigned)
            }
            Builtin::Window => self.analyze_window(scope, base, assigned),
            Builtin::As => {
                let (op, binding) = table_base(name, base)?;
                let target =
                    self.symbol_argument(scope, name, "name", required(assigned[0], name, "name")?)?;
                let mut renamed = (*binding).clone();
                renamed.replace_scopes(&target);
                Ok(ExpressionResult::Table { op, binding: Rc::new(renamed) })
            }
            Builtin::Alias => {
                let (op, binding) = table_base(name, base)?;
                let target =
                    self.symbol_argument(scope, name, "name", required(assigned[0], name, "name")?)?;
                let mut aliased = (*binding).clone();
                let columns = aliased.columns().iter().map(|c| c.iu).collect();
                aliased.add_alias(&target, columns);
                Ok(ExpressionResult::Table { op, binding: Rc::new(aliased) })
            }
            Builtin::AggCount
            | Builtin::AggSum
            | Builtin::AggAvg
            | Builtin::AggMin
            | Builtin::AggMax => self.handle_aggregate(scope, name, sig.builtin, assigned),
            Builtin::WindowRowNumber
            | Builtin::WindowRank
            | Builtin::WindowDenseRank
            | Builtin::WindowNTile
            | Builtin::WindowLead
            | Builtin::WindowLag
            | Builtin::WindowFirstValue
            | Builtin::WindowLastValue => {
                self.handle_window_function(scope, name, sig.builtin, assigned)
            }
            Builtin::Gensym => {
                Err(Error::analyze("'gensym' can only be used where a symbol is expected"))
            }
            Builtin::ForeignCall => self.analyze_foreign_call(scope, assigned),
            Builtin::Table => self.analyze_table_construction(scope, name, &[]),
            Builtin::Defun => Err(Error::NotImplemented("defun")),
        }
    }

    /// Analyze a join computation
    fn analyze_join(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let (left_op, left_binding) = table_base("join", base)?;

        // Analyze the join type
        let mut join_type = JoinType::Inner;
        let mut left_only = false;
        let mut right_only = false;
        if let Some(arg) = assigned[2] {
            let jt = self.symbol_argument(scope, "join", "type", arg)?;
            match jt.as_str() {
                "inner" => {}
                "left" | "leftouter" => join_type = JoinType::LeftOuter,
                "right" | "rightouter" => join_type = JoinType::RightOuter,
                "full" | "fullouter" => join_type = JoinType::FullOuter,
                "leftsemi" | "exists" => {
                    join_type = JoinType::LeftSemi;
                    left_only = true;
                }
                "rightsemi" => {
                    join_type = JoinType::RightSemi;
                    right_only = true;
                }
                "leftanti" | "notexists" => {
                    join_type = JoinType::LeftAnti;
                    left_only = true;
                }
                "rightanti" => {
                    join_type = JoinType::RightAnti;
                    right_only = true;
                }
                other => {
                    return Err(Error::analyze(format!("unknown join type '{}'", other)));
                }
            }
        }

        // Analyze the other table in a scope of its own
        let other_scope = self.fresh_scope(scope);
        let (right_op, right_binding) =
            self.table_argument(&other_scope, "join", "table", required(assigned[0], "join", "table")?)?;

        // The join condition sees both sides
        let mut joined = (*left_binding).clone();
        joined.set_parent(scope);
        joined.join(&right_binding);
        let joined = Rc::new(joined);
        let (condition, _) =
            self.scalar_argument(&joined, "join", "on", required(assigned[1], "join", "on")?)?;
        if condition.result_type().kind() != TypeKind::Bool {
            return Err(Error::analyze("join condition must be a boolean"));
        }

        // Fix the result scope
        let binding = if left_only {
            left_binding
        } else if right_only {
            right_binding
        } else {
            joined
        };
        Ok(ExpressionResult::Table {
            op: Operator::Join {
                left: Box::new(left_op),
                right: Box::new(right_op),
                condition,
                join_type,
            },
            binding,
        })
    }

    /// Analyze a groupby computation
    fn analyze_group_by(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let (op, input_binding) = table_base("groupby", base)?;
        let input_scope = input_binding.with_parent(scope);

        let mut result_binding = BindingInfo::default();
        result_binding.set_parent(scope);
        let scope_name = result_binding.add_scope("groupby").then_some("groupby");

        // Analyze the groups
        let mut group_by = Vec::new();
        if let Some(arg) = assigned[0] {
            for entry in self.expression_list_argument(&input_scope, arg)? {
                let (expression, _) =
                    require_scalar(entry.value, "groupby requires scalar groups")?;
                let iu = self.make_iu(expression.result_type());
                group_by.push((expression, iu));
                let name = if entry.name.is_empty() {
                    (result_binding.scope_size("groupby") + 1).to_string()
                } else {
                    entry.name
                };
                result_binding.add_binding(scope_name, &name, iu);
            }
        }

        // Analyze the aggregates
        let mut aggregates = Vec::new();
        let mut computations = Vec::new();
        if let Some(arg) = assigned[1] {
            let gbs = Rc::new(GroupByScope {
                pre_aggregation: input_scope.clone(),
                aggregations: RefCell::new(Vec::new()),
                is_window: false,
            });
            let aggregate_scope = Rc::new(result_binding.clone()).with_group_by(gbs.clone());
            for entry in self.expression_list_argument(&aggregate_scope, arg)? {
                let (expression, _) =
                    require_scalar(entry.value, "groupby requires scalar aggregates")?;
                let name = if entry.name.is_empty() {
                    (result_binding.scope_size("groupby") + 1).to_string()
                } else {
                    entry.name
                };
                // A plain aggregate reference needs no extra computation
                if let Some(iu) = expression.as_iu_ref() {
                    result_binding.add_binding(scope_name, &name, iu);
                } else {
                    let iu = self.make_iu(expression.result_type());
                    computations.push((expression, iu));
                    result_binding.add_binding(scope_name, &name, iu);
                }
            }
            aggregates = gbs.aggregations.take();
        }

        if assigned[2].is_some() || assigned[3].is_some() {
            return Err(Error::NotImplemented("grouping sets"));
        }

        let mut tree = Operator::GroupBy { input: Box::new(op), group_by, aggregates };
        if !computations.is_empty() {
            tree = Operator::Map { input: Box::new(tree), computations };
        }
        Ok(ExpressionResult::Table { op: tree, binding: Rc::new(result_binding) })
    }

    /// Analyze an aggregate computation, producing a scalar
    fn analyze_aggregate(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let (op, input_binding) = table_base("aggregate", base)?;
        let input_scope = input_binding.with_parent(scope);
        let gbs = Rc::new(GroupByScope {
            pre_aggregation: input_scope,
            aggregations: RefCell::new(Vec::new()),
            is_window: false,
        });
        let post_scope = self.fresh_scope(scope).with_group_by(gbs.clone());
        let (computation, _) = self.scalar_argument(
            &post_scope,
            "aggregate",
            "aggregate",
            required(assigned[0], "aggregate", "aggregate")?,
        )?;
        let aggregates = gbs.aggregations.take();
        Ok(scalar(Expression::Aggregate {
            input: Box::new(op),
            aggregates,
            computation: Box::new(computation),
        }))
    }

    /// Analyze a distinct computation: a group by over every column
    fn analyze_distinct(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
    ) -> Result<ExpressionResult<'a>> {
        let (op, input_binding) = table_base("distinct", base)?;
        let mut result_binding = BindingInfo::default();
        result_binding.set_parent(scope);
        result_binding.add_scope("distinct");
        let mut group_by = Vec::new();
        for column in input_binding.columns() {
            let iu = self.make_iu(column.iu.ty);
            group_by.push((Expression::IuRef { iu: column.iu }, iu));
            result_binding.add_binding(Some("distinct"), &column.name, iu);
        }
        Ok(ExpressionResult::Table {
            op: Operator::GroupBy { input: Box::new(op), group_by, aggregates: Vec::new() },
            binding: Rc::new(result_binding),
        })
    }

    /// Analyze an orderby computation
    fn analyze_order_by(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let (op, binding) = table_base("orderby", base)?;
        let input_scope = binding.with_parent(scope);
        let mut order = Vec::new();
        if let Some(arg) = assigned[0] {
            for entry in self.expression_list_argument(&input_scope, arg)? {
                let (expression, ordering) =
                    require_scalar(entry.value, "orderby requires scalar order values")?;
                order.push(SortEntry {
                    value: expression,
                    collate: ordering.collate,
                    descending: ordering.descending,
                });
            }
        }
        let limit = assigned[1].map(|arg| self.integer_constant("limit", arg)).transpose()?;
        let offset = assigned[2].map(|arg| self.integer_constant("offset", arg)).transpose()?;
        Ok(ExpressionResult::Table {
            op: Operator::Sort { input: Box::new(op), order, limit, offset },
            binding,
        })
    }

    /// Analyze a map or project computation
    fn analyze_map(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
        project: bool,
    ) -> Result<ExpressionResult<'a>> {
        let name = if project { "project" } else { "map" };
        let (op, input_binding) = table_base(name, base)?;
        let input_scope = input_binding.with_parent(scope);
        let entries =
            self.expression_list_argument(&input_scope, required(assigned[0], name, "expressions")?)?;

        let mut result_binding = if project {
            BindingInfo::default()
        } else {
            (*input_binding).clone()
        };
        result_binding.set_parent(scope);
        let scope_name = result_binding.add_scope(name).then_some(name);

        let mut computations = Vec::new();
        for entry in entries {
            let (expression, _) =
                require_scalar(entry.value, format!("{} requires scalar values", name))?;
            let entry_name = if entry.name.is_empty() {
                (result_binding.scope_size(name) + 1).to_string()
            } else {
                entry.name
            };
            // A plain column reference needs no new IU
            if let Some(iu) = expression.as_iu_ref() {
                result_binding.add_binding(scope_name, &entry_name, iu);
            } else {
                let iu = self.make_iu(expression.result_type());
                computations.push((expression, iu));
                result_binding.add_binding(scope_name, &entry_name, iu);
            }
        }

        let tree = if computations.is_empty() {
            op
        } else {
            match op {
                // Project promises to preserve the sort order, so the map
                // goes below the sort
                Operator::Sort { input, order, limit, offset } if project => Operator::Sort {
                    input: Box::new(Operator::Map { input, computations }),
                    order,
                    limit,
                    offset,
                },
                other => Operator::Map { input: Box::new(other), computations },
            }
        };
        Ok(ExpressionResult::Table { op: tree, binding: Rc::new(result_binding) })
    }

    /// Analyze a projectout computation: drop columns from the binding
    fn analyze_project_out(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let (op, input_binding) = table_base("projectout", base)?;
        let input_scope = input_binding.with_parent(scope);
        let entries = self
            .expression_list_argument(&input_scope, required(assigned[0], "projectout", "columns")?)?;
        let mut remove = Vec::new();
        for entry in entries {
            let (expression, _) =
                require_scalar(entry.value, "projectout requires column references")?;
            let iu = expression
                .as_iu_ref()
                .filter(|iu| input_binding.column_name(*iu).is_some())
                .ok_or_else(|| Error::analyze("projectout requires column references"))?;
            remove.push(iu);
        }
        let mut result_binding = (*input_binding).clone();
        result_binding.set_parent(scope);
        result_binding.remove_columns(&remove);
        Ok(ExpressionResult::Table { op, binding: Rc::new(result_binding) })
    }

    /// Analyze a set operation
    fn analyze_set_operation(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        builtin: Builtin,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let name = match builtin {
            Builtin::Union => "union",
            Builtin::Except => "except",
            _ => "intersect",
        };
        let (left_op, left_binding) = table_base(name, base)?;
        let all = match assigned[1] {
            Some(arg) => self.const_bool_argument(name, "all", arg)?,
            None => false,
        };
        let op = match (builtin, all) {
            (Builtin::Union, false) => SetOperationKind::Union,
            (Builtin::Union, true) => SetOperationKind::UnionAll,
            (Builtin::Except, false) => SetOperationKind::Except,
            (Builtin::Except, true) => SetOperationKind::ExceptAll,
            (_, false) => SetOperationKind::Intersect,
            (_, true) => SetOperationKind::IntersectAll,
        };
        let other_scope = self.fresh_scope(scope);
        let (right_op, right_binding) =
            self.table_argument(&other_scope, name, "table", required(assigned[0], name, "table")?)?;

        if left_binding.columns().len() != right_binding.columns().len() {
            return Err(Error::analyze(format!(
                "'{}' requires inputs with the same number of columns",
                name
            )));
        }
        let mut result_binding = BindingInfo::default();
        result_binding.set_parent(scope);
        let scope_name = result_binding.add_scope(name).then_some(name);
        let mut left_columns = Vec::new();
        let mut right_columns = Vec::new();
        let mut result_columns = Vec::new();
        for (index, (l, r)) in left_binding
            .columns()
            .iter()
            .zip(right_binding.columns())
            .enumerate()
        {
            if l.iu.ty.with_nullable(false) != r.iu.ty.with_nullable(false) {
                return Err(Error::analyze(format!(
                    "'{}' column {} has mismatching types '{}' and '{}'",
                    name,
                    index + 1,
                    l.iu.ty.name(),
                    r.iu.ty.name()
                )));
            }
            let nullable = l.iu.ty.is_nullable() || r.iu.ty.is_nullable();
            let iu = self.make_iu(l.iu.ty.with_nullable(nullable));
            left_columns.push(Expression::IuRef { iu: l.iu });
            right_columns.push(Expression::IuRef { iu: r.iu });
            result_columns.push(iu);
            result_binding.add_binding(scope_name, &l.name, iu);
        }
        Ok(ExpressionResult::Table {
            op: Operator::SetOperation {
                left: Box::new(left_op),
                right: Box::new(right_op),
                left_columns,
                right_columns,
                result_columns,
                op,
            },
            binding: Rc::new(result_binding),
        })
    }

    /// Analyze a window computation
    fn analyze_window(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        base: Option<ExpressionResult<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        if assigned[3].is_some() || assigned[4].is_some() || assigned[5].is_some() {
            return Err(Error::NotImplemented("frames"));
        }
        let (op, input_binding) = table_base("window", base)?;
        let input_scope = input_binding.with_parent(scope);

        let mut partition_by = Vec::new();
        if let Some(arg) = assigned[1] {
            for entry in self.expression_list_argument(&input_scope, arg)? {
                let (expression, _) =
                    require_scalar(entry.value, "window requires scalar partition values")?;
                partition_by.push(expression);
            }
        }
        let mut order_by = Vec::new();
        if let Some(arg) = assigned[2] {
            for entry in self.expression_list_argument(&input_scope, arg)? {
                let (expression, ordering) =
                    require_scalar(entry.value, "window requires scalar order values")?;
                order_by.push(SortEntry {
                    value: expression,
                    collate: ordering.collate,
                    descending: ordering.descending,
                });
            }
        }

        let mut result_binding = (*input_binding).clone();
        result_binding.set_parent(scope);
        let scope_name = result_binding.add_scope("window").then_some("window");
        let gbs = Rc::new(GroupByScope {
            pre_aggregation: input_scope,
            aggregations: RefCell::new(Vec::new()),
            is_window: true,
        });
        let window_scope = Rc::new(result_binding.clone()).with_group_by(gbs.clone());
        let mut computations = Vec::new();
        for entry in self
            .expression_list_argument(&window_scope, required(assigned[0], "window", "expressions")?)?
        {
            let (expression, _) = require_scalar(entry.value, "window requires scalar values")?;
            let name = if entry.name.is_empty() {
                (result_binding.scope_size("window") + 1).to_string()
            } else {
                entry.name
            };
            if let Some(iu) = expression.as_iu_ref() {
                result_binding.add_binding(scope_name, &name, iu);
            } else {
                let iu = self.make_iu(expression.result_type());
                computations.push((expression, iu));
                result_binding.add_binding(scope_name, &name, iu);
            }
        }
        let aggregates = gbs.aggregations.take();
        let mut tree = Operator::Window {
            input: Box::new(op),
            aggregates,
            partition_by,
            order_by,
        };
        if !computations.is_empty() {
            tree = Operator::Map { input: Box::new(tree), computations };
        }
        Ok(ExpressionResult::Table { op: tree, binding: Rc::new(result_binding) })
    }

    /// Handle an aggregate function inside a group by or window scope
    fn handle_aggregate(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
        builtin: Builtin,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let Some(gbs) = scope.group_by_scope().cloned() else {
            return Err(Error::analyze(format!(
                "aggregate '{}' can only be used in group by computations",
                name
            )));
        };
        let distinct = match assigned.get(1).copied().flatten() {
            Some(arg) => self.const_bool_argument(name, "distinct", arg)?,
            None => false,
        };
        let (value, op, result_type) = match builtin {
            Builtin::AggCount => match assigned[0] {
                Some(arg) => {
                    let (value, _) =
                        self.scalar_argument(&gbs.pre_aggregation, name, "value", arg)?;
                    let op = if distinct { AggregateOp::CountDistinct } else { AggregateOp::Count };
                    (Some(value), op, Type::integer())
                }
                None if distinct => {
                    return Err(Error::analyze("'count' requires a value for distinct"));
                }
                None => (None, AggregateOp::CountStar, Type::integer()),
            },
            Builtin::AggSum | Builtin::AggAvg => {
                let (value, _) = self.scalar_argument(
                    &gbs.pre_aggregation,
                    name,
                    "value",
                    required(assigned[0], name, "value")?,
                )?;
                if !value.result_type().is_numeric() {
                    return Err(Error::analyze(format!(
                        "aggregate '{}' requires a numerical argument",
                        name
                    )));
                }
                let op = match (builtin, distinct) {
                    (Builtin::AggSum, false) => AggregateOp::Sum,
                    (Builtin::AggSum, true) => AggregateOp::SumDistinct,
                    (_, false) => AggregateOp::Avg,
                    (_, true) => AggregateOp::AvgDistinct,
                };
                let ty = value.result_type();
                (Some(value), op, ty)
            }
            Builtin::AggMin | Builtin::AggMax => {
                let (value, _) = self.scalar_argument(
                    &gbs.pre_aggregation,
                    name,
                    "value",
                    required(assigned[0], name, "value")?,
                )?;
                let op = if builtin == Builtin::AggMin { AggregateOp::Min } else { AggregateOp::Max };
                let ty = value.result_type();
                (Some(value), op, ty)
            }
            _ => return Err(Error::analyze(format!("invalid aggregate '{}'", name))),
        };
        let iu = self.make_iu(result_type);
        gbs.aggregations.borrow_mut().push(Aggregation {
            value,
            iu,
            op: WindowOp::Aggregate(op),
            parameters: Vec::new(),
        });
        Ok(scalar(Expression::IuRef { iu }))
    }

    /// Handle a window function inside a window scope
    fn handle_window_function(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
        builtin: Builtin,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let Some(gbs) = scope.group_by_scope().cloned() else {
            return Err(Error::analyze(format!(
                "window function '{}' can only be used in window computations",
                name
            )));
        };
        if !gbs.is_window {
            return Err(Error::analyze(format!(
                "window function '{}' can only be used in window computations",
                name
            )));
        }
        let pre = &gbs.pre_aggregation;
        let (value, op, parameters, result_type) = match builtin {
            Builtin::WindowRowNumber => {
                (None, WindowOp::RowNumber, Vec::new(), Type::integer())
            }
            Builtin::WindowRank | Builtin::WindowDenseRank => {
                let (value, _) = self.scalar_argument(
                    pre,
                    name,
                    "value",
                    required(assigned[0], name, "value")?,
                )?;
                let op = if builtin == Builtin::WindowRank {
                    WindowOp::Rank
                } else {
                    WindowOp::DenseRank
                };
                (Some(value), op, Vec::new(), Type::integer())
            }
            Builtin::WindowNTile => {
                let (n, _) =
                    self.scalar_argument(pre, name, "n", required(assigned[0], name, "n")?)?;
                if n.result_type().kind() != TypeKind::Integer {
                    return Err(Error::analyze("'ntile' requires an integer argument"));
                }
                (None, WindowOp::NTile, vec![n], Type::integer())
            }
            Builtin::WindowLead | Builtin::WindowLag => {
                let (value, _) = self.scalar_argument(
                    pre,
                    name,
                    "value",
                    required(assigned[0], name, "value")?,
                )?;
                let mut parameters = Vec::new();
                let offset = match assigned[1] {
                    Some(arg) => {
                        let (offset, _) = self.scalar_argument(pre, name, "offset", arg)?;
                        if offset.result_type().kind() != TypeKind::Integer {
                            return Err(Error::analyze(format!(
                                "'{}' requires an integer offset",
                                name
                            )));
                        }
                        Some(offset)
                    }
                    None => None,
                };
                let default = match assigned[2] {
                    Some(arg) => Some(self.scalar_argument(pre, name, "default", arg)?.0),
                    None => None,
                };
                let mut result_type = value.result_type();
                let (value, default) = match default {
                    Some(default) => {
                        let (value, default) = self.enforce_comparable(value, default)?;
                        result_type = value
                            .result_type()
                            .with_nullable(
                                value.result_type().is_nullable()
                                    || default.result_type().is_nullable(),
                            );
                        (value, Some(default))
                    }
                    None => {
                        result_type = result_type.as_nullable();
                        (value, None)
                    }
                };
                if default.is_some() || offset.is_some() {
                    parameters.push(match offset {
                        Some(offset) => offset,
                        None => Expression::Const {
                            value: "1".into(),
                            ty: Type::integer(),
                            null: false,
                        },
                    });
                }
                if let Some(default) = default {
                    parameters.push(default);
                }
                let op = if builtin == Builtin::WindowLead { WindowOp::Lead } else { WindowOp::Lag };
                (Some(value), op, parameters, result_type)
            }
            Builtin::WindowFirstValue | Builtin::WindowLastValue => {
                let (value, _) = self.scalar_argument(
                    pre,
                    name,
                    "value",
                    required(assigned[0], name, "value")?,
                )?;
                let op = if builtin == Builtin::WindowFirstValue {
                    WindowOp::FirstValue
                } else {
                    WindowOp::LastValue
                };
                let ty = value.result_type();
                (Some(value), op, Vec::new(), ty)
            }
            _ => return Err(Error::analyze(format!("invalid window function '{}'", name))),
        };
        let iu = self.make_iu(result_type);
        gbs.aggregations.borrow_mut().push(Aggregation { value, iu, op, parameters });
        Ok(scalar(Expression::IuRef { iu }))
    }

    /// Analyze a case computation
    fn analyze_case(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let cases_arg = required(assigned[0], "case", "cases")?;
        let ast::ArgValue::List(entries) = &cases_arg.value else {
            return Err(Error::analyze("'case' requires a list of cases"));
        };

        // The optional search value turns this into a simple case
        let search = match assigned[2] {
            Some(arg) => Some(self.scalar_argument(scope, "case", "search", arg)?.0),
            None => None,
        };

        let mut cases = Vec::new();
        for entry in entries {
            let ast::ArgValue::Case { condition, result } = &entry.value else {
                return Err(Error::analyze("'case' requires case pairs"));
            };
            let (condition, _) = require_scalar(
                self.analyze_expression(scope, condition)?,
                "'case' requires scalar conditions",
            )?;
            let (result, _) = require_scalar(
                self.analyze_expression(scope, result)?,
                "'case' requires scalar results",
            )?;
            cases.push((condition, result));
        }
        let default = match assigned[1] {
            Some(arg) => Some(self.scalar_argument(scope, "case", "else", arg)?.0),
            None => None,
        };

        // Check the conditions
        let search = match search {
            Some(mut search) => {
                for (condition, _) in &mut cases {
                    let (new_search, new_condition) =
                        self.enforce_comparable(search, std::mem::replace(condition, Expression::Const {
                            value: String::new(),
                            ty: Type::unknown().as_nullable(),
                            null: true,
                        }))?;
                    search = new_search;
                    *condition = new_condition;
                }
                Some(search)
            }
            None => {
                for (condition, _) in &mut cases {
                    if condition.result_type().kind() == TypeKind::Unknown {
                        let inner = std::mem::replace(condition, Expression::Const {
                            value: String::new(),
                            ty: Type::unknown().as_nullable(),
                            null: true,
                        });
                        *condition = cast_to(inner, Type::bool().as_nullable());
                    }
                    if condition.result_type().kind() != TypeKind::Bool {
                        return Err(Error::analyze("'case' requires boolean conditions"));
                    }
                }
                None
            }
        };

        // Unify the result types: the first typed branch wins, every other
        // branch is cast to it
        let mut common: Option<Type> = None;
        for t in cases
            .iter()
            .map(|(_, r)| r.result_type())
            .chain(default.iter().map(|d| d.result_type()))
        {
            if common.is_none() && t.kind() != TypeKind::Unknown {
                common = Some(t);
            }
        }
        let common = common.unwrap_or(Type::unknown().as_nullable());
        let fix = |e: Expression| {
            if e.result_type().kind() != common.kind() {
                let nullable = e.result_type().is_nullable();
                cast_to(e, common.with_nullable(nullable))
            } else {
                e
            }
        };
        let cases: Vec<_> = cases.into_iter().map(|(c, r)| (c, fix(r))).collect();
        let default = match default {
            Some(default) => fix(default),
            None => Expression::Const {
                value: String::new(),
                ty: common.as_nullable(),
                null: true,
            },
        };

        let expression = match search {
            Some(value) => Expression::SimpleCase {
                value: Box::new(value),
                cases,
                default: Box::new(default),
            },
            None => Expression::SearchedCase { cases, default: Box::new(default) },
        };
        Ok(scalar(expression))
    }

    /// Analyze a table construction expression
    fn analyze_table_construction(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
        args: &'a [ast::FuncArg],
    ) -> Result<ExpressionResult<'a>> {
        if args.is_empty() {
            return Err(Error::analyze(format!(
                "parameter 'values' missing in call to '{}'",
                name
            )));
        }

        // The first row fixes the column names
        let mut column_names = Vec::new();
        let ast::ArgValue::List(first_row) = &args[0].value else {
            return Err(Error::analyze("'table' requires a tuple list"));
        };
        for entry in first_row {
            match &entry.name {
                Some(name) => column_names.push(internal_name(name)),
                None => column_names.push((column_names.len() + 1).to_string()),
            }
        }

        // Collect the values
        let column_count = column_names.len();
        let mut values = Vec::new();
        let mut column_types = vec![Type::unknown(); column_count];
        let mut row_count = 0usize;
        for row in args {
            if row.name.is_some() {
                return Err(Error::analyze("'table' requires a tuple list"));
            }
            let ast::ArgValue::List(entries) = &row.value else {
                return Err(Error::analyze("'table' requires a tuple list"));
            };
            let mut count = 0usize;
            for entry in entries {
                let Some(expr) = entry.value.as_expr() else {
                    return Err(Error::analyze("'table' requires a tuple list"));
                };
                let value = self.analyze_expression(scope, expr)?;
                let (value, _) =
                    require_scalar(value, "inline tables require scalar values")?;
                if count >= column_count {
                    return Err(Error::analyze("too many column values in inline table"));
                }
                if row_count == 0 {
                    column_types[count] = value.result_type();
                } else if column_types[count].kind() == TypeKind::Unknown {
                    column_types[count] = value.result_type().as_nullable();
                } else if value.result_type().kind() == TypeKind::Unknown {
                    // A later NULL widens the column to nullable
                    column_types[count] = column_types[count].as_nullable();
                }
                values.push(value);
                count += 1;
            }
            if count < column_count {
                return Err(Error::analyze("too few column values in inline table"));
            }
            row_count += 1;
        }

        // Add casts where a value's type differs from its column's
        for row in 0..row_count {
            for column in 0..column_count {
                let value = &mut values[row * column_count + column];
                if value.result_type().kind() != column_types[column].kind() {
                    let nullable = value.result_type().is_nullable();
                    let inner = std::mem::replace(value, Expression::Const {
                        value: String::new(),
                        ty: Type::unknown().as_nullable(),
                        null: true,
                    });
                    *value = cast_to(inner, column_types[column].with_nullable(nullable));
                }
            }
        }

        // Construct the columns
        let mut binding = BindingInfo::default();
        binding.set_parent(scope);
        binding.add_scope("table");
        let mut columns = Vec::new();
        for (index, column_name) in column_names.iter().enumerate() {
            let iu = self.make_iu(column_types[index]);
            columns.push(iu);
            binding.add_binding(Some("table"), column_name, iu);
        }
        Ok(ExpressionResult::Table {
            op: Operator::InlineTable { columns, values, row_count },
            binding: Rc::new(binding),
        })
    }

    /// Analyze a foreigncall expression
    fn analyze_foreign_call(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        assigned: &[Option<&'a ast::FuncArg>],
    ) -> Result<ExpressionResult<'a>> {
        let call_name = self.const_string_argument(
            "foreigncall",
            "name",
            required(assigned[0], "foreigncall", "name")?,
        )?;
        let returns = self.symbol_argument(
            scope,
            "foreigncall",
            "returns",
            required(assigned[1], "foreigncall", "returns")?,
        )?;
        let ty = self.parse_simple_type_name(&returns)?;
        let mut arguments = Vec::new();
        if let Some(arg) = assigned[2] {
            for entry in self.expression_list_argument(scope, arg)? {
                let (value, _) =
                    require_scalar(entry.value, "'foreigncall' requires scalar arguments")?;
                arguments.push(value);
            }
        }
        let call_type = match assigned[3] {
            None => CallType::Function,
            Some(arg) => {
                let symbol = self.symbol_argument(scope, "foreigncall", "type", arg)?;
                match symbol.as_str() {
                    "function" => CallType::Function,
                    "operator" | "leftassoc" => CallType::LeftAssocOperator,
                    "rightassoc" => CallType::RightAssocOperator,
                    other => {
                        return Err(Error::analyze(format!("unknown call type '{}'", other)));
                    }
                }
            }
        };
        if call_type != CallType::Function && arguments.len() < 2 {
            return Err(Error::analyze(
                "operator foreign calls require at least two arguments",
            ));
        }
        Ok(scalar(Expression::ForeignCall { name: call_name, ty, arguments, call_type }))
    }

    /// Expand a call to a user defined let
    fn expand_let(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        name: &str,
        index: usize,
        args: &'a [ast::FuncArg],
    ) -> Result<ExpressionResult<'a>> {
        let formals = self.lets[index].arguments.clone();
        let defaults = self.lets[index].defaults.clone();
        let body = self.lets[index].body;
        let assigned = assign_arguments(name, &formals, args)?;

        let mut child = BindingInfo::default();
        child.set_parent(scope);
        for (slot, formal) in formals.iter().enumerate() {
            match formal.category {
                TypeCategory::Scalar | TypeCategory::Table | TypeCategory::Expression => {
                    let ast = match assigned[slot] {
                        Some(arg) => arg.value.as_expr().ok_or_else(|| {
                            Error::analyze(format!(
                                "parameter '{}' requires a value in call to '{}'",
                                formal.name, name
                            ))
                        })?,
                        None => defaults[slot].ok_or_else(|| {
                            Error::analyze(format!(
                                "parameter '{}' missing in call to '{}'",
                                formal.name, name
                            ))
                        })?,
                    };
                    child.register_argument(&formal.name, ArgumentInfo::Value {
                        ast,
                        scope: scope.clone(),
                        let_scope_limit: self.let_scope_limit,
                    });
                }
                TypeCategory::Symbol => {
                    let symbol = match assigned[slot] {
                        Some(arg) => self.symbol_argument(scope, name, &formal.name, arg)?,
                        None => {
                            let ast = defaults[slot].ok_or_else(|| {
                                Error::analyze(format!(
                                    "parameter '{}' missing in call to '{}'",
                                    formal.name, name
                                ))
                            })?;
                            self.expression_symbol(scope, name, &formal.name, ast)?
                        }
                    };
                    child.register_argument(&formal.name, ArgumentInfo::Symbol(symbol));
                }
                TypeCategory::ExpressionList => {
                    return Err(Error::NotImplemented("complex let argument types"));
                }
            }
        }

        let child = Rc::new(child);
        let old = std::mem::replace(&mut self.let_scope_limit, index);
        let result = self.analyze_expression(&child, body);
        self.let_scope_limit = old;
        result
    }

    /// A fresh scope that only chains to the given parent
    fn fresh_scope(&self, parent: &Rc<BindingInfo<'a>>) -> Rc<BindingInfo<'a>> {
        let mut binding = BindingInfo::default();
        binding.set_parent(parent);
        Rc::new(binding)
    }

    /// Handle a scalar argument
    fn scalar_argument(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        func: &str,
        arg_name: &str,
        arg: &'a ast::FuncArg,
    ) -> Result<(Expression, OrderingInfo)> {
        let message =
            format!("parameter '{}' requires a scalar in call to '{}'", arg_name, func);
        let Some(expr) = arg.value.as_expr() else {
            return Err(Error::analyze(message));
        };
        let result = self.analyze_expression(scope, expr)?;
        require_scalar(result, message)
    }

    /// Handle a table argument
    fn table_argument(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        func: &str,
        arg_name: &str,
        arg: &'a ast::FuncArg,
    ) -> Result<(Operator, Rc<BindingInfo<'a>>)> {
        let message =
            format!("parameter '{}' requires a table in call to '{}'", arg_name, func);
        let Some(expr) = arg.value.as_expr() else {
            return Err(Error::analyze(message));
        };
        let result = self.analyze_expression(scope, expr)?;
        require_table(result, message)
    }

    /// Handle a symbol argument, resolving captured symbols and gensym
    fn symbol_argument(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        func: &str,
        arg_name: &str,
        arg: &'a ast::FuncArg,
    ) -> Result<String> {
        let Some(expr) = arg.value.as_expr() else {
            return Err(Error::analyze(format!(
                "parameter '{}' requires a symbol in call to '{}'",
                arg_name, func
            )));
        };
        self.expression_symbol(scope, func, arg_name, expr)
    }

    /// Resolve an expression in symbol position
    fn expression_symbol(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        func: &str,
        arg_name: &str,
        expr: &'a ast::Expr,
    ) -> Result<String> {
        // Recognize gensym calls
        if let ast::Expr::Call { func: callee, args } = expr
            && callee.as_token() == Some("gensym")
        {
            return self.gensym_symbol(args);
        }
        if let Some(token) = expr.as_token() {
            let name = internal_name(token);
            if let Some(ArgumentInfo::Symbol(symbol)) = scope.find_argument(&name) {
                return Ok(symbol.clone());
            }
            return Ok(name);
        }
        Err(Error::analyze(format!(
            "parameter '{}' requires a symbol in call to '{}'",
            arg_name, func
        )))
    }

    /// Generate a fresh symbol. The leading space is a reserved prefix that
    /// user identifiers can never produce.
    fn gensym_symbol(&mut self, args: &'a [ast::FuncArg]) -> Result<String> {
        let name = match args {
            [] => "sym".to_string(),
            [arg] => match arg.value.as_expr() {
                Some(ast::Expr::Literal(ast::Literal::String(s))) => s.clone(),
                Some(ast::Expr::Token(t)) => t.clone(),
                _ => return Err(Error::analyze("'gensym' requires a constant name")),
            },
            _ => return Err(Error::analyze("too many parameters in call to 'gensym'")),
        };
        let id = self.next_symbol_id;
        self.next_symbol_id += 1;
        Ok(format!(" {} {}", name, id))
    }

    /// Handle a constant boolean argument
    fn const_bool_argument(
        &self,
        func: &str,
        arg_name: &str,
        arg: &'a ast::FuncArg,
    ) -> Result<bool> {
        match arg.value.as_expr() {
            Some(ast::Expr::Literal(ast::Literal::True)) => Ok(true),
            Some(ast::Expr::Literal(ast::Literal::False)) => Ok(false),
            _ => Err(Error::analyze(format!(
                "parameter '{}' requires a constant boolean in call to '{}'",
                arg_name, func
            ))),
        }
    }

    /// Handle a constant string argument
    fn const_string_argument(
        &self,
        func: &str,
        arg_name: &str,
        arg: &'a ast::FuncArg,
    ) -> Result<String> {
        match arg.value.as_expr() {
            Some(ast::Expr::Literal(ast::Literal::String(value))) => Ok(value.clone()),
            _ => Err(Error::analyze(format!(
                "parameter '{}' requires a constant string in call to '{}'",
                arg_name, func
            ))),
        }
    }

    /// Handle an integer constant argument (limit and offset)
    fn integer_constant(&self, name: &str, arg: &'a ast::FuncArg) -> Result<u64> {
        let message = format!("'{}' requires an integer constant", name);
        match arg.value.as_expr() {
            Some(ast::Expr::Literal(ast::Literal::Integer(value))) => {
                value.parse().map_err(|_| Error::analyze(message))
            }
            _ => Err(Error::analyze(message)),
        }
    }

    /// Handle an expression list argument. Single expressions are accepted
    /// as one element lists; aliases expand in place.
    fn expression_list_argument(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        arg: &'a ast::FuncArg,
    ) -> Result<Vec<ExpressionArg<'a>>> {
        match &arg.value {
            ast::ArgValue::Expr(expr) => {
                if let Some(expanded) = self.try_expand_alias(scope, expr)? {
                    return Ok(expanded);
                }
                Ok(vec![ExpressionArg {
                    name: infer_name(expr),
                    value: self.analyze_expression(scope, expr)?,
                }])
            }
            ast::ArgValue::List(entries) => {
                let mut result = Vec::new();
                for entry in entries {
                    let ast::ArgValue::Expr(expr) = &entry.value else {
                        return Err(Error::analyze("nested expression list not allowed here"));
                    };
                    if entry.name.is_none()
                        && let Some(mut expanded) = self.try_expand_alias(scope, expr)?
                    {
                        result.append(&mut expanded);
                        continue;
                    }
                    let name = match &entry.name {
                        Some(name) => internal_name(name),
                        None => infer_name(expr),
                    };
                    result.push(ExpressionArg {
                        name,
                        value: self.analyze_expression(scope, expr)?,
                    });
                }
                Ok(result)
            }
            ast::ArgValue::Case { .. } => {
                Err(Error::analyze("nested expression list not allowed here"))
            }
        }
    }

    /// Expand a token naming an alias into its column references
    fn try_expand_alias(
        &mut self,
        scope: &Rc<BindingInfo<'a>>,
        expr: &ast::Expr,
    ) -> Result<Option<Vec<ExpressionArg<'a>>>> {
        let Some(token) = expr.as_token() else { return Ok(None) };
        let Some(alias) = scope.lookup_alias(token) else { return Ok(None) };
        if alias.ambiguous {
            return Err(Error::Ambiguous(token.to_string()));
        }
        let mut result = Vec::new();
        for iu in &alias.columns {
            let name = scope.column_name(*iu).unwrap_or_default().to_string();
            result.push(ExpressionArg { name, value: scalar(Expression::IuRef { iu: *iu }) });
        }
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gensym_symbols_are_unique_and_space_prefixed() {
        let schema = Schema::new();
        let mut analysis = SemanticAnalysis::new(&schema);
        let first = analysis.gensym_symbol(&[]).unwrap();
        let second = analysis.gensym_symbol(&[]).unwrap();
        assert_eq!(first, " sym 1");
        assert_eq!(second, " sym 2");
        assert_ne!(first, second);
    }

    #[test]
    fn internal_names_protect_the_symbol_prefix() {
        assert_eq!(internal_name("x"), "x");
        assert_eq!(internal_name(" sym 1"), "  sym 1");
    }

    #[test]
    fn argument_assignment_rules() {
        let formals = vec![
            Argument::new("a", TypeCategory::Expression),
            Argument::with_default("b", TypeCategory::Expression),
        ];
        let flat = |name: Option<&str>| ast::FuncArg {
            name: name.map(String::from),
            value: ast::ArgValue::Expr(ast::Expr::Literal(ast::Literal::Integer("1".into()))),
        };

        // Positional, then named fills the rest
        let args = [flat(None), flat(Some("b"))];
        let assigned = assign_arguments("f", &formals, &args).unwrap();
        assert!(assigned[0].is_some() && assigned[1].is_some());

        // Missing required parameter
        let err = assign_arguments("f", &formals, &[]).unwrap_err();
        assert_eq!(err.to_string(), "parameter 'a' missing in call to 'f'");

        // Positional after named
        let args = [flat(Some("a")), flat(None)];
        assert!(assign_arguments("f", &formals, &args).is_err());

        // Unknown and duplicate names
        let args = [flat(Some("c"))];
        assert!(assign_arguments("f", &formals, &args).is_err());
        let args = [flat(Some("a")), flat(Some("a"))];
        assert!(assign_arguments("f", &formals, &args).is_err());

        // Too many positional parameters
        let args = [flat(None), flat(None), flat(None)];
        assert!(assign_arguments("f", &formals, &args).is_err());
    }

    #[test]
    fn unknown_operands_are_cast_for_comparison() {
        let schema = Schema::new();
        let analysis = SemanticAnalysis::new(&schema);
        let null = Expression::Const {
            value: String::new(),
            ty: Type::unknown().as_nullable(),
            null: true,
        };
        let text = Expression::Const { value: "x".into(), ty: Type::text(), null: false };
        let (left, right) = analysis.enforce_comparable(null, text).unwrap();
        assert_eq!(left.result_type(), Type::text().as_nullable());
        assert_eq!(right.result_type(), Type::text());

        let int = Expression::Const { value: "1".into(), ty: Type::integer(), null: false };
        let text = Expression::Const { value: "x".into(), ty: Type::text(), null: false };
        assert!(analysis.enforce_comparable(int, text).is_err());
    }
}
