//! Scalar expression trees
//!
//! Expressions reference columns through IUs. An IU is the identity of one
//! column in the algebra tree: it carries a type but no name, and it is
//! introduced by exactly one operator. The analyzer mints IUs with unique
//! ids per compilation; the SQL writer assigns the printable names.

use crate::sql::SqlWriter;
use crate::types::Type;
use super::operator::Operator;

/// The identity of an information unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IuId(u64);

impl IuId {
    pub(crate) fn new(id: u64) -> Self {
        IuId(id)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: u64) -> Self {
        IuId(id)
    }
}

/// An information unit: one column of one operator's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iu {
    /// The identity
    pub id: IuId,
    /// The type
    pub ty: Type,
}

/// Collation info. Only the default collation exists for now; lookups of
/// named collations fail during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collate {
    #[default]
    None,
}

/// Comparison modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    Equal,
    NotEqual,
    Is,
    IsNot,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Like,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Power,
    Concat,
    And,
    Or,
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Date parts understood by extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Shape of a generated foreign call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallType {
    #[default]
    Function,
    LeftAssocOperator,
    RightAssocOperator,
}

/// Aggregation functions of group by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    CountStar,
    Count,
    CountDistinct,
    Sum,
    SumDistinct,
    Avg,
    AvgDistinct,
    Min,
    Max,
}

/// Aggregation functions of window computations, a superset of the group
/// by functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOp {
    Aggregate(AggregateOp),
    RowNumber,
    Rank,
    DenseRank,
    NTile,
    Lead,
    Lag,
    FirstValue,
    LastValue,
}

/// One aggregation entry of a group by or window computation
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// The aggregated value, absent for count(*) and row_number()
    pub value: Option<Expression>,
    /// The result IU
    pub iu: Iu,
    /// The operation
    pub op: WindowOp,
    /// Extra parameters (ntile buckets, lead/lag offset and default)
    pub parameters: Vec<Expression>,
}

impl Aggregation {
    /// Print the aggregation call itself, without alias or over clause
    pub(crate) fn generate_call(&self, out: &mut SqlWriter) {
        use AggregateOp::*;
        let (keyword, distinct) = match self.op {
            WindowOp::Aggregate(CountStar) => {
                out.write("count(*)");
                return;
            }
            WindowOp::Aggregate(Count) => ("count(", false),
            WindowOp::Aggregate(CountDistinct) => ("count(", true),
            WindowOp::Aggregate(Sum) => ("sum(", false),
            WindowOp::Aggregate(SumDistinct) => ("sum(", true),
            WindowOp::Aggregate(Avg) => ("avg(", false),
            WindowOp::Aggregate(AvgDistinct) => ("avg(", true),
            WindowOp::Aggregate(Min) => ("min(", false),
            WindowOp::Aggregate(Max) => ("max(", false),
            WindowOp::RowNumber => {
                out.write("row_number()");
                return;
            }
            WindowOp::Rank => ("rank(", false),
            WindowOp::DenseRank => ("dense_rank(", false),
            WindowOp::NTile => {
                out.write("ntile(");
                if let Some(n) = self.parameters.first() {
                    n.generate(out);
                }
                out.write(")");
                return;
            }
            WindowOp::Lead => ("lead(", false),
            WindowOp::Lag => ("lag(", false),
            WindowOp::FirstValue => ("first_value(", false),
            WindowOp::LastValue => ("last_value(", false),
        };
        out.write(keyword);
        if distinct {
            out.write("distinct ");
        }
        if let Some(value) = &self.value {
            value.generate(out);
        }
        for p in &self.parameters {
            out.write(", ");
            p.generate(out);
        }
        out.write(")");
    }
}

/// A scalar expression
#[derive(Debug, Clone)]
pub enum Expression {
    /// A reference to a column introduced elsewhere in the tree
    IuRef { iu: Iu },
    /// A constant, kept as raw literal text
    Const { value: String, ty: Type, null: bool },
    /// An explicit or inserted cast
    Cast { input: Box<Expression>, ty: Type },
    /// A comparison
    Comparison {
        left: Box<Expression>,
        right: Box<Expression>,
        mode: ComparisonMode,
        collate: Collate,
    },
    /// A between predicate
    Between {
        base: Box<Expression>,
        lower: Box<Expression>,
        upper: Box<Expression>,
        collate: Collate,
    },
    /// An in predicate over an explicit value list
    In {
        probe: Box<Expression>,
        values: Vec<Expression>,
        collate: Collate,
    },
    /// A binary computation
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        ty: Type,
        op: BinaryOp,
    },
    /// A unary computation
    Unary {
        input: Box<Expression>,
        ty: Type,
        op: UnaryOp,
    },
    /// Extraction of a date part
    Extract { input: Box<Expression>, part: DatePart },
    /// A substring computation
    Substr {
        value: Box<Expression>,
        from: Option<Box<Expression>>,
        len: Option<Box<Expression>>,
    },
    /// case <value> when … then … else … end
    SimpleCase {
        value: Box<Expression>,
        cases: Vec<(Expression, Expression)>,
        default: Box<Expression>,
    },
    /// case when … then … else … end
    SearchedCase {
        cases: Vec<(Expression, Expression)>,
        default: Box<Expression>,
    },
    /// A scalar aggregate over a whole subtree
    Aggregate {
        input: Box<Operator>,
        aggregates: Vec<Aggregation>,
        computation: Box<Expression>,
    },
    /// An escape hatch for target specific functions and operators
    ForeignCall {
        name: String,
        ty: Type,
        arguments: Vec<Expression>,
        call_type: CallType,
    },
}

impl Expression {
    /// The result type
    pub fn result_type(&self) -> Type {
        match self {
            Expression::IuRef { iu } => iu.ty,
            Expression::Const { ty, .. } => *ty,
            Expression::Cast { ty, .. } => *ty,
            Expression::Comparison { left, right, mode, .. } => {
                let nullable = !matches!(mode, ComparisonMode::Is | ComparisonMode::IsNot)
                    && (left.result_type().is_nullable() || right.result_type().is_nullable());
                Type::bool().with_nullable(nullable)
            }
            Expression::Between { base, lower, upper, .. } => {
                Type::bool().with_nullable(
                    base.result_type().is_nullable()
                        || lower.result_type().is_nullable()
                        || upper.result_type().is_nullable(),
                )
            }
            Expression::In { probe, values, .. } => {
                Type::bool().with_nullable(
                    probe.result_type().is_nullable()
                        || values.iter().any(|v| v.result_type().is_nullable()),
                )
            }
            Expression::Binary { ty, .. } => *ty,
            Expression::Unary { ty, .. } => *ty,
            Expression::Extract { input, .. } => {
                Type::integer().with_nullable(input.result_type().is_nullable())
            }
            Expression::Substr { value, from, len } => {
                let nullable = value.result_type().is_nullable()
                    || from.as_ref().is_some_and(|e| e.result_type().is_nullable())
                    || len.as_ref().is_some_and(|e| e.result_type().is_nullable());
                value.result_type().with_nullable(nullable)
            }
            Expression::SimpleCase { cases, default, .. }
            | Expression::SearchedCase { cases, default } => {
                let ty = default.result_type();
                let nullable = ty.is_nullable()
                    || cases.iter().any(|(_, result)| result.result_type().is_nullable());
                ty.with_nullable(nullable)
            }
            Expression::Aggregate { computation, .. } => computation.result_type(),
            Expression::ForeignCall { ty, .. } => *ty,
        }
    }

    /// The IU behind a plain column reference, if this is one
    pub fn as_iu_ref(&self) -> Option<Iu> {
        match self {
            Expression::IuRef { iu } => Some(*iu),
            _ => None,
        }
    }

    /// Generate SQL
    pub fn generate(&self, out: &mut SqlWriter) {
        match self {
            Expression::IuRef { iu } => out.write_iu(iu.id),
            Expression::Const { value, ty, null } => {
                if *null {
                    out.write("NULL");
                } else if ty.is_string() {
                    out.write_string(value);
                } else {
                    out.write("cast(");
                    out.write_string(value);
                    out.write(" as ");
                    out.write_type(*ty);
                    out.write(")");
                }
            }
            Expression::Cast { input, ty } => {
                out.write("cast(");
                input.generate(out);
                out.write(" as ");
                out.write_type(*ty);
                out.write(")");
            }
            Expression::Comparison { left, right, mode, .. } => {
                left.generate_operand(out);
                out.write(match mode {
                    ComparisonMode::Equal => " = ",
                    ComparisonMode::NotEqual => " <> ",
                    ComparisonMode::Is => " is not distinct from ",
                    ComparisonMode::IsNot => " is distinct from ",
                    ComparisonMode::Less => " < ",
                    ComparisonMode::LessOrEqual => " <= ",
                    ComparisonMode::Greater => " > ",
                    ComparisonMode::GreaterOrEqual => " >= ",
                    ComparisonMode::Like => " like ",
                });
                right.generate_operand(out);
            }
            Expression::Between { base, lower, upper, .. } => {
                base.generate_operand(out);
                out.write(" between ");
                lower.generate_operand(out);
                out.write(" and ");
                upper.generate_operand(out);
            }
            Expression::In { probe, values, .. } => {
                probe.generate_operand(out);
                out.write(" in (");
                for (index, v) in values.iter().enumerate() {
                    if index != 0 {
                        out.write(", ");
                    }
                    v.generate(out);
                }
                out.write(")");
            }
            Expression::Binary { left, right, op, .. } => {
                left.generate_operand(out);
                out.write(match op {
                    BinaryOp::Plus => " + ",
                    BinaryOp::Minus => " - ",
                    BinaryOp::Mul => " * ",
                    BinaryOp::Div => " / ",
                    BinaryOp::Mod => " % ",
                    BinaryOp::Power => " ^ ",
                    BinaryOp::Concat => " || ",
                    BinaryOp::And => " and ",
                    BinaryOp::Or => " or ",
                });
                right.generate_operand(out);
            }
            Expression::Unary { input, op, .. } => {
                out.write(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                    UnaryOp::Not => " not ",
                });
                input.generate_operand(out);
            }
            Expression::Extract { input, part } => {
                out.write("extract(");
                out.write(match part {
                    DatePart::Year => "year",
                    DatePart::Month => "month",
                    DatePart::Day => "day",
                });
                out.write(" from ");
                input.generate_operand(out);
                out.write(")");
            }
            Expression::Substr { value, from, len } => {
                out.write("substring(");
                value.generate(out);
                if let Some(from) = from {
                    out.write(" from ");
                    from.generate(out);
                }
                if let Some(len) = len {
                    out.write(" for ");
                    len.generate(out);
                }
                out.write(")");
            }
            Expression::SimpleCase { value, cases, default } => {
                out.write("case ");
                value.generate_operand(out);
                for (when, then) in cases {
                    out.write(" when ");
                    when.generate(out);
                    out.write(" then ");
                    then.generate(out);
                }
                out.write(" else ");
                default.generate(out);
                out.write(" end");
            }
            Expression::SearchedCase { cases, default } => {
                out.write("case");
                for (when, then) in cases {
                    out.write(" when ");
                    when.generate(out);
                    out.write(" then ");
                    then.generate(out);
                }
                out.write(" else ");
                default.generate(out);
                out.write(" end");
            }
            Expression::Aggregate { input, aggregates, computation } => {
                out.write("(select ");
                computation.generate(out);
                if !aggregates.is_empty() {
                    out.write(" from (select ");
                    for (index, a) in aggregates.iter().enumerate() {
                        if index != 0 {
                            out.write(", ");
                        }
                        a.generate_call(out);
                        out.write(" as ");
                        out.write_iu(a.iu.id);
                    }
                    out.write(" from ");
                    input.generate(out);
                    out.write(" s) s");
                }
                out.write(")");
            }
            Expression::ForeignCall { name, arguments, call_type, .. } => match call_type {
                CallType::Function => {
                    out.write(name);
                    out.write("(");
                    for (index, a) in arguments.iter().enumerate() {
                        if index != 0 {
                            out.write(", ");
                        }
                        a.generate(out);
                    }
                    out.write(")");
                }
                CallType::LeftAssocOperator => {
                    // ((a op b) op c) op d
                    for _ in 0..arguments.len().saturating_sub(2) {
                        out.write("(");
                    }
                    arguments[0].generate_operand(out);
                    for (index, a) in arguments.iter().enumerate().skip(1) {
                        out.write(" ");
                        out.write(name);
                        out.write(" ");
                        a.generate_operand(out);
                        if index != arguments.len() - 1 {
                            out.write(")");
                        }
                    }
                }
                CallType::RightAssocOperator => {
                    // a op (b op (c op d))
                    for (index, a) in arguments.iter().enumerate() {
                        a.generate_operand(out);
                        if index + 1 != arguments.len() {
                            out.write(" ");
                            out.write(name);
                            out.write(" ");
                            if index + 2 != arguments.len() {
                                out.write("(");
                            }
                        }
                    }
                    for _ in 0..arguments.len().saturating_sub(2) {
                        out.write(")");
                    }
                }
            },
        }
    }

    /// Generate SQL in a form that is suitable as an operand
    pub fn generate_operand(&self, out: &mut SqlWriter) {
        match self {
            Expression::IuRef { .. } | Expression::Const { .. } => self.generate(out),
            _ => {
                out.write("(");
                self.generate(out);
                out.write(")");
            }
        }
    }
}
