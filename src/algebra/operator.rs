//! Relational operator trees
//!
//! Every operator prints as a parenthesized select, so any subtree can be
//! used wherever a table expression is expected. The compiler makes no
//! attempt to simplify the nesting; that is the job of the consuming SQL
//! engine.

use super::expression::{Aggregation, Collate, Expression, Iu};
use crate::sql::SqlWriter;

/// Join types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    LeftSemi,
    RightSemi,
    LeftAnti,
    RightAnti,
}

/// Set operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperationKind {
    Union,
    UnionAll,
    Except,
    ExceptAll,
    Intersect,
    IntersectAll,
}

/// One sort key
#[derive(Debug, Clone)]
pub struct SortEntry {
    /// The value to order by
    pub value: Expression,
    /// The collate
    pub collate: Collate,
    /// Descending?
    pub descending: bool,
}

impl SortEntry {
    pub(crate) fn generate(&self, out: &mut SqlWriter) {
        self.value.generate(out);
        // The collation catalog is not wired up yet; keep the placeholder
        // the downstream tests know about
        if self.collate != Collate::None {
            out.write(" collate TODO");
        }
        if self.descending {
            out.write(" desc");
        }
    }
}

/// A relational operator
#[derive(Debug, Clone)]
pub enum Operator {
    /// A scan of a schema table
    TableScan {
        name: String,
        columns: Vec<(String, Iu)>,
    },
    /// A filter
    Select {
        input: Box<Operator>,
        condition: Expression,
    },
    /// Computation of new columns, preserving all input columns
    Map {
        input: Box<Operator>,
        computations: Vec<(Expression, Iu)>,
    },
    /// Union, except, or intersect of two inputs
    SetOperation {
        left: Box<Operator>,
        right: Box<Operator>,
        left_columns: Vec<Expression>,
        right_columns: Vec<Expression>,
        result_columns: Vec<Iu>,
        op: SetOperationKind,
    },
    /// A join
    Join {
        left: Box<Operator>,
        right: Box<Operator>,
        condition: Expression,
        join_type: JoinType,
    },
    /// Grouped aggregation
    GroupBy {
        input: Box<Operator>,
        group_by: Vec<(Expression, Iu)>,
        aggregates: Vec<Aggregation>,
    },
    /// Sorting with optional bounds
    Sort {
        input: Box<Operator>,
        order: Vec<SortEntry>,
        limit: Option<u64>,
        offset: Option<u64>,
    },
    /// Window computations, appended to the input columns
    Window {
        input: Box<Operator>,
        aggregates: Vec<Aggregation>,
        partition_by: Vec<Expression>,
        order_by: Vec<SortEntry>,
    },
    /// An inline table literal, values stored row major
    InlineTable {
        columns: Vec<Iu>,
        values: Vec<Expression>,
        row_count: usize,
    },
}

impl Operator {
    /// Generate SQL
    pub fn generate(&self, out: &mut SqlWriter) {
        match self {
            Operator::TableScan { name, columns } => {
                out.write("(select ");
                for (index, (column, iu)) in columns.iter().enumerate() {
                    if index != 0 {
                        out.write(", ");
                    }
                    out.write_identifier(column);
                    out.write(" as ");
                    out.write_iu(iu.id);
                }
                out.write(" from ");
                out.write_identifier(name);
                out.write(")");
            }
            Operator::Select { input, condition } => {
                out.write("(select * from ");
                input.generate(out);
                out.write(" s where ");
                condition.generate(out);
                out.write(")");
            }
            Operator::Map { input, computations } => {
                out.write("(select *");
                for (value, iu) in computations {
                    out.write(", ");
                    value.generate(out);
                    out.write(" as ");
                    out.write_iu(iu.id);
                }
                out.write(" from ");
                input.generate(out);
                out.write(" s)");
            }
            Operator::SetOperation {
                left,
                right,
                left_columns,
                right_columns,
                result_columns,
                op,
            } => {
                let side = |out: &mut SqlWriter, input: &Operator, columns: &[Expression]| {
                    out.write("(select ");
                    if columns.is_empty() {
                        out.write("*");
                    }
                    for (index, value) in columns.iter().enumerate() {
                        if index != 0 {
                            out.write(", ");
                        }
                        value.generate(out);
                        out.write(" as ");
                        out.write_iu(result_columns[index].id);
                    }
                    out.write(" from ");
                    input.generate(out);
                    out.write(" s)");
                };
                out.write("(");
                side(out, left, left_columns);
                out.write(match op {
                    SetOperationKind::Union => " union ",
                    SetOperationKind::UnionAll => " union all ",
                    SetOperationKind::Except => " except ",
                    SetOperationKind::ExceptAll => " except all ",
                    SetOperationKind::Intersect => " intersect ",
                    SetOperationKind::IntersectAll => " intersect all ",
                });
                side(out, right, right_columns);
                out.write(")");
            }
            Operator::Join { left, right, condition, join_type } => {
                let keyword = match join_type {
                    JoinType::Inner => "inner",
                    JoinType::LeftOuter => "left outer",
                    JoinType::RightOuter => "right outer",
                    JoinType::FullOuter => "full outer",
                    JoinType::LeftSemi
                    | JoinType::RightSemi
                    | JoinType::LeftAnti
                    | JoinType::RightAnti => {
                        // Semi and anti joins keep one side and probe the
                        // other through an exists subquery
                        let (keeper, keeper_name, other, other_name) = match join_type {
                            JoinType::LeftSemi | JoinType::LeftAnti => (left, " l", right, " r"),
                            _ => (right, " r", left, " l"),
                        };
                        let negated =
                            matches!(join_type, JoinType::LeftAnti | JoinType::RightAnti);
                        out.write("(select * from ");
                        keeper.generate(out);
                        out.write(keeper_name);
                        out.write(if negated {
                            " where not exists(select * from "
                        } else {
                            " where exists(select * from "
                        });
                        other.generate(out);
                        out.write(other_name);
                        out.write(" where ");
                        condition.generate(out);
                        out.write("))");
                        return;
                    }
                };
                out.write("(select * from ");
                left.generate(out);
                out.write(" l ");
                out.write(keyword);
                out.write(" join ");
                right.generate(out);
                out.write(" r on ");
                condition.generate(out);
                out.write(")");
            }
            Operator::GroupBy { input, group_by, aggregates } => {
                out.write("(select ");
                let mut first = true;
                for (value, iu) in group_by {
                    if !std::mem::take(&mut first) {
                        out.write(", ");
                    }
                    value.generate(out);
                    out.write(" as ");
                    out.write_iu(iu.id);
                }
                for a in aggregates {
                    if !std::mem::take(&mut first) {
                        out.write(", ");
                    }
                    a.generate_call(out);
                    out.write(" as ");
                    out.write_iu(a.iu.id);
                }
                out.write(" from ");
                input.generate(out);
                out.write(" s group by ");
                if group_by.is_empty() {
                    out.write("true");
                } else {
                    for index in 0..group_by.len() {
                        if index != 0 {
                            out.write(", ");
                        }
                        out.write(&(index + 1).to_string());
                    }
                }
                out.write(")");
            }
            Operator::Sort { input, order, limit, offset } => {
                out.write("(select * from ");
                input.generate(out);
                out.write(" s");
                if !order.is_empty() {
                    out.write(" order by ");
                    for (index, o) in order.iter().enumerate() {
                        if index != 0 {
                            out.write(", ");
                        }
                        o.generate(out);
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
                out.write(")");
            }
            Operator::Window { input, aggregates, partition_by, order_by } => {
                out.write("(select *");
                for a in aggregates {
                    out.write(", ");
                    a.generate_call(out);
                    out.write(" over (");
                    let mut need_space = false;
                    if !partition_by.is_empty() {
                        out.write("partition by ");
                        for (index, p) in partition_by.iter().enumerate() {
                            if index != 0 {
                                out.write(", ");
                            }
                            p.generate(out);
                        }
                        need_space = true;
                    }
                    if !order_by.is_empty() {
                        if need_space {
                            out.write(" ");
                        }
                        out.write("order by ");
                        for (index, o) in order_by.iter().enumerate() {
                            if index != 0 {
                                out.write(", ");
                            }
                            o.generate(out);
                        }
                    }
                    out.write(") as ");
                    out.write_iu(a.iu.id);
                }
                out.write(" from ");
                input.generate(out);
                out.write(" s)");
            }
            Operator::InlineTable { columns, values, row_count } => {
                out.write("(select * from (values");
                if *row_count != 0 {
                    for row in 0..*row_count {
                        if row != 0 {
                            out.write(",");
                        }
                        if columns.is_empty() {
                            // Empty tuples are not valid SQL, pad with a dummy
                            out.write("(NULL)");
                        } else {
                            out.write("(");
                            for (index, _) in columns.iter().enumerate() {
                                if index != 0 {
                                    out.write(", ");
                                }
                                values[row * columns.len() + index].generate(out);
                            }
                            out.write(")");
                        }
                    }
                } else if columns.is_empty() {
                    out.write("(NULL)");
                } else {
                    out.write("(");
                    for index in 0..columns.len() {
                        if index != 0 {
                            out.write(", ");
                        }
                        out.write("NULL");
                    }
                    out.write(")");
                }
                out.write(") s(");
                for (index, c) in columns.iter().enumerate() {
                    if index != 0 {
                        out.write(", ");
                    }
                    out.write_iu(c.id);
                }
                out.write(")");
                if *row_count == 0 {
                    out.write(" limit 0");
                }
                out.write(")");
            }
        }
    }
}
