//! Tests for group by, aggregates, and scalar aggregation

mod common;

use common::{compile, compile_err};

#[test]
fn groupby_with_count_star() {
    assert_eq!(
        compile("nation.groupby({n_regionkey}, {c: count()})"),
        "select v_1 as n_regionkey, v_2 as c from (select v_3 as v_1, count(*) as v_2 \
         from (select \"n_nationkey\" as v_4, \"n_name\" as v_5, \"n_regionkey\" as v_3, \
         \"n_comment\" as v_6 from \"nation\") s group by 1) s"
    );
}

#[test]
fn plain_aggregate_references_collapse() {
    // The aggregate IU is reused directly, no map is added on top
    let sql = compile("nation.groupby({n_regionkey}, {c: count()})");
    assert!(!sql.contains("select *,"));
}

#[test]
fn aggregate_computations_are_wrapped_in_a_map() {
    let sql = compile("nation.groupby({n_regionkey}, {c: count() + 1})");
    assert!(sql.contains("select *, "));
    assert!(sql.contains("count(*)"));
}

#[test]
fn empty_groups_group_by_true() {
    let sql = compile("lineitem.groupby({}, {total: sum(l_quantity)})");
    assert!(sql.contains("group by true"));
    assert!(sql.contains("sum("));
}

#[test]
fn aggregate_keywords() {
    let sql = compile(
        "lineitem.groupby({l_returnflag}, {a: sum(l_quantity), b: avg(l_quantity), \
         c: min(l_quantity), d: max(l_quantity), e: count(l_quantity)})",
    );
    assert!(sql.contains("sum(v_"));
    assert!(sql.contains("avg(v_"));
    assert!(sql.contains("min(v_"));
    assert!(sql.contains("max(v_"));
    assert!(sql.contains("count(v_"));
}

#[test]
fn distinct_aggregates() {
    let sql = compile("lineitem.groupby({l_returnflag}, {s: sum(l_quantity, distinct: true)})");
    assert!(sql.contains("sum(distinct v_"));
    let sql = compile("lineitem.groupby({l_returnflag}, {c: count(l_suppkey, distinct: true)})");
    assert!(sql.contains("count(distinct v_"));
}

#[test]
fn unnamed_entries_get_positional_names() {
    let sql = compile("nation.groupby({n_regionkey + 1}, {count()})");
    assert!(sql.starts_with("select v_1 as \"1\", v_2 as \"2\" from "));
}

#[test]
fn aggregates_require_a_group_by_scope() {
    assert_eq!(
        compile_err("nation.map({c: count()})").to_string(),
        "aggregate 'count' can only be used in group by computations"
    );
}

#[test]
fn sum_requires_numeric_input() {
    assert_eq!(
        compile_err("nation.groupby({n_regionkey}, {s: sum(n_name)})").to_string(),
        "aggregate 'sum' requires a numerical argument"
    );
}

#[test]
fn grouping_sets_are_not_implemented() {
    assert_eq!(
        compile_err("nation.groupby({n_regionkey}, {c: count()}, type: rollup)").to_string(),
        "grouping sets not implemented yet"
    );
}

#[test]
fn scalar_aggregate_expression() {
    let sql = compile("lineitem.aggregate(sum(l_quantity))");
    assert!(sql.starts_with("select (select v_1 from (select sum(v_2) as v_1 from "));
    assert!(sql.ends_with(") s) s)"));
}

#[test]
fn scalar_aggregates_combine() {
    let sql = compile("lineitem.aggregate(sum(l_quantity) / count())");
    assert!(sql.contains("v_1 / v_"));
    assert!(sql.contains("sum("));
    assert!(sql.contains("count(*)"));
}

#[test]
fn distinct_groups_every_column() {
    assert_eq!(
        compile("nation.project({n_regionkey}).distinct()"),
        "select v_1 as n_regionkey from (select v_2 as v_1 from \
         (select \"n_nationkey\" as v_3, \"n_name\" as v_4, \"n_regionkey\" as v_2, \
         \"n_comment\" as v_5 from \"nation\") s group by 1) s"
    );
}
