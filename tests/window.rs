//! Tests for window computations

mod common;

use common::{compile, compile_err};

#[test]
fn row_number_over_partition_and_order() {
    let sql = compile("lineitem.window({rn: row_number()}, {l_orderkey}, {l_linenumber})");
    assert!(sql.contains("row_number() over (partition by v_1 order by v_4) as v_17"));
}

#[test]
fn window_without_partition_or_order() {
    let sql = compile("lineitem.window({total: sum(l_quantity)})");
    assert!(sql.contains("sum(v_5) over () as v_17"));
}

#[test]
fn ranking_functions_carry_their_value() {
    let sql = compile("lineitem.window({r: rank(l_quantity)}, {l_orderkey})");
    assert!(sql.contains("rank(v_5) over (partition by v_1) as v_17"));
    let sql = compile("lineitem.window({r: dense_rank(l_quantity)})");
    assert!(sql.contains("dense_rank(v_5) over () as v_17"));
}

#[test]
fn ntile_requires_an_integer() {
    let sql = compile("lineitem.window({bucket: ntile(4)}, {}, {l_quantity})");
    assert!(sql.contains("ntile(cast('4' as integer)) over (order by v_5) as v_17"));
    assert_eq!(
        compile_err("lineitem.window({bucket: ntile('x')})").to_string(),
        "'ntile' requires an integer argument"
    );
}

#[test]
fn lead_and_lag_record_offset_and_default() {
    let sql = compile("lineitem.window({n: lead(l_quantity)}, {}, {l_linenumber})");
    assert!(sql.contains("lead(v_5) over (order by v_4) as v_17"));
    let sql = compile("lineitem.window({n: lag(l_quantity, 2)}, {}, {l_linenumber})");
    assert!(sql.contains("lag(v_5, cast('2' as integer)) over "));
    let sql = compile("lineitem.window({n: lag(l_quantity, 2, 0)}, {}, {l_linenumber})");
    assert!(sql.contains("lag(v_5, cast('2' as integer), cast('0' as integer)) over "));
}

#[test]
fn first_and_last_value() {
    let sql = compile("lineitem.window({f: first_value(l_quantity), l: last_value(l_quantity)})");
    assert!(sql.contains("first_value(v_5) over () as v_17"));
    assert!(sql.contains("last_value(v_5) over () as v_18"));
}

#[test]
fn window_functions_require_a_window_scope() {
    assert_eq!(
        compile_err("nation.map({rn: row_number()})").to_string(),
        "window function 'row_number' can only be used in window computations"
    );
    assert_eq!(
        compile_err("nation.groupby({n_regionkey}, {r: rank(n_name)})").to_string(),
        "window function 'rank' can only be used in window computations"
    );
}

#[test]
fn aggregates_are_allowed_in_window_scopes() {
    let sql = compile("lineitem.window({s: sum(l_quantity)}, {l_orderkey})");
    assert!(sql.contains("sum(v_5) over (partition by v_1) as v_17"));
}

#[test]
fn frames_are_not_implemented() {
    assert_eq!(
        compile_err("lineitem.window({rn: row_number()}, framebegin: 1)").to_string(),
        "frames not implemented yet"
    );
}
