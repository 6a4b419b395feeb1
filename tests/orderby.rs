//! Tests for ordering, limits, and offsets

mod common;

use common::{compile, compile_err};

#[test]
fn top_level_sorts_are_hoisted_around_the_final_select() {
    let sql = compile("nation.orderby({n_name})");
    assert!(sql.ends_with(" s order by v_2"));
    assert!(sql.starts_with("select v_1 as n_nationkey, v_2 as n_name"));
}

#[test]
fn descending_and_ascending_marks() {
    let sql = compile("nation.orderby({n_name.desc(), n_regionkey.asc()})");
    assert!(sql.ends_with("order by v_2 desc, v_3"));
}

#[test]
fn limits_and_offsets_are_integer_constants() {
    let sql = compile("nation.orderby({n_name}, 5, 2)");
    assert!(sql.ends_with("order by v_2 limit 5 offset 2"));
    assert_eq!(
        compile_err("nation.orderby({n_name}, n_regionkey)").to_string(),
        "'limit' requires an integer constant"
    );
    assert_eq!(
        compile_err("nation.orderby({n_name}, 5, 1.5)").to_string(),
        "'offset' requires an integer constant"
    );
}

#[test]
fn inner_sorts_stay_in_place() {
    // A filter above the sort keeps the sort inside the query
    let sql = compile("nation.orderby({n_name}).filter(n_regionkey = 1)");
    assert!(sql.contains(" s order by v_2) s where "));
}

#[test]
fn named_collations_are_not_wired_up() {
    assert_eq!(
        compile_err("nation.orderby({n_name.collate(de)})").to_string(),
        "unknown collate 'de'"
    );
}
