//! Tests for union, except, and intersect

mod common;

use common::{compile, compile_err};

#[test]
fn union_renames_both_sides_to_the_result_columns() {
    let sql = compile("nation.project({n_name}).union(region.project({r_name}))");
    assert!(sql.starts_with("select v_1 as n_name from ((select v_2 as v_1 from "));
    assert!(sql.contains(") s) union (select v_"));
    assert!(sql.contains(" as v_1 from "));
}

#[test]
fn all_variants_keep_duplicates() {
    let sql = compile("nation.project({n_name}).union(region.project({r_name}), all: true)");
    assert!(sql.contains(" union all "));
    let sql = compile("nation.project({n_name}).except(region.project({r_name}), all: true)");
    assert!(sql.contains(" except all "));
    let sql = compile("nation.project({n_name}).intersect(region.project({r_name}))");
    assert!(sql.contains(" intersect "));
}

#[test]
fn the_all_flag_must_be_a_constant_boolean() {
    assert_eq!(
        compile_err("nation.project({n_name}).union(region.project({r_name}), all: 1)")
            .to_string(),
        "parameter 'all' requires a constant boolean in call to 'union'"
    );
}

#[test]
fn column_counts_must_match() {
    assert_eq!(
        compile_err("nation.project({n_name, n_regionkey}).union(region.project({r_name}))")
            .to_string(),
        "'union' requires inputs with the same number of columns"
    );
}

#[test]
fn column_types_must_match_up_to_nullability() {
    assert_eq!(
        compile_err("nation.project({n_nationkey}).union(region.project({r_name}))").to_string(),
        "'union' column 1 has mismatching types 'integer' and 'char'"
    );
}

#[test]
fn except_of_matching_scans() {
    let sql = compile("nation.project({key: n_regionkey}).except(region.project({r_regionkey}))");
    assert!(sql.contains(" except "));
    assert!(sql.starts_with("select v_1 as key from "));
}
