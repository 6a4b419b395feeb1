//! Tests for table scans and the top level query shape

mod common;

use common::{compile, compile_err};

#[test]
fn scan_names_every_column() {
    assert_eq!(
        compile("nation"),
        "select v_1 as n_nationkey, v_2 as n_name, v_3 as n_regionkey, v_4 as n_comment \
         from (select \"n_nationkey\" as v_1, \"n_name\" as v_2, \"n_regionkey\" as v_3, \
         \"n_comment\" as v_4 from \"nation\") s"
    );
}

#[test]
fn emission_is_deterministic() {
    let query = "customer.filter(c_acctbal > 0).groupby({c_nationkey}, {total: sum(c_acctbal)})";
    assert_eq!(compile(query), compile(query));
}

#[test]
fn iu_names_are_assigned_in_first_reference_order() {
    let sql = compile("region");
    // The output columns are referenced first, so they get the low numbers
    assert!(sql.starts_with("select v_1 as r_regionkey, v_2 as r_name, v_3 as r_comment"));
}

#[test]
fn table_names_are_case_sensitive() {
    assert_eq!(compile_err("unknown").to_string(), "unknown table 'unknown'");
}

#[test]
fn queries_may_end_with_a_semicolon() {
    assert_eq!(compile("nation;"), compile("nation"));
}

#[test]
fn scalar_queries_select_the_expression() {
    assert_eq!(
        compile("1 + 2"),
        "select cast('1' as integer) + cast('2' as integer)"
    );
}
