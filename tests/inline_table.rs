//! Tests for inline table construction

mod common;

use common::{compile, compile_err};

#[test]
fn rows_with_named_columns() {
    assert_eq!(
        compile("table({a: 1, b: 'x'}, {a: 2, b: null})"),
        "select v_1 as a, v_2 as b from (select * from (values\
         (cast('1' as integer), 'x'),(cast('2' as integer), cast(NULL as text))) \
         s(v_1, v_2)) s"
    );
}

#[test]
fn unnamed_columns_are_numbered() {
    let sql = compile("table({1, 2})");
    assert!(sql.starts_with("select v_1 as \"1\", v_2 as \"2\" from "));
}

#[test]
fn later_null_rows_do_not_change_leading_types() {
    // The first row fixes the type, NULLs in later rows are cast to it
    let sql = compile("table({v: 'x'}, {v: null})");
    assert!(sql.contains("cast(NULL as text)"));
}

#[test]
fn a_leading_null_takes_its_type_from_a_later_row() {
    let sql = compile("table({v: null}, {v: 'x'})");
    assert!(sql.contains("(values(cast(NULL as text)),('x'))"));
}

#[test]
fn row_sizes_must_agree() {
    assert_eq!(
        compile_err("table({a: 1, b: 2}, {a: 3})").to_string(),
        "too few column values in inline table"
    );
    assert_eq!(
        compile_err("table({a: 1}, {a: 2, b: 3})").to_string(),
        "too many column values in inline table"
    );
}

#[test]
fn inline_tables_compose_with_table_methods() {
    let sql = compile("table({a: 1}, {a: 2}).filter(a = 1)");
    assert!(sql.contains("where v_1 = cast('1' as integer)"));
}
