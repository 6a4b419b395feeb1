//! Tests for user defined lets: capture, expansion, and visibility

mod common;

use common::{compile, compile_err};

#[test]
fn expression_parameters_expand_at_every_use() {
    assert_eq!(
        compile("let sq(x) := x*x sq(3)+sq(4)"),
        "select (cast('3' as integer) * cast('3' as integer)) + \
         (cast('4' as integer) * cast('4' as integer))"
    );
}

#[test]
fn value_lets_expand_in_place() {
    assert_eq!(
        compile("let active := nation.filter(n_regionkey = 1) active"),
        compile("nation.filter(n_regionkey = 1)")
    );
}

#[test]
fn table_parameters_capture_the_caller_scope() {
    let sql = compile("let cheap(t: table) := t.filter(l_quantity < 5) cheap(lineitem)");
    assert!(sql.contains("where v_5 < cast('5' as integer)"));
}

#[test]
fn default_values_fill_missing_arguments() {
    let sql = compile(
        "let addn(x, n := 1) := x + n \
         lineitem.map({a: addn(l_linenumber), b: addn(l_linenumber, 2)})",
    );
    assert!(sql.contains("v_4 + cast('1' as integer) as "));
    assert!(sql.contains("v_4 + cast('2' as integer) as "));
}

#[test]
fn named_arguments_work_in_let_calls() {
    assert_eq!(
        compile("let sq(x) := x*x sq(x: 3)"),
        compile("let sq(x) := x*x sq(3)")
    );
}

#[test]
fn later_lets_are_not_visible_in_earlier_bodies() {
    assert_eq!(
        compile_err("let a := b let b := 1 a").to_string(),
        "unknown table 'b'"
    );
}

#[test]
fn lets_cannot_call_themselves() {
    assert_eq!(
        compile_err("let f(x) := f(x) f(1)").to_string(),
        "function 'f' not found"
    );
}

#[test]
fn earlier_lets_are_visible() {
    assert_eq!(
        compile("let one := 1 let two := one + one two"),
        "select cast('1' as integer) + cast('1' as integer)"
    );
}

#[test]
fn duplicate_lets_are_rejected() {
    assert_eq!(
        compile_err("let a := 1 let a := 2 a").to_string(),
        "duplicate let 'a'"
    );
    assert_eq!(
        compile_err("let f(x, x) := x f(1)").to_string(),
        "duplicate function argument 'x'"
    );
}

#[test]
fn symbol_parameters_bind_once() {
    let sql = compile("let tag(t: table, s: symbol) := t.as(s) tag(nation, n).filter(n.n_name = 'x')");
    assert!(sql.contains("where v_2 = 'x'"));
}

#[test]
fn gensym_symbols_do_not_collide() {
    // Both sides get distinct generated scope names, so the join scopes
    // stay unambiguous
    let sql = compile(
        "let fresh(t: table) := t.as(gensym()) \
         fresh(nation).join(fresh(region), r_regionkey = n_regionkey).project({n_name, r_name})",
    );
    assert!(sql.starts_with("select v_1 as n_name, v_2 as r_name"));
}

#[test]
fn unsupported_argument_categories_are_rejected() {
    assert_eq!(
        compile_err("let f(x: tuple) := x f(1)").to_string(),
        "unsupported argument type 'tuple'"
    );
}

#[test]
fn defun_is_not_implemented() {
    assert_eq!(
        compile_err("defun f(x) := x").to_string(),
        "defun not implemented yet"
    );
}
