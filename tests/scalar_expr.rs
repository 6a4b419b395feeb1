//! Tests for scalar operators, casts, and the remaining scalar functions

mod common;

use common::{compile, compile_err};

#[test]
fn literals_carry_their_types() {
    assert_eq!(compile("1"), "select cast('1' as integer)");
    assert_eq!(compile("2.50"), "select cast('2.50' as decimal(3,2))");
    assert_eq!(compile("'text'"), "select 'text'");
    assert_eq!(compile("true"), "select cast('true' as boolean)");
    assert_eq!(compile("null"), "select NULL");
}

#[test]
fn oversized_decimals_are_rejected() {
    assert_eq!(
        compile_err("1234567890123456789012345678901234567.89").to_string(),
        "decimal precision overflow"
    );
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(
        compile("1 + 2 * 3"),
        "select cast('1' as integer) + (cast('2' as integer) * cast('3' as integer))"
    );
}

#[test]
fn string_plus_becomes_concat() {
    let sql = compile("nation.map({x: n_name + n_comment})");
    assert!(sql.contains("v_2 || v_4"));
}

#[test]
fn date_arithmetic_accepts_intervals() {
    let sql = compile("orders.map({d: o_orderdate + '1 day'::interval})");
    assert!(sql.contains("v_5 + (cast('1 day' as interval))"));
    assert!(
        compile_err("orders.map({d: o_orderdate + 1})")
            .to_string()
            .contains("requires numerical arguments")
    );
}

#[test]
fn casts_use_simple_type_names() {
    assert_eq!(
        compile("'1996-01-01'::date"),
        "select cast('1996-01-01' as date)"
    );
    assert_eq!(compile_err("1::blob").to_string(), "unknown type 'blob'");
}

#[test]
fn unary_operators() {
    let sql = compile("lineitem.map({x: -l_quantity})");
    assert!(sql.contains("-v_5 as "));
    assert_eq!(
        compile_err("nation.map({x: -n_name})").to_string(),
        "'-' requires numerical arguments"
    );
    assert_eq!(
        compile_err("nation.map({x: !n_regionkey})").to_string(),
        "'!' requires boolean arguments"
    );
}

#[test]
fn substr_bounds() {
    let sql = compile("nation.map({x: n_name.substr(1, 2)})");
    assert!(sql.contains("substring(v_2 from cast('1' as integer) for cast('2' as integer))"));
    let sql = compile("nation.map({x: n_name.substr(for: 3)})");
    assert!(sql.contains("substring(v_2 for cast('3' as integer))"));
    assert_eq!(
        compile_err("nation.map({x: n_name.substr()})").to_string(),
        "'substr' requires at least one argument"
    );
}

#[test]
fn extract_date_parts() {
    let sql = compile("orders.map({y: o_orderdate.extract(year)})");
    assert!(sql.contains("extract(year from v_5)"));
    assert_eq!(
        compile_err("orders.map({y: o_orderdate.extract(hour)})").to_string(),
        "unknown date part 'hour'"
    );
}

#[test]
fn foreign_calls_as_functions() {
    let sql = compile("nation.map({x: foreigncall('lower', text, arguments: {n_name})})");
    assert!(sql.contains("lower(v_2) as "));
}

#[test]
fn foreign_calls_as_operators() {
    let sql = compile(
        "nation.map({x: foreigncall('+', integer, \
         arguments: {n_regionkey, n_regionkey, n_regionkey}, type: leftassoc)})",
    );
    assert!(sql.contains("(v_3 + v_3) + v_3"));
    let sql = compile(
        "nation.map({x: foreigncall('+', integer, \
         arguments: {n_regionkey, n_regionkey, n_regionkey}, type: rightassoc)})",
    );
    assert!(sql.contains("v_3 + (v_3 + v_3)"));
    assert_eq!(
        compile_err("foreigncall('+', integer, arguments: {1}, type: operator)").to_string(),
        "operator foreign calls require at least two arguments"
    );
}

#[test]
fn unknown_foreign_call_types_are_rejected() {
    assert_eq!(
        compile_err("foreigncall('f', integer, arguments: {1}, type: infix)").to_string(),
        "unknown call type 'infix'"
    );
}
