//! Tests for the remaining error paths: name resolution, argument
//! assignment, and reserved constructs

mod common;

use common::compile_err;
use saneql::Error;

#[test]
fn unknown_names_report_the_table_lookup() {
    assert!(matches!(compile_err("nation.filter(xyz = 1)"), Error::UnknownTable(name) if name == "xyz"));
}

#[test]
fn unknown_scoped_columns() {
    assert_eq!(
        compile_err("nation.filter(nation.xyz = 1)").to_string(),
        "'nation.xyz' not found"
    );
}

#[test]
fn unknown_methods_name_the_receiver_type() {
    assert_eq!(
        compile_err("nation.frobnicate()").to_string(),
        "'frobnicate' not found for 'table'"
    );
    assert_eq!(
        compile_err("nation.filter(n_name.frobnicate())").to_string(),
        "'frobnicate' not found for 'char'"
    );
    assert!(matches!(
        compile_err("frobnicate()"),
        Error::FunctionNotFound(name) if name == "frobnicate"
    ));
}

#[test]
fn scalar_methods_are_not_table_methods() {
    assert_eq!(
        compile_err("nation.filter(n_regionkey.extract(year) = 1)").to_string(),
        "'extract' not found for 'integer'"
    );
}

#[test]
fn argument_assignment_errors() {
    assert_eq!(
        compile_err("nation.join(region)").to_string(),
        "parameter 'on' missing in call to 'join'"
    );
    assert_eq!(
        compile_err("nation.join(region, true, on: true)").to_string(),
        "parameter 'on' provided more than once"
    );
    assert_eq!(
        compile_err("nation.join(table: region, true)").to_string(),
        "positional parameters cannot be used after named parameters in call to 'join'"
    );
    assert_eq!(
        compile_err("nation.join(region, true, flavor: inner)").to_string(),
        "parameter 'flavor' not found in call to 'join'"
    );
    assert_eq!(
        compile_err("nation.filter(true, false)").to_string(),
        "too many parameters in call to 'filter'"
    );
}

#[test]
fn scalar_and_table_positions_are_enforced() {
    assert_eq!(
        compile_err("nation.filter(region)").to_string(),
        "parameter 'condition' requires a scalar in call to 'filter'"
    );
    assert_eq!(
        compile_err("nation.join(1, true)").to_string(),
        "parameter 'table' requires a table in call to 'join'"
    );
    assert_eq!(
        compile_err("(nation) + 1").to_string(),
        "scalar value required in operator '+'"
    );
}

#[test]
fn casting_a_table_is_rejected() {
    assert_eq!(
        compile_err("nation::integer").to_string(),
        "casts require scalar values"
    );
}

#[test]
fn gensym_outside_symbol_contexts() {
    assert_eq!(
        compile_err("nation.map({x: gensym()})").to_string(),
        "'gensym' can only be used where a symbol is expected"
    );
}

#[test]
fn symbol_parameters_reject_complex_expressions() {
    assert_eq!(
        compile_err("nation.as(1 + 2)").to_string(),
        "parameter 'name' requires a symbol in call to 'as'"
    );
}

#[test]
fn syntax_errors_abort() {
    assert!(matches!(compile_err("nation.filter("), Error::Syntax(_)));
    assert!(matches!(compile_err("nation..name"), Error::Syntax(_)));
    assert!(matches!(compile_err("1 ++"), Error::Syntax(_)));
}
