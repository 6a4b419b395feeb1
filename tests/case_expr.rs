//! Tests for case expressions

mod common;

use common::{compile, compile_err};

#[test]
fn searched_case() {
    let sql = compile("nation.map({x: case({n_regionkey = 1 => 'one'}, else: 'other')})");
    assert!(sql.contains("case when v_3 = cast('1' as integer) then 'one' else 'other' end"));
}

#[test]
fn simple_case_compares_against_the_search_value() {
    let sql = compile(
        "nation.map({x: case({1 => 'one', 2 => 'two'}, else: 'other', search: n_regionkey)})",
    );
    assert!(sql.contains(
        "case v_3 when cast('1' as integer) then 'one' when cast('2' as integer) then 'two' \
         else 'other' end"
    ));
}

#[test]
fn missing_else_defaults_to_null() {
    let sql = compile("nation.map({x: case({n_regionkey = 1 => 'one'})})");
    assert!(sql.contains("then 'one' else NULL end"));
}

#[test]
fn branch_types_unify_through_casts() {
    let sql = compile("nation.map({x: case({n_regionkey = 1 => 1}, else: 2.50)})");
    // The first branch fixes the type; the decimal default is cast to it
    assert!(sql.contains("then cast('1' as integer) else cast(cast('2.50' as decimal(3,2)) as integer) end"));
}

#[test]
fn searched_case_requires_boolean_conditions() {
    assert_eq!(
        compile_err("nation.map({x: case({n_regionkey => 'one'}, else: 'o')})").to_string(),
        "'case' requires boolean conditions"
    );
}

#[test]
fn simple_case_requires_comparable_conditions() {
    assert!(
        compile_err("nation.map({x: case({'one' => 1}, search: n_regionkey)})")
            .to_string()
            .starts_with("cannot compare")
    );
}

#[test]
fn case_requires_case_pairs() {
    assert_eq!(
        compile_err("nation.map({x: case({n_regionkey}, else: 'o')})").to_string(),
        "'case' requires case pairs"
    );
}
