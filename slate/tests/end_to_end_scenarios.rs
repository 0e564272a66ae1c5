//! End-to-end literal-input/literal-output scenarios (spec §8), run
//! through the full parse → compile → execute pipeline via `slate::run`.
//! Grounded on the teacher's `tests/code_samples_tests.rs` convention of
//! checking a full program's final value against one literal expectation
//! per scenario.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use slate::{run, SlateError};
use slate_value::Value;

#[test]
fn s1_arithmetic_promotion_overflows_into_a_bignum() {
    let result = run("var x = 2_000_000_000 + 2_000_000_000; x * 2;").unwrap();
    let Value::BigInt(big) = result else {
        panic!("expected a bignum result, got {result:?}")
    };
    assert_eq!(big.to_string(), "8000000000");
}

#[test]
fn s2_string_method_chain_upper_then_substring() {
    let result = run(r#"val s = "Hello, World"; s.toUpper().substring(7, 5);"#).unwrap();
    assert_eq!(result, Value::Str(slate_value::SlateString::new("WORLD").unwrap()));
}

#[test]
fn s3_closure_capture_counts_across_calls() {
    let source = "
        function makeCounter() { var n = 0; return function() { n = n + 1; return n; } }
        val c = makeCounter(); c(); c(); c();
    ";
    let result = run(source).unwrap();
    assert_eq!(result, Value::Int32(3));
}

#[test]
fn s4_range_iteration_sums_inclusive_of_both_endpoints() {
    let result = run("var total = 0; for (i in 1..10) total = total + i; total;").unwrap();
    assert_eq!(result, Value::Int32(55));
}

#[test]
fn s5_object_prototype_lookup_resolves_a_shared_method() {
    let source = r#"
        val proto = { greet: function(n) { return "hi " + n } };
        val o = Object.create(proto); o.greet("slate");
    "#;
    let result = run(source).unwrap();
    assert_eq!(result, Value::Str(slate_value::SlateString::new("hi slate").unwrap()));
}

#[test]
fn s6_division_by_zero_raises_an_arithmetic_error_at_line_one() {
    let err = run("val x = 1 / 0;").unwrap_err();
    let SlateError::Runtime(spanned) = err else {
        panic!("expected a runtime error, got {err:?}")
    };
    assert!(matches!(spanned.error, slate::vm::error::VmError::ArithmeticError { .. }));
    assert_eq!(spanned.line, 1);
}
