mod common;

use common::{eval_input, expect_error, expect_int, expect_null, expect_string};
use ok_lang::value::Value;

#[test]
fn if_else_expressions() {
    let scenarios = [
        ("if (true) { 10 }", Some(10)),
        ("if (false) { 10 }", None),
        ("if (1) { 10 }", Some(10)),
        ("if (1 >= 2) { 10 }", None),
        ("if (1 >= 2) { 10 } else { 20 }", Some(20)),
        ("if (2 >= 1) { 10 } else { 20 }", Some(10)),
    ];

    for (input, expected) in scenarios {
        match expected {
            Some(expected) => expect_int(input, expected),
            None => expect_null(input),
        }
    }
}

#[test]
fn empty_consequence_yields_null() {
    expect_null("if (true) {}");
}

#[test]
fn return_statements() {
    let scenarios = [
        ("return 10;", 10),
        ("return 10; 9;", 10),
        ("return 2 * 5; 9;", 10),
        ("9; return 2 * 5; 9;", 10),
    ];

    for (input, expected) in scenarios {
        expect_int(input, expected);
    }
}

#[test]
fn switch_expressions() {
    let scenarios = [
        ("switch 5 { case 5: 1 }", Some(1)),
        ("switch 5 { case 4: 1 }", None),
        ("switch 5 { case 4: 1; default: 12 }", Some(12)),
        ("switch 6 { case 4: 1; case 6: 2; default: 12 }", Some(2)),
        ("switch 6 { case 4 + 2: 1; case 6: 2; default: 12 }", Some(1)),
        ("switch 1+5 { case 4 + 2: 1; case 6: 2; default: 12 }", Some(1)),
    ];

    for (input, expected) in scenarios {
        match expected {
            Some(expected) => expect_int(input, expected),
            None => expect_null(input),
        }
    }
}

#[test]
fn switch_on_strings() {
    expect_string("switch \"a\" { case \"a\": \"a\"; default: \"b\" }", "a");
    expect_string("switch \"c\" { case \"a\": \"a\"; default: \"b\" }", "b");
}

#[test]
fn switch_case_yielding_null() {
    expect_null("switch true { case true: NO!; case false: 2; }");
}

#[test]
fn switch_subject_is_evaluated_once() {
    let (value, output) = common::eval_with_output(
        "let f = fn() { puts(\"hit\"); return 2 };\nswitch f() { case 1: 10; case 2: 20; default: 30 }",
    );
    assert_eq!(value, Value::Integer(20));
    assert_eq!(output, "hit\n");
}

#[test]
fn switch_case_type_must_match_subject_type() {
    expect_error(
        "switch 5 { case \"a\": 1 }",
        "mismatched types in switch statement: INTEGER STRING",
    );
    expect_error(
        "switch \"a\" { case true: 1 }",
        "mismatched types in switch statement: STRING BOOLEAN",
    );
}

#[test]
fn recoverable_failure_via_pair_and_switch() {
    let input = "
let divide = fn(a, b) {
    return switch b {
        case 0: [NO!, \"cannot divide by zero\"];
        default: [a / b, \"\"];
    }
};
let result = divide(5, 0);
let x = switch result[1] {
    case \"\": result[0]
    default: result[1]
};
x";
    expect_string(input, "cannot divide by zero");
}

#[test]
fn let_produces_no_value() {
    assert_eq!(eval_input("let x = 5;"), Value::Null);
    expect_int("let a = 5; a;", 5);
    expect_int("let a = 5 * 5; a;", 25);
    expect_int("let a = 5; let b = a; b;", 5);
    expect_int("let a = 5; let b = a; let c = a + b + 5; c;", 15);
}
