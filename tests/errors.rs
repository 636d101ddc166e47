mod common;

use common::{expect_error, expect_parse_error, parse_errors};

#[test]
fn identifier_rules_come_with_suggestions() {
    let scenarios = [
        (
            "REALLY_LONG_VARIABLE_NAME",
            "line 1, column 1 (REALLY_LONG_VARIABLE_NAME): Identifier must be at most eight characters long; consider using 'rlvn' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
        ),
        (
            "a_b",
            "line 1, column 1 (a_b): Identifier must not contain underscores; consider using 'ab' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
        ),
        (
            "abC",
            "line 1, column 1 (abC): Identifier must not contain uppercase characters; consider using 'abc' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
        ),
        (
            "let really_long_variable_name = 5",
            "line 1, column 5 (really_long_variable_name): Identifier must be at most eight characters long; consider using 'rlvn' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
        ),
        (
            "notaclass me { field really_long_variable_name }",
            "line 1, column 22 (really_long_variable_name): Identifier must be at most eight characters long; consider using 'rlvn' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
        ),
        (
            "notaclass me { really_long_variable_name fn() { return 5 } }",
            "line 1, column 16 (really_long_variable_name): Identifier must be at most eight characters long; consider using 'rlvn' instead.\nSee https://github.com/jesseduffield/ok#familiarity-admits-brevity",
        ),
    ];

    for (input, expected) in scenarios {
        expect_parse_error(input, expected);
    }
}

#[test]
fn conforming_identifiers_are_accepted() {
    assert_eq!(parse_errors("abcdfghi"), Vec::<String>::new());
    assert_eq!(parse_errors("a?a"), Vec::<String>::new());
}

#[test]
fn reserved_comparison_operators_explain_themselves() {
    expect_parse_error(
        "a < b",
        "line 1, column 3 (<): Unexpected token '<'. There is only one comparison operator: '>='.\nSee https://github.com/jesseduffield/ok#one-comparison-operator",
    );
    expect_parse_error(
        "a == b",
        "line 1, column 3 (==): Unexpected token '=='. There is only one comparison operator: '>='.\nSee https://github.com/jesseduffield/ok#one-comparison-operator",
    );
}

#[test]
fn other_unexpected_tokens_are_reported_plainly() {
    expect_parse_error("a ** b", "line 1, column 4 (*): Unexpected token '*'");
    expect_parse_error("a * b\nb ** c", "line 2, column 4 (*): Unexpected token '*'");
}

#[test]
fn logical_operands_must_be_variables() {
    expect_parse_error(
        "a && b()",
        "line 1, column 7 (b()): Right operand of logical expression must be a variable. Consider storing 'b()' in a variable",
    );
    expect_parse_error(
        "a() && b",
        "line 1, column 2 (a()): Left operand of logical expression must be a variable. Consider storing 'a()' in a variable",
    );
    expect_parse_error(
        "a && true",
        "line 1, column 6 (true): Right operand of logical expression must be a variable. Consider storing 'true' in a variable",
    );
}

#[test]
fn switch_blocks_are_capped_at_one_statement() {
    expect_parse_error(
        "switch x { case true: x; y; default: x; }",
        "line 1, column 26 (y): switch blocks can only contain a single statement. If you want to include multiple statements, use a function call\nSee https://github.com/jesseduffield/ok#readable-switches",
    );
}

#[test]
fn public_nac_fields_are_rejected() {
    expect_parse_error(
        "notaclass person { public field name }",
        "line 1, column 20 (public): public nac fields are not permitted",
    );
}

#[test]
fn out_of_range_integer_literals() {
    expect_parse_error(
        "999999999999999999999999999",
        "line 1, column 1 (999999999999999999999999999): '999999999999999999999999999' is not a valid integer",
    );
}

#[test]
fn peek_mismatches_name_both_kinds() {
    expect_parse_error(
        "let 5 = 3",
        "line 1, column 5 (5): expected next token to be IDENT, got INT instead",
    );
}

#[test]
fn runtime_error_values() {
    expect_error("foobar", "identifier not found: foobar");
    expect_error("5 + true;", "type mismatch: INTEGER + BOOLEAN");
    expect_error("-true", "unknown operator: -BOOLEAN");
}

#[test]
fn runtime_errors_become_the_terminal_value() {
    // the error produced mid-program wins over later statements
    expect_error("let a = 5; missing; a", "identifier not found: missing");
}

#[test]
fn error_values_inspect_with_a_prefix() {
    let value = common::eval_input("foobar");
    assert_eq!(value.inspect(), "ERROR: identifier not found: foobar");
}
