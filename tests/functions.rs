mod common;

use common::{eval_input, expect_bool, expect_error, expect_int};
use ok_lang::value::Value;

#[test]
fn function_application() {
    let scenarios = [
        ("let identity = fn(x) { x; }; identity(5);", 5),
        ("let identity = fn(x) { return x; }; identity(5);", 5),
        ("let double = fn(x) { x * 2; }; double(5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
        ("fn(x) { x; }(5)", 5),
    ];

    for (input, expected) in scenarios {
        expect_int(input, expected);
    }
}

#[test]
fn function_values_inspect_as_source() {
    let value = eval_input("fn(x) { x + 2; };");
    match &value {
        Value::Function(_) => {}
        other => panic!("expected a function, got {:?}", other),
    }
    assert_eq!(value.inspect(), "fn(x) { (x + 2) }");
}

#[test]
fn closures_capture_their_defining_scope() {
    let input = "
let newadder = fn(x) {
fn(y) { x + y };
};

let addtwo = newadder(2);
addtwo(2);";
    expect_int(input, 4);
}

#[test]
fn closures_write_through_to_captured_bindings() {
    expect_int(
        "let counter = 0; let bump = fn() { counter = counter + 1 }; bump(); bump(); counter",
        2,
    );
}

#[test]
fn calling_a_non_function_errors() {
    expect_error("let x = 5; x(1)", "not a function: INTEGER");
    expect_error("\"a\"()", "not a function: STRING");
}

#[test]
fn arity_mismatches_error_cleanly() {
    expect_error(
        "let add = fn(x, y) { x + y }; add(1)",
        "wrong number of arguments: want=2, got=1",
    );
    expect_error(
        "let id = fn(x) { x }; id(1, 2)",
        "wrong number of arguments: want=1, got=2",
    );
}

#[test]
fn argument_errors_short_circuit_the_call() {
    expect_error("let id = fn(x) { x }; id(missing)", "identifier not found: missing");
}

#[test]
fn map_applies_a_function_to_each_element() {
    let input = "
let arr = [1,2,3];
arr = map(arr, fn(e) { e * 2 }); // [2,4,6]
arr[1]
";
    expect_int(input, 4);
}

#[test]
fn map_passes_the_index_to_two_parameter_functions() {
    let input = "
let result = map([0,1], fn(e, i) {
    switch i {
    case 0:
        return 5 * 2;
    case 1:
        return 10 * 3;
    }
})
result[0]
";
    expect_int(input, 10);
    let input = "
let result = map([0,1], fn(e, i) {
    switch i {
    case 0:
        return 5 * 2;
    case 1:
        return 10 * 3;
    }
})
result[1]
";
    expect_int(input, 30);
}

#[test]
fn map_preserves_input_order_and_length() {
    expect_int("len(map([1,2,3,4,5,6,7,8], fn(e) { e }))", 8);
    expect_int("first(map([9,2,3], fn(e) { e + 1 }))", 10);
    expect_int("last(map([9,2,3], fn(e) { e + 1 }))", 4);
}

#[test]
fn map_workers_share_the_captured_environment() {
    let input = "
let every = fn(arr, check) {
    let fail = false;
    map(arr, fn(e) {
        switch check(e) { case true: fail = true; } }
    )
    return !fail;
};

every([5,2,4,1,3], fn(e) { return e >= 2 })
";
    expect_bool(input, false);
}

#[test]
fn map_does_not_mutate_its_input() {
    expect_int("let arr = [1,2,3]; map(arr, fn(e) { e * 2 }); arr[1]", 2);
}

#[test]
fn map_argument_validation() {
    expect_error(
        "map(5, fn(e) { e })",
        "First argument to `map` must be ARRAY, got INTEGER",
    );
    expect_error(
        "map([1], 5)",
        "Second argument to `map` must be FUNCTION, got INTEGER",
    );
    expect_error(
        "map([1], fn() { 1 })",
        "Function must have 1 or 2 parameters, got 0",
    );
    expect_error(
        "map([1], fn(a, b, c) { 1 })",
        "Function must have 1 or 2 parameters, got 3",
    );
}

#[test]
fn sleep_requires_an_integer() {
    expect_error(
        "sleep(\"1\")",
        "argument to `sleep` must be INTEGER, got STRING",
    );
}

#[test]
fn builtins_can_be_shadowed_by_bindings() {
    expect_int("let len = 5; len", 5);
}
