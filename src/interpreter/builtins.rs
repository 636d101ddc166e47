use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::value::{Builtin, Value};

use super::evaluator::Evaluator;

static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: len,
    },
    Builtin {
        name: "first",
        func: first,
    },
    Builtin {
        name: "last",
        func: last,
    },
    Builtin {
        name: "rest",
        func: rest,
    },
    Builtin {
        name: "push",
        func: push,
    },
    Builtin {
        name: "puts",
        func: puts,
    },
    Builtin {
        name: "ayok?",
        func: ayok,
    },
    Builtin {
        name: "sleep",
        func: sleep,
    },
    Builtin {
        name: "map",
        func: map,
    },
];

/// Built-ins are consulted only after the environment chain misses, so user
/// bindings shadow them.
pub fn lookup(name: &str) -> Option<Value> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .map(Value::Builtin)
}

fn len(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Value::Array(elements) => Value::Integer(elements.lock().len() as i64),
        Value::Str(value) => Value::Integer(value.len() as i64),
        other => Value::error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

fn first(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Value::Array(elements) => elements.lock().first().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn last(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Value::Array(elements) => elements.lock().last().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn rest(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Value::Array(elements) => {
            let elements = elements.lock();
            if elements.is_empty() {
                Value::Null
            } else {
                Value::array(elements[1..].to_vec())
            }
        }
        other => Value::error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

/// Returns a new array; the input is left untouched.
fn push(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 2 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=2",
            args.len()
        ));
    }

    match &args[0] {
        Value::Array(elements) => {
            let mut extended = elements.lock().clone();
            extended.push(args[1].clone());
            Value::array(extended)
        }
        other => Value::error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn puts(evaluator: &Evaluator, args: Vec<Value>) -> Value {
    for arg in &args {
        evaluator.write_inspected(arg);
    }
    Value::Null
}

fn ayok(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    Value::Boolean(!matches!(args[0], Value::Null))
}

fn sleep(_evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Value::Integer(seconds) => {
            if *seconds > 0 {
                thread::sleep(Duration::from_secs(*seconds as u64));
            }
            Value::Null
        }
        other => Value::error(format!(
            "argument to `sleep` must be INTEGER, got {}",
            other.type_name()
        )),
    }
}

/// Applies the function to every element concurrently, one worker thread per
/// element, and joins them all. Results land in a fresh array in input
/// order; execution order across workers is unspecified. A two-parameter
/// function also receives the element's index.
fn map(evaluator: &Evaluator, args: Vec<Value>) -> Value {
    if args.len() != 2 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=2",
            args.len()
        ));
    }

    let Value::Array(elements) = &args[0] else {
        return Value::error(format!(
            "First argument to `map` must be ARRAY, got {}",
            args[0].type_name()
        ));
    };
    let Value::Function(function) = &args[1] else {
        return Value::error(format!(
            "Second argument to `map` must be FUNCTION, got {}",
            args[1].type_name()
        ));
    };

    let parameter_count = function.literal.parameters.len();
    if !(1..=2).contains(&parameter_count) {
        return Value::error(format!(
            "Function must have 1 or 2 parameters, got {}",
            parameter_count
        ));
    }

    let snapshot: Vec<Value> = elements.lock().clone();

    let results: Vec<Value> = thread::scope(|scope| {
        let workers: Vec<_> = snapshot
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let function = Arc::clone(function);
                scope.spawn(move || {
                    let mut call_args = vec![element];
                    if parameter_count == 2 {
                        call_args.push(Value::Integer(index as i64));
                    }
                    evaluator.apply_user_function(&function, call_args)
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| {
                worker
                    .join()
                    .unwrap_or_else(|_| Value::error("map worker panicked"))
            })
            .collect()
    });

    Value::array(results)
}
