use std::io::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::ast::{BlockStatement, Expression, Program, Statement, SwitchCase};
use crate::value::{FunctionObject, HashPair, MethodObject, NacInstance, Value};

use super::builtins;
use super::environment::Environment;

const ACKNOWLEDGE_PREFIX: &str = "I acknowledge that ";

/// Walks a parsed program. Evaluation of any node yields a plain value, an
/// `Error` value, or a `Return` sentinel; the latter two short-circuit
/// enclosing blocks until something unwraps or surfaces them.
///
/// The evaluator is cheap to clone and safe to share across the `map`
/// built-in's worker threads; `puts` output is funnelled through one locked
/// writer sink.
#[derive(Clone)]
pub struct Evaluator {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Evaluator {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub(crate) fn write_inspected(&self, value: &Value) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{}", value.inspect());
    }

    pub fn eval_program(&self, program: &Program, env: &Environment) -> Value {
        let mut result = Value::Null;

        for statement in &program.statements {
            match self.eval_statement(statement, env) {
                Value::Return(value) => return *value,
                error @ Value::Error(_) => return error,
                value => result = value,
            }
        }

        result
    }

    fn eval_statement(&self, statement: &Statement, env: &Environment) -> Value {
        match statement {
            Statement::Let { name, value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                env.declare(&name.value, value);
                Value::Null
            }
            Statement::Return { value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                Value::Return(Box::new(value))
            }
            Statement::Expression { expression, .. } => match expression {
                Some(expression) => self.eval_expression(expression, env),
                None => Value::Null,
            },
            Statement::Comment { text, .. } => {
                if let Some(acknowledgement) = text.strip_prefix(ACKNOWLEDGE_PREFIX) {
                    env.add_acknowledgement(acknowledgement);
                }
                Value::Null
            }
            Statement::Nac(definition) => {
                env.set_nac(definition.clone());
                Value::Null
            }
        }
    }

    fn eval_block(&self, block: &BlockStatement, env: &Environment) -> Value {
        let mut result = Value::Null;

        for statement in &block.statements {
            match self.eval_statement(statement, env) {
                value @ (Value::Return(_) | Value::Error(_)) => return value,
                value => result = value,
            }
        }

        result
    }

    fn eval_expression(&self, expression: &Expression, env: &Environment) -> Value {
        match expression {
            Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
            Expression::StringLiteral { value, .. } => Value::string(value),
            Expression::BooleanLiteral { value, .. } => Value::Boolean(*value),
            Expression::NullLiteral { .. } => Value::Null,
            Expression::Identifier(identifier) => self.eval_identifier(&identifier.value, env),
            Expression::Prefix {
                operator, right, ..
            } => self.eval_prefix_expression(operator, right, env),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => match operator.as_str() {
                "=" => self.eval_assignment_expression(left, right, env),
                "&&" => {
                    let left = self.eval_expression(left, env);
                    if left.is_error() {
                        return left;
                    }
                    if !left.is_truthy() {
                        return Value::Boolean(false);
                    }
                    let right = self.eval_expression(right, env);
                    if right.is_error() {
                        return right;
                    }
                    Value::Boolean(right.is_truthy())
                }
                "||" => {
                    let left = self.eval_expression(left, env);
                    if left.is_error() {
                        return left;
                    }
                    if left.is_truthy() {
                        return Value::Boolean(true);
                    }
                    let right = self.eval_expression(right, env);
                    if right.is_error() {
                        return right;
                    }
                    Value::Boolean(right.is_truthy())
                }
                _ => {
                    let left = self.eval_expression(left, env);
                    if left.is_error() {
                        return left;
                    }
                    let right = self.eval_expression(right, env);
                    if right.is_error() {
                        return right;
                    }
                    self.eval_infix_expression(operator, left, right)
                }
            },
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_error() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Value::Null
                }
            }
            Expression::Switch {
                subject,
                cases,
                default,
                ..
            } => self.eval_switch_expression(subject, cases, default.as_ref(), env),
            Expression::FunctionLiteral(literal) => Value::Function(Arc::new(FunctionObject {
                literal: literal.clone(),
                env: env.clone(),
            })),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let function = self.eval_expression(function, env);
                if function.is_error() {
                    return function;
                }
                let args = match self.eval_expressions(arguments, env) {
                    Ok(args) => args,
                    Err(error) => return error,
                };
                self.apply_function(function, args, env)
            }
            Expression::ArrayLiteral { elements, .. } => {
                match self.eval_expressions(elements, env) {
                    Ok(elements) => Value::array(elements),
                    Err(error) => error,
                }
            }
            Expression::HashLiteral { pairs, .. } => self.eval_hash_literal(pairs, env),
            Expression::Index { left, index, .. } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(index, env);
                if index.is_error() {
                    return index;
                }
                self.eval_index_expression(left, index)
            }
            // constructor arguments are accepted syntactically but ignored;
            // initialisation happens through an init method by convention
            Expression::New { nac_name, .. } => match env.get_nac(nac_name) {
                Some(definition) => Value::NacInstance(NacInstance::new(definition)),
                None => Value::error(format!("undefined nac {}", nac_name)),
            },
            Expression::MemberAccess { left, member, .. } => {
                self.eval_member_access(left, member, env)
            }
            Expression::Lazy { right, .. } => Value::Lazy(right.clone()),
        }
    }

    fn eval_identifier(&self, name: &str, env: &Environment) -> Value {
        if let Some(value) = env.get(name) {
            if let Value::Lazy(expression) = value {
                // memoise the thunk into whichever scope holds the binding
                let unwrapped = self.eval_expression(&expression, env);
                let _ = env.assign(name, unwrapped.clone());
                return unwrapped;
            }
            return value;
        }

        if let Some(builtin) = builtins::lookup(name) {
            return builtin;
        }

        Value::error(format!("identifier not found: {}", name))
    }

    fn eval_prefix_expression(
        &self,
        operator: &str,
        right: &Expression,
        env: &Environment,
    ) -> Value {
        let right = self.eval_expression(right, env);
        if right.is_error() {
            return right;
        }

        match operator {
            "!" => match right {
                Value::Boolean(true) => Value::Boolean(false),
                Value::Boolean(false) | Value::Null => Value::Boolean(true),
                _ => Value::Boolean(false),
            },
            "-" => match right {
                Value::Integer(value) => Value::Integer(value.wrapping_neg()),
                other => Value::error(format!("unknown operator: -{}", other.type_name())),
            },
            _ => Value::error(format!(
                "unknown operator: {}{}",
                operator,
                right.type_name()
            )),
        }
    }

    fn eval_infix_expression(&self, operator: &str, left: Value, right: Value) -> Value {
        match (&left, &right) {
            (Value::Integer(l), Value::Integer(r)) => {
                self.eval_integer_infix_expression(operator, *l, *r)
            }
            (Value::Str(l), Value::Str(r)) => {
                let (l, r) = (l.clone(), r.clone());
                self.eval_string_infix_expression(operator, &l, &r)
            }
            // for booleans, NO!, nacs, hashes and arrays, >= (and the
            // internal ==) hold exactly when both sides are the same object
            _ if operator == ">=" || operator == "==" => Value::Boolean(left == right),
            _ if left.type_name() != right.type_name() => Value::error(format!(
                "type mismatch: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
            _ => Value::error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        }
    }

    fn eval_integer_infix_expression(&self, operator: &str, left: i64, right: i64) -> Value {
        match operator {
            "+" => Value::Integer(left.wrapping_add(right)),
            "-" => Value::Integer(left.wrapping_sub(right)),
            "*" => Value::Integer(left.wrapping_mul(right)),
            "/" => match left.checked_div(right) {
                Some(quotient) => Value::Integer(quotient),
                None => Value::error("division by zero"),
            },
            ">=" => Value::Boolean(left >= right),
            // allowed internally for switch dispatch, illegal in the lexer
            "==" => Value::Boolean(left == right),
            _ => Value::error(format!("unknown operator: INTEGER {} INTEGER", operator)),
        }
    }

    fn eval_string_infix_expression(&self, operator: &str, left: &str, right: &str) -> Value {
        match operator {
            "+" => Value::string(format!("{}{}", left, right)),
            ">=" => Value::Boolean(left >= right),
            // allowed internally for switch dispatch, illegal in the lexer
            "==" => Value::Boolean(left == right),
            _ => Value::error(format!("unknown operator: STRING {} STRING", operator)),
        }
    }

    fn eval_assignment_expression(
        &self,
        target: &Expression,
        value: &Expression,
        env: &Environment,
    ) -> Value {
        let value = self.eval_expression(value, env);
        if value.is_error() {
            return value;
        }

        match target {
            Expression::Identifier(identifier) => {
                match env.assign(&identifier.value, value) {
                    Ok(value) => value,
                    Err(message) => Value::error(message),
                }
            }
            Expression::Index { left, index, .. } => {
                let key = self.eval_expression(index, env);
                if key.is_error() {
                    return key;
                }
                let container = self.eval_expression(left, env);
                if container.is_error() {
                    return container;
                }

                match container {
                    Value::Array(elements) => {
                        let Value::Integer(index) = key else {
                            return Value::error("Index must be an integer");
                        };
                        if index < 0 {
                            return Value::error("Index must be positive");
                        }
                        let mut elements = elements.lock();
                        if index as usize >= elements.len() {
                            return Value::error(format!(
                                "Index {} is out of bounds (array length {})",
                                index,
                                elements.len()
                            ));
                        }
                        elements[index as usize] = value.clone();
                        value
                    }
                    Value::Hash(pairs) => {
                        let Some(hash_key) = key.hash_key() else {
                            return Value::error(format!(
                                "Unusable as hash key: {}",
                                key.type_name()
                            ));
                        };
                        pairs.lock().insert(
                            hash_key,
                            HashPair {
                                key,
                                value: value.clone(),
                            },
                        );
                        value
                    }
                    Value::Null => Value::error("Attempted index of NULL object"),
                    _ => Value::error(format!(
                        "`{}` is neither a hash nor array so you cannot index into it",
                        left
                    )),
                }
            }
            Expression::MemberAccess { left, member, .. } => {
                let receiver = self.eval_expression(left, env);
                if receiver.is_error() {
                    return receiver;
                }
                let Value::NacInstance(instance) = receiver else {
                    return Value::error(format!("`{}` is not a nac instance", left));
                };

                if instance.is_method(member) {
                    return Value::error(format!(
                        "`{}` is a method, not a field, on nac {}. You cannot reassign it",
                        member,
                        instance.nac_name()
                    ));
                }
                if !instance.is_field(member) {
                    return Value::error(format!(
                        "undefined field for nac {}: {}",
                        instance.nac_name(),
                        member
                    ));
                }
                if !instance.is_public_field(member)
                    && !env.is_current_instance(&instance)
                    && !env.allows_private_access(&instance.nac())
                {
                    return Value::error(format!(
                        "`{}` is a private field on nac {}",
                        member,
                        instance.nac_name()
                    ));
                }

                instance.set_field(member, value.clone());
                value
            }
            _ => Value::error("LHS must be an identifier or index expression"),
        }
    }

    fn eval_switch_expression(
        &self,
        subject: &Expression,
        cases: &[SwitchCase],
        default: Option<&BlockStatement>,
        env: &Environment,
    ) -> Value {
        let subject = self.eval_expression(subject, env);
        if subject.is_error() {
            return subject;
        }

        for case in cases {
            let value = self.eval_expression(&case.value, env);
            if value.type_name() != subject.type_name() {
                return Value::error(format!(
                    "mismatched types in switch statement: {} {}",
                    subject.type_name(),
                    value.type_name()
                ));
            }
            if self.eval_infix_expression("==", subject.clone(), value) == Value::Boolean(true) {
                return self.eval_block(&case.block, env);
            }
        }

        if let Some(default) = default {
            return self.eval_block(default, env);
        }

        Value::Null
    }

    fn eval_hash_literal(
        &self,
        pairs: &[(Expression, Expression)],
        env: &Environment,
    ) -> Value {
        let mut evaluated = IndexMap::new();

        for (key_node, value_node) in pairs {
            let key = self.eval_expression(key_node, env);
            if key.is_error() {
                return key;
            }
            let Some(hash_key) = key.hash_key() else {
                return Value::error(format!("unusable as hash key: {}", key.type_name()));
            };

            let value = self.eval_expression(value_node, env);
            if value.is_error() {
                return value;
            }

            evaluated.insert(hash_key, HashPair { key, value });
        }

        Value::Hash(Arc::new(Mutex::new(evaluated)))
    }

    fn eval_index_expression(&self, left: Value, index: Value) -> Value {
        match (&left, &index) {
            (Value::Array(elements), Value::Integer(position)) => {
                let elements = elements.lock();
                if *position < 0 || *position as usize >= elements.len() {
                    Value::Null
                } else {
                    elements[*position as usize].clone()
                }
            }
            (Value::Hash(pairs), _) => {
                let Some(hash_key) = index.hash_key() else {
                    return Value::error(format!(
                        "unusable as hash key: {}",
                        index.type_name()
                    ));
                };
                pairs
                    .lock()
                    .get(&hash_key)
                    .map(|pair| pair.value.clone())
                    .unwrap_or(Value::Null)
            }
            _ => Value::error(format!(
                "index operator not supported: {}",
                left.type_name()
            )),
        }
    }

    fn eval_member_access(
        &self,
        left: &Expression,
        member: &str,
        env: &Environment,
    ) -> Value {
        let receiver = self.eval_expression(left, env);
        if receiver.is_error() {
            return receiver;
        }
        let Value::NacInstance(instance) = receiver else {
            return Value::error(format!("`{}` is not a nac", left));
        };

        if instance.is_field(member) {
            if !instance.is_public_field(member)
                && !env.is_current_instance(&instance)
                && !env.allows_private_access(&instance.nac())
            {
                return Value::error(format!(
                    "`{}` is a private field on nac {}",
                    member,
                    instance.nac_name()
                ));
            }
            instance.get_field(member)
        } else if instance.is_method(member) {
            if !instance.is_public_method(member)
                && !env.is_current_instance(&instance)
                && !env.allows_private_access(&instance.nac())
            {
                return Value::error(format!(
                    "`{}` is a private method on nac {}",
                    member,
                    instance.nac_name()
                ));
            }
            match instance.method(member) {
                Some(method) => method,
                None => Value::Null,
            }
        } else {
            Value::error(format!(
                "undefined field for nac {}: {}",
                instance.nac_name(),
                member
            ))
        }
    }

    fn eval_expressions(
        &self,
        expressions: &[Expression],
        env: &Environment,
    ) -> Result<Vec<Value>, Value> {
        let mut results = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = self.eval_expression(expression, env);
            if value.is_error() {
                return Err(value);
            }
            results.push(value);
        }
        Ok(results)
    }

    pub(crate) fn apply_function(
        &self,
        function: Value,
        args: Vec<Value>,
        env: &Environment,
    ) -> Value {
        match function {
            Value::Function(function) => self.apply_user_function(&function, args),
            Value::Method(method) => {
                let method_env = match self.create_method_env(&method, args, env) {
                    Ok(method_env) => method_env,
                    Err(error) => return error,
                };
                let evaluated = self.eval_block(&method.method.function.body, &method_env);

                if let Some(error) = self.run_evolve_hook(&method.receiver, env) {
                    return error;
                }

                unwrap_return_value(evaluated)
            }
            Value::Builtin(builtin) => (builtin.func)(self, args),
            other => Value::error(format!("not a function: {}", other.type_name())),
        }
    }

    pub(crate) fn apply_user_function(
        &self,
        function: &FunctionObject,
        args: Vec<Value>,
    ) -> Value {
        let parameters = &function.literal.parameters;
        if parameters.len() != args.len() {
            return Value::error(format!(
                "wrong number of arguments: want={}, got={}",
                parameters.len(),
                args.len()
            ));
        }

        let env = Environment::new_enclosed(&function.env);
        for (parameter, arg) in parameters.iter().zip(args) {
            env.declare(&parameter.value, arg);
        }

        unwrap_return_value(self.eval_block(&function.literal.body, &env))
    }

    /// Method bodies run against the only-structs view of the call site's
    /// chain. When the first parameter is literally `selfish` it receives
    /// the instance; the remaining parameters take the call arguments.
    fn create_method_env(
        &self,
        method: &MethodObject,
        args: Vec<Value>,
        env: &Environment,
    ) -> Result<Environment, Value> {
        let method_env = env.only_structs();

        let parameters = &method.method.function.parameters;
        let takes_receiver = parameters
            .first()
            .is_some_and(|parameter| parameter.value == "selfish");

        let expected = parameters.len() - usize::from(takes_receiver);
        if args.len() != expected {
            return Err(Value::error(format!(
                "wrong number of arguments: want={}, got={}",
                expected,
                args.len()
            )));
        }

        let value_parameters = if takes_receiver {
            method_env.declare(
                "selfish",
                Value::NacInstance(method.receiver.clone()),
            );
            &parameters[1..]
        } else {
            &parameters[..]
        };
        for (parameter, arg) in value_parameters.iter().zip(args) {
            method_env.declare(&parameter.value, arg);
        }

        method_env.set_current_instance(method.receiver.clone());

        Ok(method_env)
    }

    /// Runs the receiver's `evolve` method, if it defines one, after a
    /// user-invoked method returns. An instance result swaps the receiver's
    /// definition and fields in place; Null means no change. The hook is
    /// only fired from user-invoked dispatch, so evolve itself cannot
    /// retrigger it.
    fn run_evolve_hook(&self, instance: &NacInstance, env: &Environment) -> Option<Value> {
        let Some(Value::Method(evolve)) = instance.method("evolve") else {
            return None;
        };

        let method_env = match self.create_method_env(&evolve, Vec::new(), env) {
            Ok(method_env) => method_env,
            Err(error) => return Some(error),
        };
        let outcome =
            unwrap_return_value(self.eval_block(&evolve.method.function.body, &method_env));

        match outcome {
            Value::Null => None,
            Value::NacInstance(next) => {
                instance.evolve_into(&next);
                None
            }
            other => Some(Value::error(format!(
                "evolve method must return NO! or a nac instance, returned {}: {}",
                other.type_name(),
                other.inspect()
            ))),
        }
    }
}

fn unwrap_return_value(value: Value) -> Value {
    match value {
        Value::Return(inner) => *inner,
        value => value,
    }
}
