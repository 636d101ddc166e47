use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::ast::{FunctionLiteral, NacDefinition, NacMethod};
use crate::interpreter::{Environment, Evaluator};

/// A runtime value. Containers are reference-shared and internally locked so
/// that values may cross `map` worker threads; mutation through one alias is
/// visible through every other.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Str(Arc<str>),
    Boolean(bool),
    Null,
    Array(Arc<Mutex<Vec<Value>>>),
    Hash(Arc<Mutex<IndexMap<HashKey, HashPair>>>),
    Function(Arc<FunctionObject>),
    Builtin(&'static Builtin),
    Method(Arc<MethodObject>),
    NacInstance(NacInstance),
    Lazy(Arc<crate::ast::Expression>),
    Return(Box<Value>),
    Error(String),
}

/// The computed key of a hash entry. Only integers, booleans and strings are
/// hashable; equality of keys coincides with equality of the values they
/// were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    Str(Arc<str>),
}

/// The original key is retained alongside the value for inspection.
#[derive(Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

pub struct FunctionObject {
    pub literal: Arc<FunctionLiteral>,
    pub env: Environment,
}

pub struct MethodObject {
    pub receiver: NacInstance,
    pub name: String,
    pub method: NacMethod,
}

pub type BuiltinFn = fn(&Evaluator, Vec<Value>) -> Value;

pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// A struct instance: a handle to a mutable cell holding the definition
/// pointer and the field map. The handle is the instance's identity; the
/// evolve hook swaps the cell contents while aliases keep observing it.
#[derive(Clone)]
pub struct NacInstance {
    state: Arc<Mutex<InstanceState>>,
}

struct InstanceState {
    nac: Arc<NacDefinition>,
    fields: IndexMap<String, Value>,
}

impl NacInstance {
    pub fn new(nac: Arc<NacDefinition>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InstanceState {
                nac,
                fields: IndexMap::new(),
            })),
        }
    }

    pub fn nac(&self) -> Arc<NacDefinition> {
        self.state.lock().nac.clone()
    }

    pub fn nac_name(&self) -> String {
        self.state.lock().nac.name.clone()
    }

    pub fn is_field(&self, name: &str) -> bool {
        self.state
            .lock()
            .nac
            .fields
            .iter()
            .any(|field| field.name == name)
    }

    pub fn is_public_field(&self, name: &str) -> bool {
        self.state
            .lock()
            .nac
            .fields
            .iter()
            .any(|field| field.name == name && field.public)
    }

    pub fn is_method(&self, name: &str) -> bool {
        self.state.lock().nac.methods.contains_key(name)
    }

    pub fn is_public_method(&self, name: &str) -> bool {
        self.state
            .lock()
            .nac
            .methods
            .get(name)
            .is_some_and(|method| method.public)
    }

    /// Unset fields read as Null.
    pub fn get_field(&self, name: &str) -> Value {
        self.state
            .lock()
            .fields
            .get(name)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.state.lock().fields.insert(name.to_string(), value);
    }

    /// Binds the named method to this instance, if the definition has it.
    pub fn method(&self, name: &str) -> Option<Value> {
        let method = self.state.lock().nac.methods.get(name).cloned()?;
        Some(Value::Method(Arc::new(MethodObject {
            receiver: self.clone(),
            name: name.to_string(),
            method,
        })))
    }

    /// Adopts the other instance's definition and field map in place,
    /// preserving this handle's identity.
    pub fn evolve_into(&self, other: &NacInstance) {
        if self.ptr_eq(other) {
            return;
        }
        let (nac, fields) = {
            let other = other.state.lock();
            (other.nac.clone(), other.fields.clone())
        };
        let mut state = self.state.lock();
        state.nac = nac;
        state.fields = fields;
    }

    pub fn ptr_eq(&self, other: &NacInstance) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn inspect(&self) -> String {
        let state = self.state.lock();
        let fields = state
            .fields
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value.inspect()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: {{{}}}", state.nac.name, fields)
    }
}

impl Value {
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    pub fn string(value: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(value.as_ref()))
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Arc::new(Mutex::new(elements)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Null and false are falsy; everything else, including 0 and "", is
    /// truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(value) => Some(HashKey::Integer(*value)),
            Value::Boolean(value) => Some(HashKey::Boolean(*value)),
            Value::Str(value) => Some(HashKey::Str(value.clone())),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Str(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Method(_) => "METHOD",
            Value::NacInstance(_) => "NAC_INSTANCE",
            Value::Lazy(_) => "LAZY",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(value) => value.to_string(),
            Value::Str(value) => value.to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::Null => "NO!".to_string(),
            Value::Array(elements) => {
                let rendered = elements
                    .lock()
                    .iter()
                    .map(Value::inspect)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", rendered)
            }
            Value::Hash(pairs) => {
                let rendered = pairs
                    .lock()
                    .values()
                    .map(|pair| format!("{}: {}", pair.key.inspect(), pair.value.inspect()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", rendered)
            }
            Value::Function(function) => function.literal.to_string(),
            Value::Builtin(builtin) => format!("builtin function {}", builtin.name),
            Value::Method(method) => format!(
                "({}) {} {}",
                method.receiver.nac_name(),
                method.name,
                method.method.function
            ),
            Value::NacInstance(instance) => instance.inspect(),
            Value::Lazy(expression) => format!("lazy({})", expression),
            Value::Return(value) => value.inspect(),
            Value::Error(message) => format!("ERROR: {}", message),
        }
    }
}

/// Equality follows the interpreter's identity rules: primitives compare by
/// value, containers and callables by the cell they point at.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Method(a), Value::Method(b)) => Arc::ptr_eq(a, b),
            (Value::NacInstance(a), Value::NacInstance(b)) => a.ptr_eq(b),
            (Value::Lazy(a), Value::Lazy(b)) => Arc::ptr_eq(a, b),
            (Value::Return(a), Value::Return(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.inspect(), self.type_name())
    }
}
