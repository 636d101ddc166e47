use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ast::NacDefinition;
use crate::value::{NacInstance, Value};

/// A handle to one scope in a chain. Cloning the handle shares the scope;
/// enclosing environments are reached through `outer`. Every store sits
/// behind its own lock because `map` workers walk and mutate chains
/// concurrently. Locks are only ever taken one scope at a time.
#[derive(Clone)]
pub struct Environment {
    scope: Arc<Scope>,
}

struct Scope {
    variables: Mutex<HashMap<String, Value>>,
    // Shared (not mirrored) into only-structs views, so nacs defined inside
    // a method body are visible to the scope the view was built from.
    nacs: Arc<Mutex<HashMap<String, Arc<NacDefinition>>>>,
    acknowledgements: Mutex<HashSet<String>>,
    current_instance: Mutex<Option<NacInstance>>,
    outer: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_outer(None)
    }

    pub fn new_enclosed(outer: &Environment) -> Self {
        Self::with_outer(Some(outer.clone()))
    }

    fn with_outer(outer: Option<Environment>) -> Self {
        Self {
            scope: Arc::new(Scope {
                variables: Mutex::new(HashMap::new()),
                nacs: Arc::new(Mutex::new(HashMap::new())),
                acknowledgements: Mutex::new(HashSet::new()),
                current_instance: Mutex::new(None),
                outer,
            }),
        }
    }

    /// A parallel chain that mirrors this chain's nac stores but carries no
    /// variable bindings. Method bodies run against such a view, which is
    /// what denies them access to enclosing locals.
    // TODO: support referring to enclosing variables from within a nac method
    pub fn only_structs(&self) -> Self {
        Self {
            scope: Arc::new(Scope {
                variables: Mutex::new(HashMap::new()),
                nacs: self.scope.nacs.clone(),
                acknowledgements: Mutex::new(HashSet::new()),
                current_instance: Mutex::new(None),
                outer: self.scope.outer.as_ref().map(Environment::only_structs),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(environment) = current {
            if let Some(value) = environment.scope.variables.lock().get(name) {
                return Some(value.clone());
            }
            current = environment.scope.outer.as_ref();
        }
        None
    }

    /// Declares `name` in this scope, shadowing any outer binding.
    pub fn declare(&self, name: &str, value: Value) {
        self.scope
            .variables
            .lock()
            .insert(name.to_string(), value);
    }

    /// Updates the nearest scope that already binds `name`. Declaration must
    /// have happened beforehand, anywhere in the chain.
    pub fn assign(&self, name: &str, value: Value) -> Result<Value, String> {
        let mut current = Some(self);
        while let Some(environment) = current {
            let mut variables = environment.scope.variables.lock();
            if variables.contains_key(name) {
                variables.insert(name.to_string(), value.clone());
                return Ok(value);
            }
            drop(variables);
            current = environment.scope.outer.as_ref();
        }
        Err(format!("{} has not been declared", name))
    }

    pub fn set_nac(&self, definition: Arc<NacDefinition>) {
        self.scope
            .nacs
            .lock()
            .insert(definition.name.clone(), definition);
    }

    pub fn get_nac(&self, name: &str) -> Option<Arc<NacDefinition>> {
        let mut current = Some(self);
        while let Some(environment) = current {
            if let Some(definition) = environment.scope.nacs.lock().get(name) {
                return Some(definition.clone());
            }
            current = environment.scope.outer.as_ref();
        }
        None
    }

    pub fn add_acknowledgement(&self, text: &str) {
        self.scope
            .acknowledgements
            .lock()
            .insert(text.to_string());
    }

    /// True iff some scope in the chain has restated the nac's privacy
    /// acknowledgement string.
    pub fn allows_private_access(&self, definition: &NacDefinition) -> bool {
        let Some(acknowledgement) = &definition.privacy_acknowledgement else {
            return false;
        };
        let mut current = Some(self);
        while let Some(environment) = current {
            if environment
                .scope
                .acknowledgements
                .lock()
                .contains(acknowledgement)
            {
                return true;
            }
            current = environment.scope.outer.as_ref();
        }
        false
    }

    pub fn set_current_instance(&self, instance: NacInstance) {
        *self.scope.current_instance.lock() = Some(instance);
    }

    /// True iff some scope in the chain binds exactly this instance as the
    /// one whose method body is executing.
    pub fn is_current_instance(&self, instance: &NacInstance) -> bool {
        let mut current = Some(self);
        while let Some(environment) = current {
            if environment
                .scope
                .current_instance
                .lock()
                .as_ref()
                .is_some_and(|candidate| candidate.ptr_eq(instance))
            {
                return true;
            }
            current = environment.scope.outer.as_ref();
        }
        false
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_get() {
        let env = Environment::new();
        env.declare("x", Value::Integer(42));
        assert_eq!(env.get("x"), Some(Value::Integer(42)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn get_walks_the_chain() {
        let outer = Environment::new();
        outer.declare("x", Value::Integer(1));
        let inner = Environment::new_enclosed(&outer);
        assert_eq!(inner.get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn declare_shadows_outer_binding() {
        let outer = Environment::new();
        outer.declare("x", Value::Integer(1));
        let inner = Environment::new_enclosed(&outer);
        inner.declare("x", Value::Integer(2));
        assert_eq!(inner.get("x"), Some(Value::Integer(2)));
        assert_eq!(outer.get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn assign_targets_the_declaring_scope() {
        let outer = Environment::new();
        outer.declare("x", Value::Integer(1));
        let inner = Environment::new_enclosed(&outer);
        inner.assign("x", Value::Integer(2)).unwrap();
        assert_eq!(outer.get("x"), Some(Value::Integer(2)));
    }

    #[test]
    fn assign_requires_declaration() {
        let env = Environment::new();
        let err = env.assign("x", Value::Integer(1)).unwrap_err();
        assert_eq!(err, "x has not been declared");
    }

    #[test]
    fn only_structs_hides_variables_but_shares_nacs() {
        use crate::token::{Token, TokenKind};

        let env = Environment::new();
        env.declare("x", Value::Integer(1));
        env.set_nac(Arc::new(NacDefinition {
            token: Token::new(TokenKind::Nac, "notaclass", 0, 1),
            name: "person".to_string(),
            privacy_acknowledgement: None,
            fields: Vec::new(),
            methods: indexmap::IndexMap::new(),
        }));

        let view = env.only_structs();
        assert_eq!(view.get("x"), None);
        assert!(view.get_nac("person").is_some());

        // definitions made through the view surface in the original chain
        view.set_nac(Arc::new(NacDefinition {
            token: Token::new(TokenKind::Nac, "notaclass", 0, 1),
            name: "other".to_string(),
            privacy_acknowledgement: None,
            fields: Vec::new(),
            methods: indexmap::IndexMap::new(),
        }));
        assert!(env.get_nac("other").is_some());
    }

    #[test]
    fn acknowledgements_are_inherited_from_outer_scopes() {
        let outer = Environment::new();
        outer.add_acknowledgement("this is bad");
        let inner = Environment::new_enclosed(&outer);

        let definition = NacDefinition {
            token: crate::token::Token::new(crate::token::TokenKind::Nac, "notaclass", 0, 1),
            name: "person".to_string(),
            privacy_acknowledgement: Some("this is bad".to_string()),
            fields: Vec::new(),
            methods: indexmap::IndexMap::new(),
        };
        assert!(inner.allows_private_access(&definition));

        let unacknowledged = NacDefinition {
            privacy_acknowledgement: Some("something else".to_string()),
            ..definition
        };
        assert!(!inner.allows_private_access(&unacknowledged));
    }
}
