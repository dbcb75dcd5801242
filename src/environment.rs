use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Name resolution as seen by the interpreter.
pub trait Scope {
    /// The value bound to `name`, searching enclosing scopes outward.
    fn resolve(&self, name: &str) -> Option<Value>;

    /// Bind `name` in this scope, shadowing any outer binding.
    fn define(&mut self, name: &str, value: Value);
}

/// A chained hash map scope.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Is `name` bound directly in this scope (not an enclosing one)?
    pub fn is_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl Scope for Environment {
    fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().resolve(name)
        } else {
            None
        }
    }

    fn define(&mut self, name: &str, value: Value) {
        trace!("Defining '{}' = {}", name, value);

        self.values.insert(name.to_string(), value);
    }
}

impl<S: Scope + ?Sized> Scope for Box<S> {
    fn resolve(&self, name: &str) -> Option<Value> {
        (**self).resolve(name)
    }

    fn define(&mut self, name: &str, value: Value) {
        (**self).define(name, value)
    }
}
