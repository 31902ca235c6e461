use std::collections::hash_map::Entry;

use ahash::HashMap;
use tracing::debug;

use crate::error::EvalError;
use crate::poly::{monomial::Variable, polynomial::Polynomial};

/// Variable bindings. Bindings are append-only: a name can be bound once and
/// is never rebound or removed. Iteration follows the order of definition.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    index: HashMap<Variable, usize>,
    bindings: Vec<(Variable, Polynomial)>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    pub fn get(&self, name: &str) -> Option<&Polynomial> {
        self.index.get(name).map(|&i| &self.bindings[i].1)
    }

    /// Bind `name` to `value`. Fails if `name` is already bound, in which case
    /// the environment is unchanged.
    pub fn insert(&mut self, name: Variable, value: Polynomial) -> Result<(), EvalError> {
        match self.index.entry(name) {
            Entry::Occupied(o) => {
                debug!("Rejected redefinition of {}", o.key());
                Err(EvalError::DuplicateDefinition(o.key().clone()))
            }
            Entry::Vacant(v) => {
                let name = v.key().clone();
                v.insert(self.bindings.len());
                self.bindings.push((name, value));
                Ok(())
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Polynomial)> {
        self.bindings.iter().map(|(n, p)| (n, p))
    }
}
