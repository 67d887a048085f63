//! Host-owned binding sets.

use crate::env::Scope;
use crate::value::Value;

/// A name → value mapping shared between the host and the interpreter.
///
/// During an evaluation this frame is the program's top-level scope, so
/// top-level `var` and `function` declarations land here and stay visible
/// to the host and to later evaluations. Cloning yields another handle to
/// the same bindings.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    frame: Scope,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.frame.get_local(name)
    }

    /// Insert or overwrite a binding, returning the previous value.
    pub fn insert(&self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.frame.set_local(name, value.into())
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.frame.remove_local(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.frame.contains_local(name)
    }

    pub fn len(&self) -> usize {
        self.frame.local_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binding names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.frame.local_names()
    }

    pub(crate) fn scope(&self) -> &Scope {
        &self.frame
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name.as_ref(), value);
        }
        bindings
    }
}
