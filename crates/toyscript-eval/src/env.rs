//! Lexical scope chain.
//!
//! Each [`Scope`] is one frame of bindings with a strong link to its parent.
//! Blocks, catch clauses and function activations push child frames; a frame
//! lives as long as some child or host handle still points at it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::trace;

use crate::value::Value;

/// Failure of a scope operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("Identifier {0} already declared in current scope")]
    AlreadyDeclared(String),
    #[error("Identifier {0} is not declared")]
    NotDeclared(String),
}

#[derive(Default)]
struct Frame {
    bindings: IndexMap<String, Value>,
    parent: Option<Scope>,
}

/// Shared handle to one frame of the scope chain.
#[derive(Clone, Default)]
pub struct Scope(Rc<RefCell<Frame>>);

/// Non-owning handle to a frame, held by closures.
#[derive(Clone, Default)]
pub struct WeakScope(Weak<RefCell<Frame>>);

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.0.upgrade().map(Scope)
    }
}

impl Scope {
    /// A frame with no parent.
    pub fn root() -> Self {
        Scope::default()
    }

    /// A new frame whose parent is `self`.
    pub fn child(&self) -> Self {
        Scope(Rc::new(RefCell::new(Frame {
            bindings: IndexMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.clone()
    }

    /// Re-link this frame under another parent (or detach it with `None`).
    pub fn set_parent(&self, parent: Option<Scope>) {
        self.0.borrow_mut().parent = parent;
    }

    /// Declare `name` in this frame. Shadowing an outer frame is fine;
    /// redeclaring within the same frame is not.
    pub fn declare(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        let mut frame = self.0.borrow_mut();
        if frame.bindings.contains_key(name) {
            return Err(ScopeError::AlreadyDeclared(name.to_string()));
        }
        trace!(name, "declare");
        frame.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// The innermost frame, starting at `self`, that declares `name`.
    pub fn resolve(&self, name: &str) -> Option<Scope> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if scope.0.borrow().bindings.contains_key(name) {
                return Some(scope);
            }
            current = scope.parent();
        }
        None
    }

    pub fn read(&self, name: &str) -> Result<Value, ScopeError> {
        self.resolve(name)
            .and_then(|scope| scope.get_local(name))
            .ok_or_else(|| ScopeError::NotDeclared(name.to_string()))
    }

    pub fn write(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        let scope = self
            .resolve(name)
            .ok_or_else(|| ScopeError::NotDeclared(name.to_string()))?;
        scope.set_local(name, value);
        Ok(())
    }

    // ── Frame-local access ───────────────────────────────────────────────

    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.0.borrow().bindings.get(name).cloned()
    }

    /// Insert or overwrite `name` in this frame, returning the previous value.
    pub fn set_local(&self, name: &str, value: Value) -> Option<Value> {
        self.0.borrow_mut().bindings.insert(name.to_string(), value)
    }

    pub fn remove_local(&self, name: &str) -> Option<Value> {
        self.0.borrow_mut().bindings.shift_remove(name)
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// Names declared in this frame, in declaration order.
    pub fn local_names(&self) -> Vec<String> {
        self.0.borrow().bindings.keys().cloned().collect()
    }

    pub fn local_len(&self) -> usize {
        self.0.borrow().bindings.len()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scope").field(&self.local_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_read() {
        let scope = Scope::root();
        scope.declare("x", Value::Int(1)).unwrap();
        assert_eq!(scope.read("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_redeclare_in_same_frame_fails() {
        let scope = Scope::root();
        scope.declare("x", Value::Int(1)).unwrap();
        let err = scope.declare("x", Value::Int(2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Identifier x already declared in current scope"
        );
    }

    #[test]
    fn test_shadowing_across_frames() {
        let outer = Scope::root();
        outer.declare("x", Value::Int(1)).unwrap();
        let inner = outer.child();
        inner.declare("x", Value::Int(2)).unwrap();
        assert_eq!(inner.read("x").unwrap(), Value::Int(2));
        assert_eq!(outer.read("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_write_updates_declaring_frame() {
        let outer = Scope::root();
        outer.declare("x", Value::Int(1)).unwrap();
        let inner = outer.child();
        inner.write("x", Value::Int(5)).unwrap();
        assert_eq!(outer.get_local("x"), Some(Value::Int(5)));
        assert!(!inner.contains_local("x"));
    }

    #[test]
    fn test_missing_name() {
        let scope = Scope::root().child();
        assert_eq!(
            scope.read("b").unwrap_err(),
            ScopeError::NotDeclared("b".into())
        );
        assert_eq!(
            scope.write("b", Value::Null).unwrap_err().to_string(),
            "Identifier b is not declared"
        );
    }

    #[test]
    fn test_resolve_finds_innermost() {
        let root = Scope::root();
        root.declare("a", Value::Null).unwrap();
        let mid = root.child();
        mid.declare("a", Value::Null).unwrap();
        let leaf = mid.child();
        assert!(leaf.resolve("a").unwrap().ptr_eq(&mid));
        assert!(leaf.resolve("zzz").is_none());
    }

    #[test]
    fn test_weak_handle_does_not_keep_frame_alive() {
        let frame = Scope::root();
        let weak = frame.downgrade();
        assert!(weak.upgrade().is_some());
        drop(frame);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_reparenting() {
        let a = Scope::root();
        a.declare("from_a", Value::Int(1)).unwrap();
        let frame = Scope::root();
        assert!(frame.read("from_a").is_err());
        frame.set_parent(Some(a));
        assert_eq!(frame.read("from_a").unwrap(), Value::Int(1));
        frame.set_parent(None);
        assert!(frame.read("from_a").is_err());
    }

    #[test]
    fn test_local_names_keep_declaration_order() {
        let scope = Scope::root();
        for name in ["z", "a", "m"] {
            scope.declare(name, Value::Null).unwrap();
        }
        assert_eq!(scope.local_names(), vec!["z", "a", "m"]);
        scope.remove_local("a");
        assert_eq!(scope.local_names(), vec!["z", "m"]);
        assert_eq!(scope.local_len(), 2);
    }
}
