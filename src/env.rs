//! Immutable linked-list environment. Frames are never mutated after
//! they're visible to more than their own construction site; extending
//! scope always allocates a new frame and returns a fresh `Rc` pointing at
//! the parent. Closures capture the frame reference at definition time,
//! so later bindings in the defining scope never leak into an already-
//! captured closure.
//!
//! The one exception is letrec-style recursive bindings
//! (`extend_recursive`/`bind_recursive`): a frame is created with its
//! value still unset so a binding's own right-hand side can capture the
//! frame that will eventually hold it, then the value is filled in once
//! it's been computed. This is what makes `fact = n -> ... fact (n - 1)`
//! and self-referential objects like `obj = { x: obj.x }` resolvable at
//! all — without it, the right-hand side would close over a frame that
//! never mentions the name being defined.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{closest_match, ErrorKind, LazyError};
use crate::value::Value;

#[derive(Debug)]
pub struct Environment {
    name: Option<String>,
    value: RefCell<Option<Value>>,
    parent: Option<Rc<Environment>>,
}

/// What a name resolves to in a frame: a real value, or a letrec
/// placeholder that hasn't been filled in yet (referenced before its own
/// definition finished evaluating).
enum Binding {
    Found(Value),
    Placeholder,
}

impl Environment {
    /// The empty root environment; real programs extend this with
    /// built-ins and auto-imported module bindings before evaluating user
    /// code.
    pub fn root() -> Rc<Environment> {
        Rc::new(Environment { name: None, value: RefCell::new(None), parent: None })
    }

    /// Returns a new environment with `name` bound to `value`, parented on
    /// `self`. Shadowing a name already visible in the chain is allowed;
    /// lookup finds the nearest (most recently extended) binding.
    pub fn extend(self: &Rc<Self>, name: impl Into<String>, value: Value) -> Rc<Environment> {
        Rc::new(Environment { name: Some(name.into()), value: RefCell::new(Some(value)), parent: Some(Rc::clone(self)) })
    }

    /// Extends with `name` left unbound, for letrec construction: callers
    /// evaluate the binding's right-hand side against the *returned*
    /// environment (so it can refer to its own name), then call
    /// `bind_recursive` on that same environment once the value exists.
    pub fn extend_recursive(self: &Rc<Self>, name: impl Into<String>) -> Rc<Environment> {
        Rc::new(Environment { name: Some(name.into()), value: RefCell::new(None), parent: Some(Rc::clone(self)) })
    }

    /// Fills in the value of the frame `extend_recursive` created. Must be
    /// called on that exact environment before it's used for anything but
    /// building closures/thunks that merely capture it.
    pub fn bind_recursive(&self, value: Value) {
        *self.value.borrow_mut() = Some(value);
    }

    fn find(&self, name: &str) -> Option<Binding> {
        let mut frame = self;
        loop {
            if frame.name.as_deref() == Some(name) {
                return Some(match frame.value.borrow().clone() {
                    Some(value) => Binding::Found(value),
                    None => Binding::Placeholder,
                });
            }
            frame = frame.parent.as_deref()?;
        }
    }

    /// Returns the nearest binding for `name`, or `None` if it isn't
    /// bound — callers that need to distinguish "not found" from "found
    /// but still a letrec placeholder" should use `resolve` instead.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self.find(name) {
            Some(Binding::Found(value)) => Some(value),
            _ => None,
        }
    }

    /// All names currently visible in the chain, nearest first, used to
    /// build "did you mean" suggestions for `UnknownIdentifier`.
    pub fn known_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut frame = self;
        loop {
            if let Some(name) = &frame.name {
                names.push(name.clone());
            }
            match &frame.parent {
                Some(parent) => frame = parent,
                None => break,
            }
        }
        names
    }

    pub fn resolve(self: &Rc<Self>, name: &str) -> Result<Value, LazyError> {
        match self.find(name) {
            Some(Binding::Found(value)) => Ok(value),
            Some(Binding::Placeholder) => Err(LazyError::new(
                ErrorKind::CyclicReference,
                format!("`{name}` referenced its own definition before that definition was ready"),
            )),
            None => {
                let known = self.known_names();
                let mut err = LazyError::new(ErrorKind::UnknownIdentifier, format!("unknown identifier `{name}`"));
                err.context.suggestion = closest_match(name, &known);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_nearest_binding() {
        let root = Environment::root();
        let outer = root.extend("x", Value::Integer(1));
        let inner = outer.extend("x", Value::Integer(2));
        assert!(matches!(inner.lookup("x"), Some(Value::Integer(2))));
        assert!(matches!(outer.lookup("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Environment::root();
        let outer = root.extend("x", Value::Integer(1));
        let inner = outer.extend("y", Value::Integer(2));
        assert!(matches!(inner.lookup("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn lookup_missing_is_none() {
        let root = Environment::root();
        assert!(root.lookup("missing").is_none());
    }

    #[test]
    fn extending_does_not_mutate_parent() {
        let root = Environment::root();
        let outer = root.extend("x", Value::Integer(1));
        let _inner = outer.extend("x", Value::Integer(99));
        assert!(matches!(outer.lookup("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn recursive_binding_resolves_once_filled() {
        let root = Environment::root();
        let extended = root.extend_recursive("x");
        extended.bind_recursive(Value::Integer(7));
        assert!(matches!(extended.lookup("x"), Some(Value::Integer(7))));
    }

    #[test]
    fn unfilled_recursive_binding_raises_cyclic_reference() {
        let root = Environment::root();
        let extended = root.extend_recursive("x");
        let err = extended.resolve("x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicReference);
    }
}
