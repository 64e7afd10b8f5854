//! Persistent variable environment.
//!
//! An [`Environment`] is a chain of frames, each binding one name to one value. Extending
//! returns a new head in front of the existing chain and leaves the original untouched, so
//! any number of environments can share a common tail. Frames are never mutated, which
//! makes sharing across threads safe without locks.

use std::sync::Arc;

use crate::Error;
use crate::ast::Value;

#[derive(Debug)]
struct Frame {
    name: String,
    value: Value,
    next: Option<Arc<Frame>>,
}

impl Drop for Frame {
    fn drop(&mut self) {
        // Release uniquely owned frames one at a time instead of recursing down the chain
        let mut next = self.next.take();
        while let Some(frame) = next {
            match Arc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Chain of name to value bindings, searched front to back
#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Arc<Frame>>,
}

impl Environment {
    /// The empty environment
    pub fn new() -> Self {
        Environment { head: None }
    }

    /// A new environment binding `name` to `value` in front of this one.
    /// A binding for a name already present shadows the older one.
    pub fn extend(&self, name: impl Into<String>, value: Value) -> Environment {
        Environment {
            head: Some(Arc::new(Frame {
                name: name.into(),
                value,
                next: self.head.clone(),
            })),
        }
    }

    /// The value of the newest binding for `name`, if any
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings()
            .find(|(bound, _)| *bound == name)
            .map(|(_, value)| value)
    }

    pub fn lookup(&self, name: &str) -> Result<Value, Error> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundVariable(name.to_owned()))
    }

    /// Resolve a symbol object; anything other than a `Symbol` is a type mismatch
    pub fn lookup_symbol(&self, symbol: &Value) -> Result<Value, Error> {
        match symbol.as_symbol() {
            Some(name) => self.lookup(name),
            None => Err(Error::TypeMismatch(format!(
                "lookup expects a symbol, got {}",
                symbol.type_name()
            ))),
        }
    }

    /// All bindings from newest to oldest, shadowed ones included
    pub fn bindings(&self) -> Bindings<'_> {
        Bindings {
            current: self.head.as_deref(),
        }
    }

    /// Number of frames in the chain
    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// Iterator over the frames of an [`Environment`]
pub struct Bindings<'a> {
    current: Option<&'a Frame>,
}

impl<'a> Iterator for Bindings<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.current?;
        self.current = frame.next.as_deref();
        Some((frame.name.as_str(), &frame.value))
    }
}

pub fn empty_environment() -> Environment {
    Environment::new()
}

pub fn extend(env: &Environment, name: &str, value: Value) -> Environment {
    env.extend(name, value)
}

pub fn lookup(env: &Environment, name: &str) -> Result<Value, Error> {
    env.lookup(name)
}
