//! This module defines the symbolic object model: the [`Value`] enum with its five
//! variants (`Null`, `Pair`, `Symbol`, `Integer`, `Void`) and the [`Pair`] cell that
//! lists are built from. Each pair is its own heap allocation owned by its parent, so
//! values form trees and no cycle can be constructed.
//!
//! Values built in code can be nested arbitrarily deep in either slot, so `Clone`,
//! `PartialEq` and `Drop` work from explicit worklists and never recurse. `Debug` walks the
//! `rest` spine with a loop and only recurses into `first`.
//!
//! Ergonomic helpers such as [`sym`], [`int`], [`nil`], [`cons`] and [`list`], plus
//! `From` conversions from Rust integers, arrays and vectors, make building values in
//! code and tests short.

use std::fmt;
use std::mem;

use crate::Error;

/// Type alias for integer values
pub type IntegerType = i64;

/// A two-slot cell. A pair whose `rest` is neither a pair nor `Null` ends an improper list.
pub struct Pair {
    first: Value,
    rest: Value,
}

impl Pair {
    pub fn new(first: Value, rest: Value) -> Self {
        Pair { first, rest }
    }

    pub fn first(&self) -> &Value {
        &self.first
    }

    pub fn rest(&self) -> &Value {
        &self.rest
    }

    /// Take both slots out of the pair
    pub fn into_parts(mut self) -> (Value, Value) {
        (mem::take(&mut self.first), mem::take(&mut self.rest))
    }
}

impl Drop for Pair {
    fn drop(&mut self) {
        if !self.first.is_pair() && !self.rest.is_pair() {
            return;
        }
        // Detach child pairs onto a worklist so that no drop recurses, whatever the shape
        let mut pending: Vec<Box<Pair>> = Vec::new();
        for slot in [&mut self.first, &mut self.rest] {
            if let Value::Pair(pair) = mem::take(slot) {
                pending.push(pair);
            }
        }
        while let Some(mut pair) = pending.pop() {
            for slot in [&mut pair.first, &mut pair.rest] {
                if let Value::Pair(child) = mem::take(slot) {
                    pending.push(child);
                }
            }
        }
    }
}

/// Symbolic object
///
/// Note: `Void` never compares equal to anything, itself included. It marks
/// "nothing meaningful" and has no identity worth comparing.
#[derive(Default)]
pub enum Value {
    /// The empty list
    #[default]
    Null,
    Pair(Box<Pair>),
    /// Identifier, compared case-sensitively by text
    Symbol(String),
    Integer(IntegerType),
    /// Sentinel with no payload; printed as a diagnostic marker
    Void,
}

impl Value {
    pub fn cons(first: Value, rest: Value) -> Value {
        Value::Pair(Box::new(Pair::new(first, rest)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Value::Pair(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// True for `Null` and for chains of pairs that end in `Null`
    pub fn is_list(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                Value::Null => return true,
                Value::Pair(pair) => current = &pair.rest,
                _ => return false,
            }
        }
    }

    /// The `first` slot of a pair (classically `car`)
    pub fn first(&self) -> Result<&Value, Error> {
        match self {
            Value::Pair(pair) => Ok(&pair.first),
            other => Err(Error::TypeMismatch(format!(
                "first expects a pair, got {}",
                other.type_name()
            ))),
        }
    }

    /// The `rest` slot of a pair (classically `cdr`)
    pub fn rest(&self) -> Result<&Value, Error> {
        match self {
            Value::Pair(pair) => Ok(&pair.rest),
            other => Err(Error::TypeMismatch(format!(
                "rest expects a pair, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<IntegerType> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Pair(_) => "pair",
            Value::Symbol(_) => "symbol",
            Value::Integer(_) => "integer",
            Value::Void => "void",
        }
    }

    /// Iterate over the elements of a list spine.
    ///
    /// For an improper list the final non-pair tail is not yielded; use
    /// [`ListIter::tail`] after exhausting the iterator to inspect it.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { current: self }
    }
}

/// Iterator over the `first` slots of a chain of pairs
pub struct ListIter<'a> {
    current: &'a Value,
}

impl<'a> ListIter<'a> {
    /// The part of the chain not yet consumed
    pub fn tail(&self) -> &'a Value {
        self.current
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self.current {
            Value::Pair(pair) => {
                self.current = &pair.rest;
                Some(&pair.first)
            }
            _ => None,
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        enum Task<'a> {
            Copy(&'a Value),
            /// Pop the copied `rest` and `first` and join them into a pair
            Join,
        }

        let mut tasks = vec![Task::Copy(self)];
        let mut built: Vec<Value> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                Task::Copy(Value::Pair(pair)) => {
                    tasks.push(Task::Join);
                    tasks.push(Task::Copy(&pair.rest));
                    tasks.push(Task::Copy(&pair.first));
                }
                Task::Copy(Value::Null) => built.push(Value::Null),
                Task::Copy(Value::Symbol(s)) => built.push(Value::Symbol(s.clone())),
                Task::Copy(Value::Integer(n)) => built.push(Value::Integer(*n)),
                Task::Copy(Value::Void) => built.push(Value::Void),
                Task::Join => {
                    let rest = built.pop().unwrap_or_default();
                    let first = built.pop().unwrap_or_default();
                    built.push(Value::cons(first, rest));
                }
            }
        }
        built.pop().unwrap_or_default()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Value::Pair(x), Value::Pair(y)) => {
                    pending.push((&x.rest, &y.rest));
                    pending.push((&x.first, &y.first));
                }
                (Value::Null, Value::Null) => {}
                (Value::Symbol(x), Value::Symbol(y)) if x == y => {}
                (Value::Integer(x), Value::Integer(y)) if x == y => {}
                // Differing variants or contents; Void lands here even against itself
                _ => return false,
            }
        }
        true
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current = self;
        let mut open_pairs = 0usize;
        loop {
            match current {
                Value::Pair(pair) => {
                    write!(f, "Pair({:?}, ", pair.first)?;
                    open_pairs += 1;
                    current = &pair.rest;
                    continue;
                }
                Value::Null => write!(f, "Null")?,
                Value::Symbol(s) => write!(f, "Symbol({s})")?,
                Value::Integer(n) => write!(f, "Integer({n})")?,
                Value::Void => write!(f, "Void")?,
            }
            break;
        }
        for _ in 0..open_pairs {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::print(self))
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Integer(IntegerType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(IntegerType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        list(v.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        list(arr.into_iter().map(Into::into))
    }
}

impl TryFrom<Value> for IntegerType {
    type Error = Error;

    fn try_from(value: Value) -> Result<IntegerType, Error> {
        value.as_integer().ok_or_else(|| {
            Error::TypeMismatch(format!("expected integer, got {}", value.type_name()))
        })
    }
}

/// Helper for creating symbols. Accepts both &str and String
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

pub fn int(n: IntegerType) -> Value {
    Value::Integer(n)
}

/// The empty list
pub fn nil() -> Value {
    Value::Null
}

pub fn cons(first: impl Into<Value>, rest: impl Into<Value>) -> Value {
    Value::cons(first.into(), rest.into())
}

/// Build a proper list from the given elements
pub fn list<I>(elements: I) -> Value
where
    I: IntoIterator<Item = Value>,
    I::IntoIter: DoubleEndedIterator,
{
    elements
        .into_iter()
        .rev()
        .fold(Value::Null, |rest, first| Value::cons(first, rest))
}
