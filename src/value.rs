// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Dynamic values carried by module exports
//!
//! Every module owns an `exports` object. Objects have shared interior
//! mutability: mutation after a reference has been handed out is visible to
//! every holder, which is what lets circular requires observe properties a
//! module defines after the circular call returned.

use crate::error::{Result, RuntimeError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A native function callable from module bodies
pub type NativeFunction = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// Shared object storage; cloning a handle aliases the same map
pub type ObjectRef = Rc<RefCell<HashMap<String, Value>>>;

/// A dynamic value held in a module's exports
#[derive(Clone)]
pub enum Value {
    /// Absent value
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Double-precision number
    Number(f64),
    /// Immutable string
    Str(String),
    /// Shared mutable object
    Object(ObjectRef),
    /// Native function
    Function(NativeFunction),
}

impl Value {
    /// Create a fresh empty object
    pub fn object() -> Self {
        Self::Object(Rc::new(RefCell::new(HashMap::new())))
    }

    /// Wrap a string
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Wrap a native function
    pub fn function(f: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
        Self::Function(Rc::new(f))
    }

    /// True for `Undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Read a property; `Undefined` when absent or when `self` is not an object
    pub fn get(&self, key: &str) -> Value {
        match self {
            Self::Object(map) => map.borrow().get(key).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    /// Write a property; fails when `self` is not an object
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<()> {
        match self {
            Self::Object(map) => {
                map.borrow_mut().insert(key.into(), value);
                Ok(())
            }
            other => Err(RuntimeError::generic(format!(
                "cannot set property on {}",
                other.type_name()
            ))),
        }
    }

    /// Invoke as a function
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match self {
            Self::Function(f) => f(args),
            other => Err(RuntimeError::NotAFunction(other.type_name().to_string())),
        }
    }

    /// Name of the value's kind, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Object(map) => {
                let map = map.borrow();
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {:?}", map[k.as_str()])?;
                }
                write!(f, "}}")
            }
            Self::Function(_) => write!(f, "[function]"),
        }
    }
}

/// Objects and functions compare by identity, primitives by value
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
