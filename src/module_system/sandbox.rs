// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-module execution context
//!
//! A module body never sees the loader directly. It receives a
//! [`ModuleScope`] with exactly the bindings the module surface defines:
//! `require`, `exports`, `module`, `system` and `print`. The host evaluation
//! primitive is the injected [`Evaluate`] capability, so a real engine, the
//! bundled script dialect, or a test fake can all drive the same loader.

use crate::error::Result;
use crate::module_system::loader::Loader;
use crate::system::{PrintFn, System};
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Host evaluation primitive
///
/// Turns source text plus a file name into a callable module body. This is
/// the single seam between the module core and whatever actually executes
/// code.
pub trait Evaluate {
    /// Compile source into a module body, without running it
    fn evaluate(&self, source: &str, filename: &str, start_line: u32) -> Result<ModuleBody>;
}

/// Compiled-but-unbound module body; bound to a scope at invocation time
pub type ModuleBody = Box<dyn Fn(&ModuleScope) -> Result<()>>;

/// The fixed set of bindings injected into a module body
pub struct ModuleScope {
    /// The require function, bound to this module's location
    pub require: Require,
    /// The module's exports object, as of the start of evaluation
    pub exports: Value,
    /// The `module` binding; `module.exports` is reassignable
    pub module: ModuleHandle,
    /// Process metadata
    pub system: Rc<System>,
    /// Convenience alias for the system print sink
    pub print: PrintFn,
}

/// The `module` object handed to a body
///
/// Shared interior: the loader reads `exports` back after the body ran, so a
/// module may replace `module.exports` wholesale instead of mutating the
/// original object.
#[derive(Clone)]
pub struct ModuleHandle(Rc<RefCell<ModuleInner>>);

struct ModuleInner {
    id: String,
    filename: PathBuf,
    exports: Value,
}

impl ModuleHandle {
    /// Create a handle with a fresh empty exports object
    pub fn new(id: &str, filename: &Path) -> Self {
        Self(Rc::new(RefCell::new(ModuleInner {
            id: id.to_string(),
            filename: filename.to_path_buf(),
            exports: Value::object(),
        })))
    }

    /// The id the module was first required as
    pub fn id(&self) -> String {
        self.0.borrow().id.clone()
    }

    /// Resolved path of the module's source
    pub fn filename(&self) -> PathBuf {
        self.0.borrow().filename.clone()
    }

    /// Current exports value
    pub fn exports(&self) -> Value {
        self.0.borrow().exports.clone()
    }

    /// Replace the exports value wholesale
    pub fn set_exports(&self, value: Value) {
        self.0.borrow_mut().exports = value;
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("ModuleHandle")
            .field("id", &inner.id)
            .field("filename", &inner.filename)
            .finish_non_exhaustive()
    }
}

/// The require function produced for one module
///
/// Cheap to clone; every clone shares the loader and its cache. The origin
/// is the requesting module's resolved path, used to anchor relative ids.
#[derive(Clone)]
pub struct Require {
    loader: Rc<Loader>,
    origin: Option<PathBuf>,
}

impl Require {
    pub(crate) fn new(loader: Rc<Loader>, origin: Option<PathBuf>) -> Self {
        Self { loader, origin }
    }

    /// Load a module and return its exports
    pub fn call(&self, id: &str) -> Result<Value> {
        self.loader.require(id, self.origin.as_deref())
    }

    /// Load a module unconditionally, bypassing the cache
    ///
    /// Used once at startup to pull in the runtime's own `system` module
    /// before the cache is warm.
    pub fn force(&self, id: &str) -> Result<Value> {
        self.loader.force(id, self.origin.as_deref())
    }

    /// Resolve an id without loading it
    pub fn resolve(&self, id: &str) -> Result<PathBuf> {
        self.loader.resolve(id, self.origin.as_deref())
    }

    /// The shared search-path list; prepending takes effect for every
    /// subsequent require in the runtime
    pub fn paths(&self) -> Rc<RefCell<Vec<PathBuf>>> {
        self.loader.paths()
    }

    /// Whether the id resolves to a committed record
    pub fn is_loaded(&self, id: &str) -> bool {
        self.loader.is_loaded(id)
    }

    /// The loader this require is bound to
    pub fn loader(&self) -> &Rc<Loader> {
        &self.loader
    }
}
