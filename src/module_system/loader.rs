// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - composes resolver, fetcher, sandbox and cache
//!
//! One [`Loader`] per runtime instance, never a process-wide singleton, so
//! independent runtimes can coexist in one process (tests rely on this).

use crate::error::Result;
use crate::fs::SourceFetcher;
use crate::module_system::cache::{ModuleCache, ModuleRecord, RecordRef};
use crate::module_system::resolver::PathResolver;
use crate::module_system::sandbox::{Evaluate, ModuleScope, Require};
use crate::system::System;
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Module loader owning the cache and the shared search-path list
pub struct Loader {
    resolver: PathResolver,
    cache: ModuleCache,
    paths: Rc<RefCell<Vec<PathBuf>>>,
    fetcher: Rc<dyn SourceFetcher>,
    evaluator: Rc<dyn Evaluate>,
    system: Rc<System>,
    trace: Cell<bool>,
}

impl Loader {
    /// Create a loader over the given initial search paths
    pub fn new(
        initial_paths: Vec<PathBuf>,
        fetcher: Rc<dyn SourceFetcher>,
        evaluator: Rc<dyn Evaluate>,
        system: Rc<System>,
    ) -> Rc<Self> {
        Rc::new(Self {
            resolver: PathResolver::new(),
            cache: ModuleCache::new(),
            paths: Rc::new(RefCell::new(initial_paths)),
            fetcher,
            evaluator,
            system,
            trace: Cell::new(false),
        })
    }

    /// The require function for top-level (non-module) callers
    pub fn main_require(self: &Rc<Self>) -> Require {
        Require::new(Rc::clone(self), None)
    }

    /// Shared search-path list; order is resolution priority
    pub fn paths(&self) -> Rc<RefCell<Vec<PathBuf>>> {
        Rc::clone(&self.paths)
    }

    /// Enable or disable loader tracing
    pub fn set_trace(&self, on: bool) {
        self.trace.set(on);
    }

    /// The module cache
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Resolve an id relative to an optional requesting module path
    pub fn resolve(&self, id: &str, origin: Option<&Path>) -> Result<PathBuf> {
        let origin_dir = origin.and_then(Path::parent);
        let paths = self.paths.borrow();
        let resolved = self
            .resolver
            .resolve(id, origin_dir, paths.as_slice(), &*self.fetcher);
        if self.trace.get() {
            match &resolved {
                Ok(path) => debug!(id, path = %path.display(), "resolved"),
                Err(_) => debug!(id, "resolution failed"),
            }
        }
        resolved
    }

    /// Implement `require(id)`: resolve, then load once per resolved path
    ///
    /// A re-entrant require of a path whose evaluation is still in progress
    /// (circular require) receives the current, possibly incomplete exports
    /// object. A failed evaluation rolls the reservation back, so requiring
    /// the path again retries from scratch.
    pub fn require(self: &Rc<Self>, id: &str, origin: Option<&Path>) -> Result<Value> {
        let path = self.resolve(id, origin)?;
        let (record, fresh) = self.cache.reserve(&path, id);
        if !fresh {
            if self.trace.get() {
                let state = if record.borrow().loaded { "loaded" } else { "loading" };
                debug!(id, path = %path.display(), state, "cache hit");
            }
            return Ok(record.borrow().module.exports());
        }

        if self.trace.get() {
            debug!(id, path = %path.display(), "cache miss, evaluating");
        }
        match self.evaluate_into(&path, &record) {
            Ok(()) => {
                self.cache.commit(&path);
                Ok(record.borrow().module.exports())
            }
            Err(err) => {
                self.cache.rollback(&path);
                Err(err)
            }
        }
    }

    /// Implement `require.force(id)`: re-resolve and re-evaluate
    /// unconditionally, replacing whatever the cache held
    ///
    /// Any existing record stays in place until the new evaluation
    /// succeeds, so a failed force leaves the cache as it was.
    pub fn force(self: &Rc<Self>, id: &str, origin: Option<&Path>) -> Result<Value> {
        let path = self.resolve(id, origin)?;
        if self.trace.get() {
            debug!(id, path = %path.display(), "forced load");
        }
        let record = Rc::new(RefCell::new(ModuleRecord::reserved(path.clone(), id)));
        self.evaluate_into(&path, &record)?;
        self.cache.replace(&path, Rc::clone(&record));
        let exports = record.borrow().module.exports();
        Ok(exports)
    }

    /// True iff `id` resolves to a path whose record committed; drives the
    /// shutdown unload notification, which must only fire for modules that
    /// were actually pulled in
    pub fn is_loaded(&self, id: &str) -> bool {
        match self.resolve(id, None) {
            Ok(path) => self.cache.is_loaded(&path),
            Err(_) => false,
        }
    }

    /// Fetch, compile and run a module body against a reserved record
    fn evaluate_into(self: &Rc<Self>, path: &Path, record: &RecordRef) -> Result<()> {
        let source = self.fetcher.read(path)?;
        let filename = path.display().to_string();
        let body = self.evaluator.evaluate(&source, &filename, 1)?;

        let module = record.borrow().module.clone();
        let scope = ModuleScope {
            require: Require::new(Rc::clone(self), Some(path.to_path_buf())),
            exports: module.exports(),
            module,
            system: Rc::clone(&self.system),
            print: self.system.print_fn(),
        };
        body(&scope)
    }
}
