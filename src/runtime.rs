// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime bootstrap
//!
//! Glue around the module core: builds the initial search paths from an
//! installation prefix, constructs one [`Loader`], force-loads the runtime's
//! own `system` module, scans package prefixes for the program being run,
//! and fires the `unload` hook at shutdown. The core performs no recovery;
//! this is the only layer allowed to log-and-continue.

use crate::error::{Result, RuntimeError};
use crate::fs::{OsFs, SourceFetcher};
use crate::module_system::{Evaluate, Loader, ModuleHandle, ModuleScope, Require, DEFAULT_MAIN};
use crate::script::LineEvaluator;
use crate::system::System;
use crate::value::Value;
use serde::Deserialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::warn;

/// One module runtime instance
///
/// Several runtimes can coexist in a process; nothing here is global.
pub struct Runtime {
    loader: Rc<Loader>,
    system: Rc<System>,
    evaluator: Rc<dyn Evaluate>,
    /// Package roots governing the program, most specific first
    package_prefixes: RefCell<Vec<PathBuf>>,
}

impl Runtime {
    /// Create a runtime over the real file system and the bundled
    /// line-directive evaluator
    pub fn new(prefix: PathBuf, args: Vec<String>) -> Self {
        let fs: Rc<dyn SourceFetcher> = Rc::new(OsFs);
        let system = Rc::new(System::new(prefix, args, fs));
        Self::with_parts(system, Rc::new(LineEvaluator))
    }

    /// Create a runtime from explicit collaborators; hosts inject their own
    /// engine and file system view here
    pub fn with_parts(system: Rc<System>, evaluator: Rc<dyn Evaluate>) -> Self {
        let paths = initial_paths(&system);
        let loader = Loader::new(
            paths,
            Rc::clone(&system.fs),
            Rc::clone(&evaluator),
            Rc::clone(&system),
        );
        let package_prefixes = RefCell::new(vec![system.prefix.clone()]);

        let runtime = Self {
            loader,
            system,
            evaluator,
            package_prefixes,
        };

        // the system module describes the runtime itself; its absence only
        // costs the modules that would have read it
        if let Err(err) = runtime.loader.force("system", None) {
            warn!(%err, "couldn't load the system module");
        }
        runtime
    }

    /// The loader backing this runtime
    pub fn loader(&self) -> &Rc<Loader> {
        &self.loader
    }

    /// Process metadata shared with every module
    pub fn system(&self) -> &Rc<System> {
        &self.system
    }

    /// The top-level require function
    pub fn require_fn(&self) -> Require {
        self.loader.main_require()
    }

    /// Require a module from top level
    pub fn require(&self, id: &str) -> Result<Value> {
        self.loader.require(id, None)
    }

    /// Prepend a directory to the search paths (the `-I` option); must
    /// happen before requiring anything that depends on it
    pub fn include(&self, dir: PathBuf) {
        self.loader.paths().borrow_mut().insert(0, dir);
    }

    /// Evaluate inline source (the `-e` option) in a scratch module scope;
    /// returns the scratch module's exports
    pub fn eval(&self, source: &str) -> Result<Value> {
        let body = self.evaluator.evaluate(source, "<eval>", 1)?;
        let module = ModuleHandle::new("<eval>", Path::new("<eval>"));
        let scope = ModuleScope {
            require: self.loader.main_require(),
            exports: module.exports(),
            module: module.clone(),
            system: Rc::clone(&self.system),
            print: self.system.print_fn(),
        };
        body(&scope)?;
        Ok(module.exports())
    }

    /// Load the program at `path`
    ///
    /// Ancestor directories carrying a `package.json` become package
    /// prefixes, most specific first. A program directory must itself carry
    /// a manifest and runs its `main` (default `main`).
    pub fn run_program(&self, path: &Path) -> Result<Value> {
        let fs = &self.system.fs;
        let program = fs.canonicalize(path);
        self.register_package_prefixes(&program);

        if fs.is_directory(&program) {
            let manifest_path = program.join("package.json");
            if !fs.is_file(&manifest_path) {
                return Err(RuntimeError::MissingManifest(program));
            }
            self.package_prefixes.borrow_mut().insert(0, program.clone());

            let text = fs.read(&manifest_path)?;
            let manifest: ProgramManifest =
                serde_json::from_str(&text).map_err(|source| RuntimeError::InvalidManifest {
                    path: manifest_path,
                    source,
                })?;
            let main = manifest.main.as_deref().unwrap_or(DEFAULT_MAIN);
            let entry = program.join(main);
            self.loader.require(&entry.display().to_string(), None)
        } else {
            self.loader.require(&program.display().to_string(), None)
        }
    }

    /// Package roots governing the current program, most specific first
    pub fn package_prefixes(&self) -> Vec<PathBuf> {
        self.package_prefixes.borrow().clone()
    }

    /// Shutdown sequence: notify the `unload` module iff it was actually
    /// pulled in during the run
    pub fn finish(&self) -> Result<()> {
        if self.loader.is_loaded("unload") {
            let exports = self.loader.require("unload", None)?;
            match exports.get("send") {
                Value::Function(send) => {
                    send(&[])?;
                }
                _ => return Err(RuntimeError::NotAFunction("unload.send".to_string())),
            }
        }
        Ok(())
    }

    /// Unshift every ancestor of the program that carries a manifest onto
    /// the package-prefix list, keeping more specific directories first
    fn register_package_prefixes(&self, program: &Path) {
        let fs = &self.system.fs;
        let found: Vec<PathBuf> = program
            .ancestors()
            .skip(1)
            .filter(|dir| fs.is_file(&dir.join("package.json")))
            .map(Path::to_path_buf)
            .collect();

        let mut prefixes = self.package_prefixes.borrow_mut();
        for dir in found.into_iter().rev() {
            prefixes.insert(0, dir);
        }
    }
}

/// Layered search paths for a prefix: shared stdlib and lib first, then the
/// per-platform overlays
fn initial_paths(system: &System) -> Vec<PathBuf> {
    let mut paths = vec![system.prefix.join("stdlib"), system.prefix.join("lib")];
    for platform in &system.platforms {
        let root = system.prefix.join("platforms").join(platform);
        paths.push(root.join("stdlib"));
        paths.push(root.join("lib"));
    }
    paths
}

/// The subset of a program manifest the bootstrap reads
#[derive(Debug, Deserialize)]
struct ProgramManifest {
    main: Option<String>,
}
