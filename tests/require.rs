// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! End-to-end require() behavior over a real file system

use beluga::module_system::{Evaluate, ModuleBody, ModuleScope};
use beluga::{LineEvaluator, OsFs, Runtime, RuntimeError, SourceFetcher, System, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Temp prefix with a lib/ directory on the search path
struct Fixture {
    prefix: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let prefix = tempfile::tempdir().unwrap();
        fs::create_dir_all(prefix.path().join("lib")).unwrap();
        Self { prefix }
    }

    fn write(&self, rel: &str, source: &str) -> PathBuf {
        let path = self.prefix.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, source).unwrap();
        path
    }

    fn runtime(&self) -> Runtime {
        Runtime::new(self.prefix.path().to_path_buf(), vec![])
    }

    /// Runtime whose print sink appends to the returned buffer
    fn capturing_runtime(&self) -> (Runtime, Rc<RefCell<Vec<String>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let fs_view: Rc<dyn SourceFetcher> = Rc::new(OsFs);
        let system = System::new(self.prefix.path().to_path_buf(), vec![], fs_view)
            .with_print(Rc::new(move |line| sink.borrow_mut().push(line.to_string())));
        let runtime = Runtime::with_parts(Rc::new(system), Rc::new(LineEvaluator));
        (runtime, lines)
    }
}

#[test]
fn identity_shared_across_ids() {
    // a bare id and an absolute id naming the same file share one
    // exports object
    let fx = Fixture::new();
    let file = fx.write("lib/target.js", "export tag \"t\"\n");
    let runtime = fx.runtime();

    let by_name = runtime.require("target").unwrap();
    let by_path = runtime
        .require(&OsFs.canonicalize(&file).display().to_string())
        .unwrap();

    assert_eq!(by_name, by_path);
    assert_eq!(runtime.loader().cache().len(), 1);
}

#[test]
fn top_level_runs_once() {
    // the module body executes exactly once across repeated requires
    let fx = Fixture::new();
    fx.write("lib/counter.js", "print tick\nexport ready true\n");
    let (runtime, lines) = fx.capturing_runtime();

    runtime.require("counter").unwrap();
    runtime.require("counter").unwrap();
    runtime.require("counter").unwrap();

    assert_eq!(*lines.borrow(), vec!["tick".to_string()]);
}

#[test]
fn circular_require_sees_partial_exports() {
    // B re-enters A mid-load and receives A's incomplete exports object
    let fx = Fixture::new();
    fx.write(
        "lib/a.js",
        "export early 1\nuse b ./b.js\nexport late 2\n",
    );
    fx.write(
        "lib/b.js",
        "import saw_early ./a.js early\nimport saw_late ./a.js late\nuse a ./a.js\n",
    );
    let runtime = fx.runtime();

    let a = runtime.require("a").unwrap();
    let b = a.get("b");

    // what B saw during the circular call
    assert_eq!(b.get("saw_early"), Value::Number(1.0));
    assert!(b.get("saw_late").is_undefined());

    // B holds A's exports object; A's later mutation is visible through it
    assert_eq!(b.get("a"), a);
    assert_eq!(b.get("a").get("late"), Value::Number(2.0));
}

#[test]
fn resolution_prefers_earlier_search_path() {
    // stdlib precedes lib in the initial path list
    let fx = Fixture::new();
    fx.write("stdlib/foo.js", "export origin \"stdlib\"\n");
    fx.write("lib/foo.js", "export origin \"lib\"\n");
    let runtime = fx.runtime();

    let exports = runtime.require("foo").unwrap();
    assert_eq!(exports.get("origin"), Value::str("stdlib"));
}

#[test]
fn extension_fallback() {
    // "foo" resolves to foo.js when no literal foo exists
    let fx = Fixture::new();
    fx.write("lib/foo.js", "export ext true\n");
    let runtime = fx.runtime();

    let exports = runtime.require("foo").unwrap();
    assert_eq!(exports.get("ext"), Value::Bool(true));
}

#[test]
fn directory_module_uses_manifest_main() {
    // pkg/package.json main points into the package
    let fx = Fixture::new();
    fx.write("lib/pkg/package.json", r#"{"main": "inner/entry.js"}"#);
    fx.write("lib/pkg/inner/entry.js", "export from_pkg true\n");
    let runtime = fx.runtime();

    let exports = runtime.require("pkg").unwrap();
    assert_eq!(exports.get("from_pkg"), Value::Bool(true));
}

#[test]
fn missing_module_fails() {
    let fx = Fixture::new();
    let runtime = fx.runtime();
    let err = runtime.require("doesNotExist").unwrap_err();
    assert!(matches!(err, RuntimeError::ModuleNotFound(_)));
}

#[test]
fn prepended_path_wins() {
    // require.paths mutation takes effect for subsequent requires
    let fx = Fixture::new();
    fx.write("lib/foo.js", "export origin \"lib\"\n");
    let extra = fx.prefix.path().join("extra");
    fs::create_dir_all(&extra).unwrap();
    fs::write(extra.join("foo.js"), "export origin \"extra\"\n").unwrap();
    let runtime = fx.runtime();

    let require = runtime.require_fn();
    require.paths().borrow_mut().insert(0, extra);

    let exports = require.call("foo").unwrap();
    assert_eq!(exports.get("origin"), Value::str("extra"));
}

#[test]
fn wholesale_exports_replacement() {
    // the requirer receives whatever module.exports holds after the body
    // ran, not the original object
    let fx = Fixture::new();
    fx.write("lib/answer.js", "replace 42\n");
    let runtime = fx.runtime();

    assert_eq!(runtime.require("answer").unwrap(), Value::Number(42.0));
    // and the replacement is cached like any exports value
    assert_eq!(runtime.require("answer").unwrap(), Value::Number(42.0));
}

#[test]
fn force_reevaluates() {
    let fx = Fixture::new();
    fx.write("lib/counter.js", "print tick\n");
    let (runtime, lines) = fx.capturing_runtime();
    let require = runtime.require_fn();

    require.call("counter").unwrap();
    require.force("counter").unwrap();
    assert_eq!(lines.borrow().len(), 2);

    // the forced record replaced the cached one; plain require hits it
    require.call("counter").unwrap();
    assert_eq!(lines.borrow().len(), 2);
}

#[test]
fn failed_load_rolls_back_and_retries() {
    // first evaluation fails, the reservation is dropped, and a later
    // require starts from scratch instead of observing half-loaded state
    let fx = Fixture::new();
    let path = fx.write("lib/flaky.js", "export a 1\nbogus directive\n");
    let runtime = fx.runtime();

    let err = runtime.require("flaky").unwrap_err();
    assert!(matches!(err, RuntimeError::Evaluation { .. }));
    assert!(!runtime.loader().is_loaded("flaky"));
    assert!(runtime.loader().cache().is_empty());

    fs::write(&path, "export a 1\n").unwrap();
    let exports = runtime.require("flaky").unwrap();
    assert_eq!(exports.get("a"), Value::Number(1.0));
    assert!(runtime.loader().is_loaded("flaky"));
}

#[test]
fn nested_resolution_failure_propagates() {
    // errors from requires inside a module body reach the outer caller
    // unmodified
    let fx = Fixture::new();
    fx.write("lib/outer.js", "import x ./gone.js field\n");
    let runtime = fx.runtime();

    let err = runtime.require("outer").unwrap_err();
    assert!(matches!(err, RuntimeError::ModuleNotFound(_)));
}

#[test]
fn relative_ids_resolve_against_requirer() {
    let fx = Fixture::new();
    fx.write("lib/nested/inner.js", "export here \"nested\"\n");
    fx.write("lib/nested/outer.js", "import here ./inner.js here\n");
    fx.write("lib/entry.js", "import here ./nested/outer.js here\n");
    let runtime = fx.runtime();

    let exports = runtime.require("entry").unwrap();
    assert_eq!(exports.get("here"), Value::str("nested"));
}

/// Evaluator that dispatches to native Rust bodies by file name; stands in
/// for a real engine where the dialect cannot express a behavior (function
/// exports)
struct NativeEvaluator {
    bodies: HashMap<String, Rc<dyn Fn(&ModuleScope) -> beluga::Result<()>>>,
}

impl Evaluate for NativeEvaluator {
    fn evaluate(&self, _source: &str, filename: &str, _start_line: u32) -> beluga::Result<ModuleBody> {
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let body = self
            .bodies
            .get(&name)
            .cloned()
            .ok_or_else(|| RuntimeError::generic(format!("no native body for {name}")))?;
        Ok(Box::new(move |scope| body(scope)))
    }
}

#[test]
fn unload_hook_fires_only_if_loaded() {
    let fx = Fixture::new();
    fx.write("lib/unload.js", "");
    let sent = Rc::new(Cell::new(0u32));

    let hook = Rc::clone(&sent);
    let mut bodies: HashMap<String, Rc<dyn Fn(&ModuleScope) -> beluga::Result<()>>> = HashMap::new();
    bodies.insert(
        "unload.js".to_string(),
        Rc::new(move |scope: &ModuleScope| {
            let hook = Rc::clone(&hook);
            scope.exports.set(
                "send",
                Value::function(move |_args| {
                    hook.set(hook.get() + 1);
                    Ok(Value::Undefined)
                }),
            )
        }),
    );

    let fs_view: Rc<dyn SourceFetcher> = Rc::new(OsFs);
    let system = System::new(fx.prefix.path().to_path_buf(), vec![], fs_view);
    let runtime = Runtime::with_parts(Rc::new(system), Rc::new(NativeEvaluator { bodies }));

    // never required: the hook must not fire
    runtime.finish().unwrap();
    assert_eq!(sent.get(), 0);

    runtime.require("unload").unwrap();
    runtime.finish().unwrap();
    assert_eq!(sent.get(), 1);
}
