// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache for require()
//!
//! Keyed by resolved path, never by module id: two ids resolving to the same
//! file share one record. A record is reserved (`loading=true`, fresh empty
//! exports) before its source is evaluated, so a circular require re-entering
//! during evaluation finds the record and receives the partial exports
//! object instead of re-evaluating. Failed evaluations roll the reservation
//! back so a later require retries cleanly.

use crate::module_system::sandbox::ModuleHandle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One loaded (or loading) module
#[derive(Debug)]
pub struct ModuleRecord {
    /// Canonical path the module was loaded from
    pub path: PathBuf,
    /// The `module` binding handed to the body; holds the exports
    pub module: ModuleHandle,
    /// Evaluation completed without error
    pub loaded: bool,
    /// Evaluation has begun but not finished
    pub loading: bool,
}

impl ModuleRecord {
    /// Create a reserved record with empty exports
    pub fn reserved(path: PathBuf, id: &str) -> Self {
        let module = ModuleHandle::new(id, &path);
        Self {
            path,
            module,
            loaded: false,
            loading: true,
        }
    }
}

/// Shared handle to a cached record
pub type RecordRef = Rc<RefCell<ModuleRecord>>;

/// Cache mapping resolved paths to module records
///
/// Single-threaded by design; `require` runs to completion and the only
/// re-entrancy is synchronous recursion from circular requires.
#[derive(Default)]
pub struct ModuleCache {
    entries: RefCell<HashMap<PathBuf, RecordRef>>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached record by resolved path
    pub fn get(&self, path: &Path) -> Option<RecordRef> {
        self.entries.borrow().get(path).cloned()
    }

    /// Reserve a record for evaluation
    ///
    /// Idempotent: creates a `loading` record with fresh empty exports iff
    /// absent, otherwise returns the existing record unchanged. The second
    /// element is true when the record was newly created and the caller is
    /// responsible for evaluating the module and then committing or rolling
    /// back.
    pub fn reserve(&self, path: &Path, id: &str) -> (RecordRef, bool) {
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(path) {
            return (Rc::clone(existing), false);
        }
        let record = Rc::new(RefCell::new(ModuleRecord::reserved(path.to_path_buf(), id)));
        entries.insert(path.to_path_buf(), Rc::clone(&record));
        (record, true)
    }

    /// Mark a record as fully loaded; called once per successful evaluation
    pub fn commit(&self, path: &Path) {
        if let Some(record) = self.entries.borrow().get(path) {
            let mut record = record.borrow_mut();
            record.loaded = true;
            record.loading = false;
        }
    }

    /// Drop a reservation after a failed evaluation so the next require of
    /// this path starts from scratch
    pub fn rollback(&self, path: &Path) -> Option<RecordRef> {
        self.entries.borrow_mut().remove(path)
    }

    /// Replace whatever is cached for `path` with an already-loaded record;
    /// used by `require.force`
    pub fn replace(&self, path: &Path, record: RecordRef) {
        {
            let mut record = record.borrow_mut();
            record.loaded = true;
            record.loading = false;
        }
        self.entries.borrow_mut().insert(path.to_path_buf(), record);
    }

    /// True iff a record exists and committed
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.entries
            .borrow()
            .get(path)
            .is_some_and(|record| record.borrow().loaded)
    }

    /// Resolved paths currently cached
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every record
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
