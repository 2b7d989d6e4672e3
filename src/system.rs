// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The `system` object handed to every module body
//!
//! Carries process metadata (arguments, environment, installation prefix,
//! platform list) plus the file system view and the print sink. One
//! [`System`] exists per runtime instance, shared by reference.

use crate::fs::SourceFetcher;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Output sink used by `print` and the `system` binding
pub type PrintFn = Rc<dyn Fn(&str)>;

/// Process metadata exposed to modules
pub struct System {
    /// Program arguments, script path first
    pub args: Vec<String>,
    /// Process environment snapshot
    pub env: HashMap<String, String>,
    /// Installation prefix the initial search paths derive from
    pub prefix: PathBuf,
    /// Platform names, most specific first; each contributes search paths
    pub platforms: Vec<String>,
    /// File system view shared with the loader
    pub fs: Rc<dyn SourceFetcher>,
    print: PrintFn,
}

impl System {
    /// Create a system object for the given prefix and arguments,
    /// printing to stdout
    pub fn new(prefix: PathBuf, args: Vec<String>, fs: Rc<dyn SourceFetcher>) -> Self {
        Self {
            args,
            env: std::env::vars().collect(),
            prefix,
            platforms: vec![std::env::consts::OS.to_string(), "default".to_string()],
            fs,
            print: Rc::new(|line| println!("{line}")),
        }
    }

    /// Replace the print sink; tests use this to capture output
    pub fn with_print(mut self, print: PrintFn) -> Self {
        self.print = print;
        self
    }

    /// Write one line to the print sink
    pub fn print(&self, line: &str) {
        (self.print)(line);
    }

    /// Clone of the print sink, for handing to module scopes
    pub fn print_fn(&self) -> PrintFn {
        Rc::clone(&self.print)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFs;
    use std::cell::RefCell;

    #[test]
    fn test_print_sink_capture() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let system = System::new(PathBuf::from("/tmp"), vec![], Rc::new(OsFs))
            .with_print(Rc::new(move |line| sink.borrow_mut().push(line.to_string())));

        system.print("hello");
        assert_eq!(*lines.borrow(), vec!["hello".to_string()]);
    }
}
