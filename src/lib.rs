// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # beluga
//!
//! A minimal CommonJS-style module runtime: given a program entry point it
//! resolves, loads, isolates and executes modules drawn from a layered set
//! of search paths, wiring each module's `require`/`exports`/`module`
//! bindings before handing control to application code.
//!
//! The interesting part is the module core:
//!
//! - path resolution with extension and `package.json`-main conventions,
//!   deterministic and order-sensitive
//! - a load-once cache keyed by resolved path, so two ids naming the same
//!   file share one exports object
//! - circular requires that observe partial exports instead of deadlocking
//!   or re-evaluating
//! - a pluggable host evaluator: the engine that turns source text into a
//!   callable is an injected capability, not a language builtin
//!
//! ## Embedding
//!
//! ```rust,ignore
//! use beluga::{Runtime, Value};
//! use std::path::PathBuf;
//!
//! fn main() -> beluga::Result<()> {
//!     let runtime = Runtime::new(PathBuf::from("/opt/beluga"), std::env::args().collect());
//!     let exports = runtime.run_program(std::path::Path::new("app/main.js"))?;
//!     runtime.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI usage
//!
//! ```bash
//! # run a program file (or a package directory with a manifest)
//! beluga app/main.js
//!
//! # prepend a search path, preload a module, then run
//! beluga -I ./vendor -r setup app/main.js
//!
//! # evaluate inline source
//! beluga -e 'print hello'
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fs;
pub mod module_system;
pub mod runtime;
pub mod script;
pub mod system;
pub mod value;

// Re-exports
pub use error::{Result, RuntimeError};
pub use fs::{FileStat, OsFs, SourceFetcher};
pub use module_system::{Evaluate, Loader, ModuleBody, ModuleCache, ModuleScope, Require};
pub use runtime::Runtime;
pub use script::LineEvaluator;
pub use system::System;
pub use value::Value;

/// Version of the beluga runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
