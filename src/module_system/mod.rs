// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS-style module system
//!
//! Implements `require()` over four cooperating pieces:
//!
//! - [`PathResolver`] turns module ids into concrete file paths
//! - [`ModuleCache`] enforces load-once semantics, keyed by resolved path
//! - the sandbox ([`Evaluate`], [`ModuleScope`], [`Require`]) injects the
//!   per-module bindings without touching any global namespace
//! - [`Loader`] orchestrates the above, including `require.force` and
//!   circular-require handling

mod cache;
mod loader;
mod resolver;
mod sandbox;

pub use cache::{ModuleCache, ModuleRecord, RecordRef};
pub use loader::Loader;
pub use resolver::{PathResolver, DEFAULT_EXTENSION, DEFAULT_MAIN};
pub use sandbox::{Evaluate, ModuleBody, ModuleHandle, ModuleScope, Require};
