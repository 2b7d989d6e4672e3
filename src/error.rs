// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module runtime

use std::path::PathBuf;
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the module runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Module resolution failed: no candidate path existed
    #[error("cannot find module '{0}'")]
    ModuleNotFound(String),

    /// The host evaluator rejected a module's source
    #[error("{filename}:{line}: {message}")]
    Evaluation {
        /// Name of the file being evaluated
        filename: String,
        /// Line the evaluator was positioned at when it failed
        line: u32,
        /// Evaluator-supplied description
        message: String,
    },

    /// A package.json existed but could not be parsed
    #[error("invalid package manifest at {path}: {source}")]
    InvalidManifest {
        /// Path of the offending manifest
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// A directory module lacked the manifest it was required to have
    #[error("program directory {0} does not contain a package.json")]
    MissingManifest(PathBuf),

    /// A non-function export was called as a function
    #[error("'{0}' is not a function")]
    NotAFunction(String),

    /// File system error
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl RuntimeError {
    /// Create a module not found error
    pub fn module_not_found(id: impl Into<String>) -> Self {
        Self::ModuleNotFound(id.into())
    }

    /// Create an evaluation error positioned at a file and line
    pub fn evaluation(filename: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self::Evaluation {
            filename: filename.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }
}
