// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution
//!
//! Turns a module id plus an ordered search-path list into a concrete file
//! path. Resolution is deterministic and order-sensitive: directories are
//! consulted in list order and the first match wins. The resolver holds no
//! state of its own; every file system question goes through the
//! [`SourceFetcher`].

use crate::error::{Result, RuntimeError};
use crate::fs::SourceFetcher;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source extension tried after the literal path
pub const DEFAULT_EXTENSION: &str = ".js";

/// Main-file name assumed when a package manifest has no `main` field
pub const DEFAULT_MAIN: &str = "main";

/// Module path resolver
pub struct PathResolver {
    /// File extensions to try, in order
    extensions: Vec<String>,
}

impl PathResolver {
    /// Create a resolver with the default extension list
    pub fn new() -> Self {
        Self {
            extensions: vec![DEFAULT_EXTENSION.to_string()],
        }
    }

    /// Resolve a module id
    ///
    /// Relative ids (`./`, `../`) resolve only against `origin_dir`, the
    /// requesting module's directory. Absolute ids resolve as-is. Bare ids
    /// walk `search_paths` in order.
    pub fn resolve(
        &self,
        id: &str,
        origin_dir: Option<&Path>,
        search_paths: &[PathBuf],
        fs: &dyn SourceFetcher,
    ) -> Result<PathBuf> {
        if id.starts_with("./") || id.starts_with("../") {
            let base = origin_dir.unwrap_or_else(|| Path::new("."));
            if let Some(found) = self.resolve_candidate(&base.join(id), fs)? {
                return Ok(fs.canonicalize(&found));
            }
            return Err(RuntimeError::module_not_found(id));
        }

        if Path::new(id).is_absolute() {
            if let Some(found) = self.resolve_candidate(Path::new(id), fs)? {
                return Ok(fs.canonicalize(&found));
            }
            return Err(RuntimeError::module_not_found(id));
        }

        for dir in search_paths {
            if let Some(found) = self.resolve_candidate(&dir.join(id), fs)? {
                return Ok(fs.canonicalize(&found));
            }
        }
        Err(RuntimeError::module_not_found(id))
    }

    /// Expand one base candidate: literal, with extensions, then as a
    /// directory module
    fn resolve_candidate(&self, candidate: &Path, fs: &dyn SourceFetcher) -> Result<Option<PathBuf>> {
        if fs.is_file(candidate) {
            return Ok(Some(candidate.to_path_buf()));
        }

        for ext in &self.extensions {
            let with_ext = append_extension(candidate, ext);
            if fs.is_file(&with_ext) {
                return Ok(Some(with_ext));
            }
        }

        if fs.is_directory(candidate) {
            return self.resolve_directory(candidate, fs);
        }

        Ok(None)
    }

    /// Resolve a directory module: `package.json` main, then an index file
    fn resolve_directory(&self, dir: &Path, fs: &dyn SourceFetcher) -> Result<Option<PathBuf>> {
        let manifest_path = dir.join("package.json");
        if fs.is_file(&manifest_path) {
            let text = fs.read(&manifest_path)?;
            let manifest: PackageManifest =
                serde_json::from_str(&text).map_err(|source| RuntimeError::InvalidManifest {
                    path: manifest_path.clone(),
                    source,
                })?;

            let main = manifest.main.as_deref().unwrap_or(DEFAULT_MAIN);
            let main_path = dir.join(main);
            if fs.is_file(&main_path) {
                return Ok(Some(main_path));
            }
            for ext in &self.extensions {
                let with_ext = append_extension(&main_path, ext);
                if fs.is_file(&with_ext) {
                    return Ok(Some(with_ext));
                }
            }
        }

        for ext in &self.extensions {
            let index = dir.join(format!("index{ext}"));
            if fs.is_file(&index) {
                return Ok(Some(index));
            }
        }

        Ok(None)
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Append an extension to the full file name, `foo` -> `foo.js`
/// (`Path::set_extension` would clobber `foo.bar` into `foo.js`)
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ext);
    PathBuf::from(name)
}

/// Minimal package.json structure for resolution
#[derive(Debug, Deserialize)]
struct PackageManifest {
    main: Option<String>,
}
