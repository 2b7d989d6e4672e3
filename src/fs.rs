// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source fetching abstraction over the file system
//!
//! The resolver and loader never touch `std::fs` directly; they query a
//! [`SourceFetcher`] so that hosts and tests can substitute their own file
//! system view.

use crate::error::Result;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata for a single path
#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    /// Last modification time
    pub mtime: SystemTime,
    /// Size in bytes
    pub size: u64,
}

/// Read-only file system view consumed by the module core
pub trait SourceFetcher {
    /// Read the full contents of a file as UTF-8 text
    fn read(&self, path: &Path) -> Result<String>;

    /// Whether the path exists at all
    fn exists(&self, path: &Path) -> bool;

    /// Whether the path is a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Whether the path is a directory
    fn is_directory(&self, path: &Path) -> bool;

    /// Entry names directly under a directory
    fn list(&self, path: &Path) -> Result<Vec<String>>;

    /// Modification time and size
    fn stat(&self, path: &Path) -> Result<FileStat>;

    /// Canonical absolute form of a path; falls back to the path unchanged
    /// when canonicalization fails (e.g. the path does not exist yet)
    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// [`SourceFetcher`] backed by the operating system
#[derive(Debug, Default)]
pub struct OsFs;

impl SourceFetcher for OsFs {
    fn read(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn stat(&self, path: &Path) -> Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            mtime: meta.modified()?,
            size: meta.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "export x 1\n").unwrap();

        let fs = OsFs;
        assert!(fs.exists(&file));
        assert!(fs.is_file(&file));
        assert!(fs.is_directory(dir.path()));
        assert_eq!(fs.read(&file).unwrap(), "export x 1\n");
        assert_eq!(fs.list(dir.path()).unwrap(), vec!["a.js".to_string()]);
        assert_eq!(fs.stat(&file).unwrap().size, 11);
    }
}
