// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Filesystem capability used by the resolver and the load hook
//!
//! The plugin never reaches for `std::fs` directly. The host hands it a
//! [`FileSystem`] through [`HostCapabilities`], which keeps resolution
//! testable against in-memory trees and lets embedders without disk access
//! fail up front instead of on every call.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Kind of a directory entry as reported by `lstat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (not followed)
    Symlink,
    /// Sockets, FIFOs, devices
    Other,
}

/// Synchronous, read-only filesystem primitives
pub trait FileSystem: Send + Sync {
    /// Current working directory, the base for entry specifiers
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Entry kind without following symlinks
    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryKind>;

    /// Fully resolved target of `path`
    fn real_path(&self, path: &Path) -> io::Result<PathBuf>;

    /// Names of the entries directly inside `dir`
    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<OsString>>;

    /// Whole-file read as UTF-8
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileSystem`] backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let file_type = std::fs::symlink_metadata(path)?.file_type();
        Ok(if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        })
    }

    fn real_path(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Capabilities the host environment makes available to the plugin
#[derive(Clone, Default)]
pub struct HostCapabilities {
    /// Filesystem access, absent in sandboxed hosts
    pub fs: Option<Arc<dyn FileSystem>>,
}

impl HostCapabilities {
    /// Capabilities of a native process
    pub fn native() -> Self {
        Self::with_fs(Arc::new(OsFileSystem))
    }

    /// A host without filesystem access
    pub fn none() -> Self {
        Self { fs: None }
    }

    /// Use a custom filesystem implementation
    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs: Some(fs) }
    }
}

impl std::fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCapabilities")
            .field("fs", &self.fs.is_some())
            .finish()
    }
}
