// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution
//!
//! Relative and absolute specifiers are resolved against the importer's
//! directory (or the working directory for entries). The composed path is
//! tried as-is, then with `.mjs`, then with `.js`. A candidate only counts
//! when its exact file name shows up in the parent directory listing, so a
//! case-insensitive filesystem cannot accept `Foo.js` for `foo.js`.
//!
//! Bare specifiers (`lodash`, `@scope/pkg`) with an importer are left to
//! other plugins.

use crate::config::InputOptions;
use crate::error::{PackError, Result};
use crate::fs::{EntryKind, FileSystem, HostCapabilities};
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Extensions appended to a candidate, in order
pub const EXTENSIONS: [&str; 2] = [".mjs", ".js"];

/// Symlinks followed before a candidate is declared a loop
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Outcome of verifying one candidate path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCheck {
    /// Verified file; the path to hand back to the bundler
    Found(PathBuf),
    /// Nothing exists at the path
    Missing,
    /// The entry could not be inspected (permissions, not a directory, ...)
    Inaccessible(io::ErrorKind),
    /// A directory or special file
    NotAFile,
    /// The entry exists but the directory lists it under a different case
    CaseMismatch,
    /// Symlinks did not settle on a target
    SymlinkLoop,
}

impl FileCheck {
    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileCheck::Missing,
            kind => FileCheck::Inaccessible(kind),
        }
    }

    /// The verified path, if any
    pub fn found(self) -> Option<PathBuf> {
        match self {
            FileCheck::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Default resolver for relative and absolute specifiers
#[derive(Clone)]
pub struct Resolver {
    fs: Arc<dyn FileSystem>,
    preserve_symlinks: bool,
}

impl Resolver {
    /// Create a resolver, failing when the host cannot provide filesystem access
    pub fn new(host: &HostCapabilities, options: &InputOptions) -> Result<Self> {
        let fs = host.fs.clone().ok_or(PackError::MissingFileSystem)?;
        Ok(Self {
            fs,
            preserve_symlinks: options.preserve_symlinks,
        })
    }

    /// Whether symlinked files keep their own path
    pub fn preserve_symlinks(&self) -> bool {
        self.preserve_symlinks
    }

    /// Resolve `specifier` imported from `importer`
    ///
    /// Returns `Ok(None)` when the specifier is bare or no candidate verifies.
    #[instrument(skip(self))]
    pub fn resolve(&self, specifier: &str, importer: Option<&Path>) -> Result<Option<PathBuf>> {
        if importer.is_some() && is_bare(specifier) {
            trace!("Leaving bare specifier to other resolvers");
            return Ok(None);
        }

        let candidate = self.compose(specifier, importer)?;
        let resolved = self.add_extension_if_necessary(&candidate);

        match &resolved {
            Some(path) => debug!("Resolved {} to {}", specifier, path.display()),
            None => debug!("Could not resolve {} (tried {})", specifier, candidate.display()),
        }

        Ok(resolved)
    }

    /// Absolute candidate path for a specifier, before extension inference
    pub fn compose(&self, specifier: &str, importer: Option<&Path>) -> Result<PathBuf> {
        // dirname('/') is '/'; only entries fall back to the working directory
        let base = match importer.map(|importer| importer.parent().unwrap_or(importer)) {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => self.current_dir()?.join(dir),
            None => self.current_dir()?,
        };
        Ok(normalize(&base.join(specifier)))
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.fs.current_dir().map_err(PackError::WorkingDirectory)
    }

    fn add_extension_if_necessary(&self, candidate: &Path) -> Option<PathBuf> {
        if let Some(found) = self.check_file(candidate).found() {
            return Some(found);
        }
        EXTENSIONS
            .iter()
            .find_map(|ext| self.check_file(&with_suffix(candidate, ext)).found())
    }

    /// Verify a single candidate path
    pub fn check_file(&self, path: &Path) -> FileCheck {
        let mut current = path.to_path_buf();
        let mut visited = HashSet::new();

        for _ in 0..=MAX_SYMLINK_HOPS {
            let kind = match self.fs.symlink_metadata(&current) {
                Ok(kind) => kind,
                Err(err) => return self.report(path, FileCheck::from_io(&err)),
            };

            match kind {
                EntryKind::Symlink if !self.preserve_symlinks => {
                    if !visited.insert(current.clone()) {
                        return self.report(path, FileCheck::SymlinkLoop);
                    }
                    current = match self.fs.real_path(&current) {
                        Ok(target) => target,
                        Err(err) => return self.report(path, FileCheck::from_io(&err)),
                    };
                }
                EntryKind::Symlink | EntryKind::File => {
                    let outcome = self.verify_case(current);
                    return self.report(path, outcome);
                }
                EntryKind::Directory | EntryKind::Other => {
                    return self.report(path, FileCheck::NotAFile);
                }
            }
        }

        self.report(path, FileCheck::SymlinkLoop)
    }

    fn verify_case(&self, path: PathBuf) -> FileCheck {
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return FileCheck::NotAFile;
        };
        match self.fs.read_dir_names(dir) {
            Ok(names) if names.iter().any(|entry| entry.as_os_str() == name) => FileCheck::Found(path),
            Ok(_) => FileCheck::CaseMismatch,
            Err(err) => FileCheck::from_io(&err),
        }
    }

    fn report(&self, path: &Path, outcome: FileCheck) -> FileCheck {
        trace!(candidate = %path.display(), ?outcome, "checked");
        outcome
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("preserve_symlinks", &self.preserve_symlinks)
            .finish_non_exhaustive()
    }
}

/// Neither absolute nor relative
pub fn is_bare(specifier: &str) -> bool {
    !Path::new(specifier).is_absolute() && !specifier.starts_with('.')
}

/// Lexically collapse `.` and `..` segments
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::sync::Mutex;

    enum Node {
        File,
        Dir,
        Link(PathBuf),
        Locked,
    }

    /// Case-insensitive in-memory tree; `real_path` follows a single hop
    struct MemoryFs {
        cwd: Option<PathBuf>,
        nodes: HashMap<String, (PathBuf, Node)>,
        lookups: Mutex<usize>,
    }

    impl MemoryFs {
        fn new() -> Self {
            let mut fs = Self {
                cwd: Some(PathBuf::from("/work")),
                nodes: HashMap::new(),
                lookups: Mutex::new(0),
            };
            fs.insert("/", Node::Dir);
            fs
        }

        fn key(path: &Path) -> String {
            path.to_string_lossy().to_lowercase()
        }

        fn insert(&mut self, path: &str, node: Node) {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent() {
                if !self.nodes.contains_key(&Self::key(parent)) {
                    self.insert(&parent.to_string_lossy(), Node::Dir);
                }
            }
            self.nodes.insert(Self::key(&path), (path, node));
        }

        fn file(mut self, path: &str) -> Self {
            self.insert(path, Node::File);
            self
        }

        fn dir(mut self, path: &str) -> Self {
            self.insert(path, Node::Dir);
            self
        }

        fn link(mut self, path: &str, target: &str) -> Self {
            self.insert(path, Node::Link(PathBuf::from(target)));
            self
        }

        fn locked(mut self, path: &str) -> Self {
            self.insert(path, Node::Locked);
            self
        }

        fn lookups(&self) -> usize {
            *self.lookups.lock().unwrap()
        }
    }

    impl FileSystem for MemoryFs {
        fn current_dir(&self) -> io::Result<PathBuf> {
            self.cwd.clone().ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn symlink_metadata(&self, path: &Path) -> io::Result<EntryKind> {
            *self.lookups.lock().unwrap() += 1;
            match self.nodes.get(&Self::key(path)) {
                Some((_, Node::File)) => Ok(EntryKind::File),
                Some((_, Node::Dir)) => Ok(EntryKind::Directory),
                Some((_, Node::Link(_))) => Ok(EntryKind::Symlink),
                Some((_, Node::Locked)) => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
                None => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }

        fn real_path(&self, path: &Path) -> io::Result<PathBuf> {
            match self.nodes.get(&Self::key(path)) {
                Some((_, Node::Link(target))) => Ok(target.clone()),
                Some((actual, _)) => Ok(actual.clone()),
                None => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }

        fn read_dir_names(&self, dir: &Path) -> io::Result<Vec<OsString>> {
            let dir_key = Self::key(dir);
            Ok(self
                .nodes
                .values()
                .filter(|(actual, _)| actual.parent().map(Self::key).as_deref() == Some(dir_key.as_str()))
                .filter_map(|(actual, _)| actual.file_name().map(|n| n.to_os_string()))
                .collect())
        }

        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            Ok(String::new())
        }
    }

    fn resolver(fs: MemoryFs, preserve_symlinks: bool) -> (Resolver, Arc<MemoryFs>) {
        let fs = Arc::new(fs);
        let host = HostCapabilities::with_fs(fs.clone());
        let resolver = Resolver::new(&host, &InputOptions { preserve_symlinks }).unwrap();
        (resolver, fs)
    }

    #[test]
    fn test_is_bare() {
        assert!(is_bare("lodash"));
        assert!(is_bare("@scope/pkg/sub"));
        assert!(!is_bare("./foo"));
        assert!(!is_bare("../foo"));
        assert!(!is_bare(".hidden"));
        assert!(!is_bare("/abs/foo"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/./c/../d")), PathBuf::from("/a/b/d"));
        assert_eq!(normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_compose() {
        let (r, _) = resolver(MemoryFs::new(), false);
        let importer = Path::new("/src/app/main.js");
        assert_eq!(r.compose("./util", Some(importer)).unwrap(), PathBuf::from("/src/app/util"));
        assert_eq!(r.compose("../lib/x", Some(importer)).unwrap(), PathBuf::from("/src/lib/x"));
        assert_eq!(r.compose("/abs/y", Some(importer)).unwrap(), PathBuf::from("/abs/y"));
        assert_eq!(r.compose("entry", None).unwrap(), PathBuf::from("/work/entry"));
        assert_eq!(
            r.compose("./x", Some(Path::new("rel/main.js"))).unwrap(),
            PathBuf::from("/work/rel/x")
        );
    }

    #[test]
    fn test_compose_importer_without_parent() {
        let mut fs = MemoryFs::new();
        fs.cwd = None;
        let (r, _) = resolver(fs, false);
        assert_eq!(r.compose("./x", Some(Path::new("/"))).unwrap(), PathBuf::from("/x"));
        assert_eq!(r.compose("../x", Some(Path::new("/"))).unwrap(), PathBuf::from("/x"));
    }

    #[test]
    fn test_missing_filesystem() {
        let err = Resolver::new(&HostCapabilities::none(), &InputOptions::default()).unwrap_err();
        assert!(matches!(err, PackError::MissingFileSystem));
    }

    #[test]
    fn test_missing_working_directory() {
        let mut fs = MemoryFs::new();
        fs.cwd = None;
        let (r, _) = resolver(fs, false);
        let err = r.resolve("./main", None).unwrap_err();
        assert!(matches!(err, PackError::WorkingDirectory(_)));
        // With an importer the working directory is not needed.
        assert_eq!(r.resolve("./main", Some(Path::new("/src/index.js"))).unwrap(), None);
    }

    #[test]
    fn test_bare_specifier_skips_filesystem() {
        let (r, fs) = resolver(MemoryFs::new().file("/src/lodash.js"), false);
        assert_eq!(r.resolve("lodash", Some(Path::new("/src/main.js"))).unwrap(), None);
        assert_eq!(fs.lookups(), 0);
    }

    #[test]
    fn test_bare_entry_resolves_against_cwd() {
        let (r, _) = resolver(MemoryFs::new().file("/work/main.js"), false);
        assert_eq!(r.resolve("main", None).unwrap(), Some(PathBuf::from("/work/main.js")));
    }

    #[test]
    fn test_extension_order() {
        let fs = MemoryFs::new()
            .file("/src/a")
            .file("/src/a.mjs")
            .file("/src/a.js")
            .file("/src/b.mjs")
            .file("/src/b.js")
            .file("/src/c.js");
        let (r, _) = resolver(fs, false);
        let importer = Some(Path::new("/src/main.js"));

        assert_eq!(r.resolve("./a", importer).unwrap(), Some(PathBuf::from("/src/a")));
        assert_eq!(r.resolve("./b", importer).unwrap(), Some(PathBuf::from("/src/b.mjs")));
        assert_eq!(r.resolve("./c", importer).unwrap(), Some(PathBuf::from("/src/c.js")));
        assert_eq!(r.resolve("./d", importer).unwrap(), None);
    }

    #[test]
    fn test_case_mismatch_is_unresolved() {
        let (r, _) = resolver(MemoryFs::new().file("/src/foo.js"), false);
        let importer = Some(Path::new("/src/main.js"));

        assert_eq!(r.check_file(Path::new("/src/Foo.js")), FileCheck::CaseMismatch);
        assert_eq!(r.resolve("./Foo.js", importer).unwrap(), None);
        assert_eq!(r.resolve("./Foo", importer).unwrap(), None);
        assert_eq!(r.resolve("./foo", importer).unwrap(), Some(PathBuf::from("/src/foo.js")));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let (r, _) = resolver(MemoryFs::new().dir("/src/lib").file("/src/lib.js"), false);
        assert_eq!(r.check_file(Path::new("/src/lib")), FileCheck::NotAFile);
        assert_eq!(
            r.resolve("./lib", Some(Path::new("/src/main.js"))).unwrap(),
            Some(PathBuf::from("/src/lib.js"))
        );
    }

    #[test]
    fn test_check_errors_are_distinguished_but_suppressed() {
        let (r, _) = resolver(MemoryFs::new().locked("/src/secret.js"), false);
        assert_eq!(r.check_file(Path::new("/src/nothing.js")), FileCheck::Missing);
        assert_eq!(
            r.check_file(Path::new("/src/secret.js")),
            FileCheck::Inaccessible(io::ErrorKind::PermissionDenied)
        );
        assert_eq!(r.resolve("./secret", Some(Path::new("/src/main.js"))).unwrap(), None);
    }

    #[test]
    fn test_symlink_followed_through_chain() {
        let fs = MemoryFs::new()
            .file("/real/impl.js")
            .link("/src/hop2.js", "/real/impl.js")
            .link("/src/entry.js", "/src/hop2.js");
        let (r, _) = resolver(fs, false);
        assert_eq!(
            r.resolve("./entry", Some(Path::new("/src/main.js"))).unwrap(),
            Some(PathBuf::from("/real/impl.js"))
        );
    }

    #[test]
    fn test_symlink_preserved() {
        let fs = MemoryFs::new()
            .file("/real/impl.js")
            .link("/src/entry.js", "/real/impl.js");
        let (r, _) = resolver(fs, true);
        assert_eq!(
            r.resolve("./entry.js", Some(Path::new("/src/main.js"))).unwrap(),
            Some(PathBuf::from("/src/entry.js"))
        );
    }

    #[test]
    fn test_dangling_symlink() {
        let (r, _) = resolver(MemoryFs::new().link("/src/gone.js", "/nowhere.js"), false);
        assert_eq!(r.check_file(Path::new("/src/gone.js")), FileCheck::Missing);
    }

    #[test]
    fn test_symlink_cycle() {
        let fs = MemoryFs::new()
            .link("/src/a.js", "/src/b.js")
            .link("/src/b.js", "/src/a.js");
        let (r, _) = resolver(fs, false);
        assert_eq!(r.check_file(Path::new("/src/a.js")), FileCheck::SymlinkLoop);
        assert_eq!(r.resolve("./a", Some(Path::new("/src/main.js"))).unwrap(), None);
    }

    #[test]
    fn test_symlink_chain_too_long() {
        let mut fs = MemoryFs::new().file("/end.js");
        for i in 0..=MAX_SYMLINK_HOPS {
            let target = if i == MAX_SYMLINK_HOPS {
                "/end.js".to_string()
            } else {
                format!("/l{}.js", i + 1)
            };
            fs = fs.link(&format!("/l{}.js", i), &target);
        }
        let (r, _) = resolver(fs, false);
        assert_eq!(r.check_file(Path::new("/l0.js")), FileCheck::SymlinkLoop);
        assert_eq!(r.check_file(Path::new("/l1.js")), FileCheck::Found(PathBuf::from("/end.js")));
    }

    #[test]
    fn test_idempotent() {
        let (r, _) = resolver(MemoryFs::new().file("/src/x.mjs"), false);
        let importer = Some(Path::new("/src/main.js"));
        let first = r.resolve("./x", importer).unwrap();
        let second = r.resolve("./x", importer).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some(PathBuf::from("/src/x.mjs")));
    }
}
