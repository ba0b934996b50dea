//! Virtual file tree over a decompressed archive.
//!
//! The parsers never touch a real file system or a zip reader. They only see
//! an [`ArchiveView`]: a flat list of slash-separated paths, a directory flag
//! per path, and byte contents for files.

pub mod resolve;

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::OdbError;

/// Read-only access to an archive's entries.
pub trait ArchiveView {
    /// All entry paths, files and explicit directories alike.
    ///
    /// Paths use `/` as separator; directory entries end with `/`. The order
    /// is the view's discovery order and is treated as significant.
    fn list_paths(&self) -> Vec<String>;

    /// Returns `true` when `path` is an explicitly flagged directory entry.
    fn is_directory(&self, path: &str) -> bool;

    /// Reads the bytes of a file entry.
    ///
    /// # Errors
    ///
    /// Returns [`OdbError::NotFound`] when `path` is absent or a directory.
    fn read_bytes(&self, path: &str) -> Result<Cow<'_, [u8]>, OdbError>;
}

#[derive(Debug, Clone)]
enum Entry {
    File(Vec<u8>),
    Directory,
}

/// In-memory archive, filled entry by entry.
///
/// Entries iterate in sorted path order, which keeps every resolver decision
/// deterministic for a given set of entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Entry>,
}

impl MemoryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file entry.
    pub fn add_file(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        let path = normalize_path(path);
        let path = path.trim_end_matches('/').to_string();
        if path.is_empty() {
            return;
        }
        self.entries.insert(path, Entry::File(data.into()));
    }

    /// Adds an explicit directory entry. A trailing `/` is appended if missing.
    pub fn add_directory(&mut self, path: &str) {
        let mut path = normalize_path(path);
        if path.is_empty() {
            return;
        }
        if !path.ends_with('/') {
            path.push('/');
        }
        self.entries.entry(path).or_insert(Entry::Directory);
    }

    /// Number of entries, files and explicit directories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds an archive from `(path, contents)` pairs.
    pub fn from_files<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut archive = Self::new();
        for (path, data) in files {
            archive.add_file(path, data);
        }
        archive
    }
}

impl ArchiveView for MemoryArchive {
    fn list_paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn is_directory(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(Entry::Directory))
    }

    fn read_bytes(&self, path: &str) -> Result<Cow<'_, [u8]>, OdbError> {
        match self.entries.get(path) {
            Some(Entry::File(data)) => Ok(Cow::Borrowed(data.as_slice())),
            Some(Entry::Directory) | None => Err(OdbError::NotFound(path.to_string())),
        }
    }
}

/// Converts backslashes to `/` and strips leading `./` and `/`.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut rest = unified.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn ut_arch_001_paths_are_normalized() {
        let mut archive = MemoryArchive::new();
        archive.add_file("odb\\steps\\pcb\\profile", b"SE".to_vec());
        archive.add_directory("./odb/steps");
        assert_eq!(
            archive.list_paths(),
            vec!["odb/steps/".to_string(), "odb/steps/pcb/profile".to_string()]
        );
        assert!(archive.is_directory("odb/steps/"));
        assert!(!archive.is_directory("odb/steps/pcb/profile"));
    }

    #[test]
    fn ut_arch_002_read_bytes_of_file() {
        let archive = MemoryArchive::from_files([("a/features", b"C 1 2 3".as_slice())]);
        let bytes = archive.read_bytes("a/features");
        assert_eq!(bytes.as_deref().ok(), Some(b"C 1 2 3".as_slice()));
    }

    #[test]
    fn bc_arch_001_missing_and_directory_reads_are_not_found() {
        let mut archive = MemoryArchive::new();
        archive.add_directory("a");
        assert!(matches!(archive.read_bytes("a/"), Err(OdbError::NotFound(_))));
        assert!(matches!(archive.read_bytes("nope"), Err(OdbError::NotFound(_))));
    }

    #[test]
    fn bc_arch_002_empty_paths_are_ignored() {
        let mut archive = MemoryArchive::new();
        archive.add_file("/", b"x".to_vec());
        archive.add_directory("");
        assert!(archive.is_empty());
        assert_eq!(archive.len(), 0);
    }
}
