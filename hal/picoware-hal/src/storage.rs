//! Storage abstractions
//!
//! Provides a path-addressed file store. Paths are `/`-separated and
//! relative to the storage root; leading and trailing separators are
//! ignored, so `"/picoware/"` and `"picoware"` name the same directory.

use alloc::string::String;
use alloc::vec::Vec;

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No medium present (e.g. SD card missing)
    NotMounted,
    /// Path not found
    NotFound,
    /// Path names a directory where a file was expected, or vice versa
    WrongKind,
    /// Path is empty or malformed
    InvalidPath,
    /// Data corrupted or not valid UTF-8
    Corrupted,
    /// Storage is full
    Full,
    /// Underlying device operation failed
    Io,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size: u32,
}

/// Storage trait
///
/// Implementations decide how directories are represented; callers only rely
/// on `mkdir` making a path listable and `write` creating missing parents.
pub trait Storage {
    /// Check if a medium is present
    fn is_mounted(&self) -> bool;

    /// Read a whole file
    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or replace a file
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Create a directory (and any missing parents)
    fn mkdir(&mut self, path: &str) -> Result<(), StorageError>;

    /// Check if a file or directory exists
    fn exists(&mut self, path: &str) -> bool;

    /// Remove a file or an empty directory
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;

    /// List a directory, directories first then files, each sorted by name
    fn list(&mut self, dir: &str) -> Result<Vec<DirEntry>, StorageError>;

    /// Read a whole file as UTF-8 text
    fn read_to_string(&mut self, path: &str) -> Result<String, StorageError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| StorageError::Corrupted)
    }
}

/// Strip leading and trailing separators
pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Parent directory of `path` (the root is its own parent)
pub fn parent(path: &str) -> &str {
    let path = normalize(path);
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Final component of `path`
pub fn file_name(path: &str) -> &str {
    let path = normalize(path);
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join a directory and an entry name
pub fn join(dir: &str, name: &str) -> String {
    let dir = normalize(dir);
    let name = normalize(name);
    let mut out = String::with_capacity(dir.len() + name.len() + 1);
    out.push_str(dir);
    if !dir.is_empty() && !name.is_empty() {
        out.push('/');
    }
    out.push_str(name);
    out
}

/// Sort a listing the way `Storage::list` promises
pub fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}
