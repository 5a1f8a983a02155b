//! File tree over a flat item store
//!
//! Boards without a filesystem keep files as items of a key-value store
//! (a sequential-storage map on flash, for example), keyed by normalized
//! path. The directory tree lives in an index item under a reserved key so
//! listings do not need to walk the backing store.
//!
//! The index is a JSON array, so paths may hold any character:
//!
//! ```text
//! [{"dir":"picoware"},{"file":["picoware/settings.json",44]}]
//! ```
//!
//! Every change builds the next index first, stores the item, then the
//! index, and only adopts the new tree once both are on the medium.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::hal::storage::{self, DirEntry};
use crate::hal::{Storage, StorageError};

/// Key of the directory index; no normalized path is empty
pub const INDEX_KEY: &str = "";

/// Raw item access, one value per key
pub trait ItemStore {
    /// Read an item, `None` if it was never stored
    fn fetch(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Create or replace an item
    fn store(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Node {
    Dir(String),
    File(String, u32),
}

impl Node {
    fn path(&self) -> &str {
        match self {
            Node::Dir(path) | Node::File(path, _) => path,
        }
    }
}

fn find(nodes: &[Node], path: &str) -> Option<usize> {
    nodes.iter().position(|n| n.path() == path)
}

/// Record `path` and its missing parents as directories
fn add_dirs(nodes: &mut Vec<Node>, path: &str) -> Result<bool, StorageError> {
    let mut added = false;
    let mut prefix = String::new();
    for part in path.split('/') {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        match find(nodes, &prefix).map(|i| &nodes[i]) {
            Some(Node::Dir(_)) => {}
            Some(Node::File(..)) => return Err(StorageError::WrongKind),
            None => {
                nodes.push(Node::Dir(prefix.clone()));
                added = true;
            }
        }
    }
    Ok(added)
}

/// Path-addressed file store on top of an [`ItemStore`]
pub struct IndexedStore<S> {
    items: S,
    nodes: Vec<Node>,
    /// Largest item the backing store accepts, index included
    max_item: usize,
}

impl<S: ItemStore> IndexedStore<S> {
    /// Open the store and load its index
    ///
    /// An unreadable index leaves the tree empty; items stay on the medium
    /// and are overwritten as files are written again.
    pub fn open(mut items: S, max_item: usize) -> Self {
        let nodes = match items.fetch(INDEX_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Node>>(&bytes) {
                Ok(nodes) => {
                    info!("Storage index loaded ({} entries)", nodes.len());
                    nodes
                }
                Err(_) => {
                    warn!("Storage index is corrupted, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                info!("Storage is empty");
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read storage index: {:?}", e);
                Vec::new()
            }
        };
        Self { items, nodes, max_item }
    }

    /// Persist `next` as the index and adopt it
    fn commit(&mut self, next: Vec<Node>) -> Result<(), StorageError> {
        let index = self.encode(&next)?;
        self.items.store(INDEX_KEY, &index)?;
        self.nodes = next;
        Ok(())
    }

    fn encode(&self, nodes: &[Node]) -> Result<Vec<u8>, StorageError> {
        let index = serde_json::to_vec(nodes).map_err(|_| StorageError::Io)?;
        if index.len() > self.max_item {
            warn!("Storage index would take {} bytes", index.len());
            return Err(StorageError::Full);
        }
        Ok(index)
    }

    fn is_dir(&self, path: &str) -> bool {
        path.is_empty() || matches!(find(&self.nodes, path).map(|i| &self.nodes[i]), Some(Node::Dir(_)))
    }
}

impl<S: ItemStore> Storage for IndexedStore<S> {
    fn is_mounted(&self) -> bool {
        true
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        let path = storage::normalize(path);
        match find(&self.nodes, path).map(|i| &self.nodes[i]) {
            Some(Node::File(..)) => self.items.fetch(path)?.ok_or(StorageError::Corrupted),
            Some(Node::Dir(_)) => Err(StorageError::WrongKind),
            None if path.is_empty() => Err(StorageError::WrongKind),
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = storage::normalize(path);
        if path.is_empty() {
            return Err(StorageError::InvalidPath);
        }
        if data.len() > self.max_item {
            return Err(StorageError::Full);
        }

        let mut next = self.nodes.clone();
        let parent = storage::parent(path);
        if !parent.is_empty() {
            add_dirs(&mut next, parent)?;
        }
        match find(&next, path) {
            Some(i) => match &mut next[i] {
                Node::File(_, size) => *size = data.len() as u32,
                Node::Dir(_) => return Err(StorageError::WrongKind),
            },
            None => next.push(Node::File(String::from(path), data.len() as u32)),
        }
        // Fail before touching the medium if the index cannot hold the file
        self.encode(&next)?;

        self.items.store(path, data)?;
        debug!("Wrote {} ({} bytes)", path, data.len());
        self.commit(next)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StorageError> {
        let path = storage::normalize(path);
        if path.is_empty() {
            return Ok(());
        }
        let mut next = self.nodes.clone();
        if add_dirs(&mut next, path)? {
            self.commit(next)?;
        }
        Ok(())
    }

    fn exists(&mut self, path: &str) -> bool {
        let path = storage::normalize(path);
        path.is_empty() || find(&self.nodes, path).is_some()
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        let path = storage::normalize(path);
        let index = find(&self.nodes, path).ok_or(StorageError::NotFound)?;
        if let Node::Dir(dir) = &self.nodes[index] {
            let prefix = format!("{}/", dir);
            if self.nodes.iter().any(|n| n.path().starts_with(&prefix)) {
                return Err(StorageError::Io);
            }
        }

        let mut next = self.nodes.clone();
        let node = next.remove(index);
        self.commit(next)?;
        if let Node::File(..) = node {
            // Unlisted already; the tombstone only frees space on compaction
            if let Err(e) = self.items.store(path, &[]) {
                warn!("Failed to clear {}: {:?}", path, e);
            }
        }
        Ok(())
    }

    fn list(&mut self, dir: &str) -> Result<Vec<DirEntry>, StorageError> {
        let dir = storage::normalize(dir);
        if !self.is_dir(dir) {
            return Err(if find(&self.nodes, dir).is_some() {
                StorageError::WrongKind
            } else {
                StorageError::NotFound
            });
        }

        let mut entries: Vec<DirEntry> = self
            .nodes
            .iter()
            .filter(|n| storage::parent(n.path()) == dir)
            .map(|n| match n {
                Node::Dir(path) => DirEntry {
                    name: String::from(storage::file_name(path)),
                    is_dir: true,
                    size: 0,
                },
                Node::File(path, size) => DirEntry {
                    name: String::from(storage::file_name(path)),
                    is_dir: false,
                    size: *size,
                },
            })
            .collect();
        storage::sort_entries(&mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    #[derive(Default)]
    struct Items {
        map: BTreeMap<String, Vec<u8>>,
        failing_key: Option<&'static str>,
        stores: usize,
    }

    /// Shared map so a test can inspect and reopen what the store wrote
    #[derive(Clone, Default)]
    struct MemoryItems(Rc<RefCell<Items>>);

    impl MemoryItems {
        fn fail_key(&self, key: Option<&'static str>) {
            self.0.borrow_mut().failing_key = key;
        }

        fn item(&self, key: &str) -> Option<Vec<u8>> {
            self.0.borrow().map.get(key).cloned()
        }

        fn stores(&self) -> usize {
            self.0.borrow().stores
        }
    }

    impl ItemStore for MemoryItems {
        fn fetch(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(self.0.borrow().map.get(key).cloned())
        }

        fn store(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
            let mut items = self.0.borrow_mut();
            if items.failing_key == Some(key) {
                return Err(StorageError::Full);
            }
            items.stores += 1;
            items.map.insert(String::from(key), data.to_vec());
            Ok(())
        }
    }

    fn names(store: &mut IndexedStore<MemoryItems>, dir: &str) -> Vec<String> {
        store.list(dir).unwrap().into_iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_paths_with_spaces_survive_reopen() {
        let items = MemoryItems::default();
        let mut store = IndexedStore::open(items.clone(), 1024);
        store.write("my notes/to do.txt", b"milk").unwrap();
        store.write("my notes/a\nb", b"x").unwrap();
        store.mkdir("empty dir").unwrap();

        let mut reopened = IndexedStore::open(items, 1024);
        assert_eq!(names(&mut reopened, ""), vec!["empty dir", "my notes"]);
        assert_eq!(names(&mut reopened, "my notes"), vec!["a\nb", "to do.txt"]);
        assert_eq!(reopened.read("my notes/to do.txt").unwrap(), b"milk");
        let listing = reopened.list("my notes").unwrap();
        assert_eq!(listing[1].size, 4);
    }

    #[test]
    fn test_failed_item_store_leaves_tree_unchanged() {
        let items = MemoryItems::default();
        let mut store = IndexedStore::open(items.clone(), 1024);
        items.fail_key(Some("docs/new.txt"));

        assert_eq!(store.write("docs/new.txt", b"data"), Err(StorageError::Full));
        assert!(!store.exists("docs/new.txt"));
        assert!(!store.exists("docs"));
        assert_eq!(store.item(INDEX_KEY), None);
    }

    #[test]
    fn test_failed_index_store_leaves_tree_unchanged() {
        let items = MemoryItems::default();
        let mut store = IndexedStore::open(items.clone(), 1024);
        store.write("keep.txt", b"old").unwrap();
        let index = items.item(INDEX_KEY);
        items.fail_key(Some(INDEX_KEY));

        assert_eq!(store.write("docs/new.txt", b"data"), Err(StorageError::Full));
        assert_eq!(store.mkdir("later"), Err(StorageError::Full));
        assert_eq!(store.remove("keep.txt"), Err(StorageError::Full));
        assert_eq!(names(&mut store, ""), vec!["keep.txt"]);
        assert_eq!(items.item(INDEX_KEY), index);
        assert_eq!(store.read("keep.txt").unwrap(), b"old");
    }

    #[test]
    fn test_index_larger_than_an_item_is_rejected() {
        let items = MemoryItems::default();
        let mut store = IndexedStore::open(items.clone(), 64);
        store.write("a", b"1").unwrap();
        let stores = items.stores();

        let long = "d".repeat(60);
        assert_eq!(store.write(&long, b"1"), Err(StorageError::Full));
        assert_eq!(items.stores(), stores);
        assert!(!store.exists(&long));
        assert!(store.exists("a"));
    }

    #[test]
    fn test_remove_and_kinds() {
        let items = MemoryItems::default();
        let mut store = IndexedStore::open(items.clone(), 1024);
        store.write("dir/file", b"x").unwrap();

        assert_eq!(store.write("dir", b"x"), Err(StorageError::WrongKind));
        assert_eq!(store.write("dir/file/sub", b"x"), Err(StorageError::WrongKind));
        assert_eq!(store.read("dir"), Err(StorageError::WrongKind));
        assert_eq!(store.list("dir/file"), Err(StorageError::WrongKind));
        assert_eq!(store.list("nope"), Err(StorageError::NotFound));
        assert_eq!(store.remove("dir"), Err(StorageError::Io));

        store.remove("dir/file").unwrap();
        assert_eq!(items.item("dir/file"), Some(Vec::new()));
        assert_eq!(store.read("dir/file"), Err(StorageError::NotFound));
        store.remove("dir").unwrap();
        assert!(names(&mut store, "").is_empty());
    }

    #[test]
    fn test_corrupted_index_opens_empty() {
        let items = MemoryItems::default();
        items.0.borrow_mut().map.insert(String::from(INDEX_KEY), b"d old\nf old/x 3\n".to_vec());

        let mut store = IndexedStore::open(items, 1024);
        assert!(names(&mut store, "").is_empty());
        store.write("fresh", b"1").unwrap();
        assert!(store.exists("fresh"));
    }

    impl IndexedStore<MemoryItems> {
        fn item(&self, key: &str) -> Option<Vec<u8>> {
            self.items.item(key)
        }
    }
}
