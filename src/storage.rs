use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

// Persisted view-state keys. `userAddedMovies` holds a JSON array of Title,
// the rest are plain string slices.
pub const KEY_SECTION: &str = "section";
pub const KEY_SELECTED_TITLE: &str = "selectedMovieTitle";
pub const KEY_IS_DETAIL_VIEW: &str = "isDetailView";
pub const KEY_LAST_SECTION: &str = "lastSection";
pub const KEY_USER_ADDED: &str = "userAddedMovies";

pub fn data_dir() -> PathBuf {
    match ProjectDirs::from("", "", "Nightfall") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

/// Key/value persistence contract. Callers own serialization; values are
/// plain strings. Implementations must never fail outward: an unavailable
/// backing store degrades to get = absent, set/remove = no-op.
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Store backed by a single JSON object file in the app data dir.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(dir: PathBuf) -> FileStore {
        let _ = fs::create_dir_all(&dir);
        FileStore {
            path: dir.join("state.json"),
        }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
            Err(_) => BTreeMap::new(),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) {
        if let Ok(s) = serde_json::to_string_pretty(map) {
            let _ = fs::write(&self.path, s);
        }
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map);
        }
    }
}

/// In-memory store for tests.
#[cfg(test)]
pub struct MemStore {
    map: std::cell::RefCell<BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemStore {
    pub fn new() -> MemStore {
        MemStore {
            map: std::cell::RefCell::new(BTreeMap::new()),
        }
    }

    pub fn with(pairs: &[(&str, &str)]) -> MemStore {
        let store = MemStore::new();
        for (k, v) in pairs {
            store.set(k, v);
        }
        store
    }
}

#[cfg(test)]
impl Store for MemStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nightfall-store-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_store_roundtrip() {
        let store = FileStore::open(scratch_dir("roundtrip"));
        assert_eq!(store.get(KEY_SECTION), None);
        store.set(KEY_SECTION, "movies");
        store.set(KEY_IS_DETAIL_VIEW, "true");
        assert_eq!(store.get(KEY_SECTION).as_deref(), Some("movies"));
        assert_eq!(store.get(KEY_IS_DETAIL_VIEW).as_deref(), Some("true"));
        store.remove(KEY_SECTION);
        assert_eq!(store.get(KEY_SECTION), None);
        assert_eq!(store.get(KEY_IS_DETAIL_VIEW).as_deref(), Some("true"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = scratch_dir("reopen");
        {
            let store = FileStore::open(dir.clone());
            store.set(KEY_LAST_SECTION, "tvshows");
        }
        let store = FileStore::open(dir);
        assert_eq!(store.get(KEY_LAST_SECTION).as_deref(), Some("tvshows"));
    }

    #[test]
    fn test_unavailable_store_is_a_noop() {
        // A directory that cannot exist: everything silently degrades.
        let store = FileStore::open(PathBuf::from("/dev/null/nightfall"));
        store.set(KEY_SECTION, "home");
        store.remove(KEY_SECTION);
        assert_eq!(store.get(KEY_SECTION), None);
    }

    #[test]
    fn test_corrupt_state_file_reads_as_empty() {
        let dir = scratch_dir("corrupt");
        let store = FileStore::open(dir.clone());
        let _ = fs::write(dir.join("state.json"), "{{{");
        assert_eq!(store.get(KEY_SECTION), None);
        store.set(KEY_SECTION, "new");
        assert_eq!(store.get(KEY_SECTION).as_deref(), Some("new"));
    }
}
