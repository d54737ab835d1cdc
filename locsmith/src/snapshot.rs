//! Previous-source snapshot store.
//!
//! Change detection needs the source text as it looked after the last
//! successful run. Snapshots are kept in a cache directory keyed by the
//! digest of the source path, so the engine works without a VCS checkout.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::Error;

pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SnapshotStore { root: root.into() }
    }

    fn path_for(&self, source_path: &str) -> PathBuf {
        let digest = Sha256::digest(source_path.as_bytes());
        self.root.join(format!("{}.snapshot", hex::encode(digest)))
    }

    /// The source text recorded for `source_path` by a previous run, if any.
    pub fn load(&self, source_path: &str) -> Result<Option<String>, Error> {
        match std::fs::read_to_string(self.path_for(source_path)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Record `content` as the last-seen source for `source_path`.
    pub fn save(&self, source_path: &str, content: &str) -> Result<(), Error> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path_for(source_path), content)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));
        assert!(store.load("locales/en.json").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));

        store.save("locales/en.json", "{\"a\": \"b\"}").unwrap();
        assert_eq!(
            store.load("locales/en.json").unwrap().unwrap(),
            "{\"a\": \"b\"}"
        );
    }

    #[test]
    fn test_distinct_paths_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));

        store.save("a.json", "A").unwrap();
        store.save("b.json", "B").unwrap();
        assert_eq!(store.load("a.json").unwrap().unwrap(), "A");
        assert_eq!(store.load("b.json").unwrap().unwrap(), "B");
    }
}
