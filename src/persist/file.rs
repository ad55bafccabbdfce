// src/persist/file.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::store::KeyValueStore;

/// File name of the store inside its directory.
pub const STORE_FILE: &str = "answers.json";

/// Stores entries in `<dir>/answers.json`.
///
/// Every write rewrites the whole file through a temporary file and a rename,
/// so a crash mid-write leaves either the old or the new contents.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("reading answer store {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing answer store {:?}", self.path))
    }

    fn save_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating store directory {:?}", parent))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(map).context("encoding answer store")?;
        fs::write(&tmp, json).with_context(|| format!("writing {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing answer store {:?}", self.path))?;

        debug!(entries = map.len(), path = ?self.path, "answer store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_all()?;
        map.insert(key.to_string(), value.to_string());
        self.save_all(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.load_all()?;
        if map.remove(key).is_some() {
            self.save_all(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load_all()?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("q0_code", "print('hi')\n").unwrap();
        store.set("exam_theme", "dark").unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("q0_code").unwrap().as_deref(), Some("print('hi')\n"));
        assert_eq!(reopened.keys().unwrap(), vec!["exam_theme", "q0_code"]);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(store.get("q0_code").unwrap(), None);
        store.remove("q0_code").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn set_overwrites_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("q1_code", "a long first draft").unwrap();
        store.set("q1_code", "x").unwrap();
        assert_eq!(store.get("q1_code").unwrap().as_deref(), Some("x"));
    }
}
