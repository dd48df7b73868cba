//! Script storage - save, list, load and delete snippets on disk
//!
//! The execution core never touches the filesystem; this collaborator owns
//! a single base directory (by default `~/PythonCodeExecutor`) holding
//! `.py` files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Metadata for one saved script
#[derive(Debug, Clone, Serialize)]
pub struct ScriptInfo {
    /// File name within the store
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Local>,
}

/// Flat-directory store of Python snippets
pub struct ScriptStore {
    base_dir: PathBuf,
}

impl ScriptStore {
    /// Open the configured store, creating its directory if needed
    pub fn new(config: &StorageConfig) -> Result<Self> {
        Self::at(config.scripts_dir.clone())
    }

    /// Open a store rooted at a specific directory
    pub fn at(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .map_err(|e| Error::Storage(format!("Failed to create {}: {}", base_dir.display(), e)))?;
        Ok(ScriptStore { base_dir })
    }

    /// The directory scripts live in
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save a snippet, returning the file name it was stored under
    ///
    /// A missing name is replaced by a timestamped one; a missing `.py`
    /// extension is appended.
    pub fn save(&self, code: &str, filename: Option<&str>) -> Result<String> {
        let name = match filename {
            Some(name) => normalize_name(name)?,
            None => format!("python_code_{}.py", Local::now().format("%Y%m%d_%H%M%S")),
        };

        let path = self.base_dir.join(&name);
        fs::write(&path, code)
            .map_err(|e| Error::Storage(format!("Failed to save {}: {}", path.display(), e)))?;
        debug!("Saved script {}", path.display());
        Ok(name)
    }

    /// Load a snippet by name, or the most recently modified one
    ///
    /// Returns `None` when no name is given and the store is empty.
    pub fn load(&self, filename: Option<&str>) -> Result<Option<String>> {
        let name = match filename {
            Some(name) => normalize_name(name)?,
            None => match self.list()?.into_iter().next() {
                Some(info) => info.name,
                None => return Ok(None),
            },
        };

        let path = self.base_dir.join(&name);
        let code = fs::read_to_string(&path)
            .map_err(|e| Error::Storage(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(Some(code))
    }

    /// List saved scripts, most recently modified first
    pub fn list(&self) -> Result<Vec<ScriptInfo>> {
        let mut scripts = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !name.ends_with(".py") {
                continue;
            }
            let metadata = entry.metadata()?;
            let modified = metadata
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now());
            scripts.push(ScriptInfo {
                name,
                size: metadata.len(),
                modified,
            });
        }

        scripts.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.name.cmp(&b.name)));
        Ok(scripts)
    }

    /// Delete a saved script; returns whether it existed
    pub fn delete(&self, filename: &str) -> Result<bool> {
        let name = normalize_name(filename)?;
        let path = self.base_dir.join(&name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| Error::Storage(format!("Failed to delete {}: {}", path.display(), e)))?;
        Ok(true)
    }
}

/// Validate a user-supplied file name and ensure the `.py` extension
///
/// Names must stay inside the store directory.
fn normalize_name(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::InvalidInput("Empty file name".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::InvalidInput(format!(
            "File name {:?} must not contain path separators",
            name
        )));
    }
    if name.ends_with(".py") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.py", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ScriptStore::at(dir.path()).unwrap();

        let name = store.save("print('hello')", Some("demo")).unwrap();
        assert_eq!(name, "demo.py");
        assert_eq!(
            store.load(Some("demo.py")).unwrap().as_deref(),
            Some("print('hello')")
        );
        // Extension is normalized on load too.
        assert_eq!(
            store.load(Some("demo")).unwrap().as_deref(),
            Some("print('hello')")
        );
    }

    #[test]
    fn test_auto_generated_name_is_timestamped() {
        let dir = tempdir().unwrap();
        let store = ScriptStore::at(dir.path()).unwrap();

        let name = store.save("x = 1", None).unwrap();
        assert!(name.starts_with("python_code_"));
        assert!(name.ends_with(".py"));
    }

    #[test]
    fn test_load_latest_when_no_name_given() {
        let dir = tempdir().unwrap();
        let store = ScriptStore::at(dir.path()).unwrap();
        assert!(store.load(None).unwrap().is_none());

        store.save("x = 1", Some("older")).unwrap();
        store.save("x = 2", Some("newer")).unwrap();

        // Force distinct modification times regardless of fs granularity.
        let newer = dir.path().join("newer.py");
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        let file = fs::File::options().append(true).open(&newer).unwrap();
        file.set_modified(later).unwrap();

        assert_eq!(store.load(None).unwrap().as_deref(), Some("x = 2"));
    }

    #[test]
    fn test_list_is_newest_first_and_py_only() {
        let dir = tempdir().unwrap();
        let store = ScriptStore::at(dir.path()).unwrap();

        store.save("x = 1", Some("a")).unwrap();
        store.save("x = 2", Some("b")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        let file = fs::File::options()
            .append(true)
            .open(dir.path().join("b.py"))
            .unwrap();
        file.set_modified(later).unwrap();

        let listing = store.list().unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "b.py");
        assert_eq!(listing[1].name, "a.py");
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = ScriptStore::at(dir.path()).unwrap();

        store.save("x = 1", Some("gone")).unwrap();
        assert!(store.delete("gone").unwrap());
        assert!(!store.delete("gone").unwrap());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = ScriptStore::at(dir.path()).unwrap();

        assert!(store.save("x = 1", Some("../escape")).is_err());
        assert!(store.load(Some("a/b.py")).is_err());
    }
}
