//! The persisted JSON document.
//!
//! An opaque key/value object owned by whatever embeds the engine. It is
//! loaded once at construction and written back atomically (temp file,
//! fsync, rename) on demand and at shutdown.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;

/// Persisted key/value document.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    data: Map<String, Value>,
}

impl Document {
    /// An empty document that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: Map::new(),
        }
    }

    /// Load the document at `path`.
    ///
    /// A missing, unreadable, or malformed file yields an empty document; the
    /// reason is logged at `warn`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "State document unavailable, starting empty");
                return Self::empty(path);
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(data)) => {
                debug!(path = %path.display(), keys = data.len(), "State document loaded");
                Self { path, data }
            }
            Ok(_) => {
                warn!(path = %path.display(), "State document is not a JSON object, starting empty");
                Self::empty(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "State document is corrupt, starting empty");
                Self::empty(path)
            }
        }
    }

    /// Write the document back to its path.
    ///
    /// The destination is only ever replaced by a fully written and synced
    /// file, so an interrupted save leaves the previous contents intact.
    pub fn save(&self) -> Result<()> {
        let temp_path = temp_path(&self.path);

        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.data)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), keys = self.data.len(), "State document saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Entry for in-place updates.
    pub fn entry(&mut self, key: impl Into<String>) -> serde_json::map::Entry<'_> {
        self.data.entry(key)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }
}

/// `<path>.tmp`, keeping the original extension.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Document::load(dir.path().join("state.json"));
        assert!(doc.data().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Document::load(&path).data().is_empty());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(Document::load(&path).data().is_empty());
    }

    #[test]
    fn test_temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/var/bot/state.json")),
            PathBuf::from("/var/bot/state.json.tmp")
        );
    }

    #[test]
    fn test_entry_update() {
        let mut doc = Document::empty("unused.json");
        *doc.entry("count").or_insert(json!(0)) = json!(2);
        assert_eq!(doc.get("count"), Some(&json!(2)));
        assert_eq!(doc.remove("count"), Some(json!(2)));
        assert!(doc.get("count").is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut doc = Document::load(&path);
        doc.insert("greeting", "hello");
        doc.save().unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }
}
