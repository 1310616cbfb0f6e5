use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context, Result};

/// Preference key under which the user identifier is stored.
pub const ID_KEY: &str = "ID";

/// Define an abstract key value store using `str` keys and `String`
/// values. The goal is to decouple store implementations (file backed,
/// in-memory) from the places where preferences are read (the sampler)
/// and written (the CLI).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// A `KeyValueStore` implementation over a HashMap.
#[derive(Default, Clone)]
pub struct MemoryPrefs {
    store: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryPrefs {
    fn get(&self, key: &str) -> Result<String> {
        match self.store.read().unwrap().get(key) {
            Some(v) => Ok(v.clone()),
            None => Err(anyhow!("no entry found")),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.store
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object in the user's settings
/// directory, so the identifier written by `--set-id` survives restarts.
pub struct FilePrefs {
    path: PathBuf,
}

impl FilePrefs {
    pub fn in_settings_dir() -> Result<FilePrefs> {
        let home = std::env::var("HOME").context("HOME not set")?;
        let settings_path = PathBuf::from(home).join(".daytrack");
        Ok(FilePrefs {
            path: settings_path.join("prefs.json"),
        })
    }

    pub fn at_path(path: PathBuf) -> FilePrefs {
        FilePrefs { path }
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl KeyValueStore for FilePrefs {
    fn get(&self, key: &str) -> Result<String> {
        self.load()?
            .remove(key)
            .ok_or_else(|| anyhow!("no entry found for '{key}'"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}

#[test]
fn test_memory_prefs_roundtrip() {
    let mut prefs = MemoryPrefs::new();
    assert!(prefs.get(ID_KEY).is_err());
    prefs.set(ID_KEY, "U1").unwrap();
    assert_eq!(prefs.get(ID_KEY).unwrap(), "U1");
    prefs.set(ID_KEY, "U2").unwrap();
    assert_eq!(prefs.get(ID_KEY).unwrap(), "U2");
}

#[test]
fn test_file_prefs_roundtrip() {
    let dir = std::env::temp_dir().join("daytrack-prefs-test");
    let _ = std::fs::remove_dir_all(&dir);
    let mut prefs = FilePrefs::at_path(dir.join("prefs.json"));

    assert!(prefs.get(ID_KEY).is_err());
    prefs.set(ID_KEY, "U1").unwrap();
    assert_eq!(prefs.get(ID_KEY).unwrap(), "U1");

    // a second instance sees what the first wrote
    let reopened = FilePrefs::at_path(dir.join("prefs.json"));
    assert_eq!(reopened.get(ID_KEY).unwrap(), "U1");

    let _ = std::fs::remove_dir_all(&dir);
}
