// src/store.rs  —  PreferenceStore trait + TOML file / memory / null backends
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Persistent key/value strings (the `localStorage` of the browser version)
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ── TOML file ─────────────────────────────────────────────────────────────────
/// Flat `key = "value"` TOML file, rewritten on every `set`
pub struct FileStore {
    path:    PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store. A missing file is an empty store;
    /// an unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e)  => {
                    log::warn!("[store] ignoring unparseable {:?}: {e}", path);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("[store] cannot read {:?}: {e}", path);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Creating storage directory {:?}", parent))?;
            }
        }
        let raw = toml::to_string(&self.entries).context("Serialising preferences")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Writing preferences to {:?}", self.path))?;
        log::debug!("[store] {key} = {value:?} -> {:?}", self.path);
        Ok(())
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────
/// Session-only store (one-shot `--lang`, tests)
#[derive(Default, Debug, Clone)]
pub struct MemoryStore(HashMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> { self.0.get(key).cloned() }
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Remembers nothing (`--no-persist`)
pub struct NullStore;
impl PreferenceStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> { None }
    fn set(&mut self, _key: &str, _value: &str) -> Result<()> { Ok(()) }
}
