//! File-backed key-value store.
//!
//! Persists the extension's small key-value document as pretty JSON with
//! atomic writes and a three-deep backup rotation. A corrupt primary file
//! falls back to the newest readable backup.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HostError, StorageError, StorageResult};
use crate::service::{HostFuture, KeyValueStore};
use tabgroup_shared::{diagnostics, paths};

pub const SCHEMA_VERSION: u32 = 1;

/// Everything the store keeps on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            values: BTreeMap::new(),
        }
    }
}

/// Low-level storage for the key-value document.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    profile: String,
}

impl Storage {
    pub fn new(root: PathBuf, profile: String) -> Self {
        Self { root, profile }
    }

    pub fn load(&self) -> StorageResult<StoreSnapshot> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(StoreSnapshot::default());
        }
        let data = fs::read_to_string(&path)?;
        let snapshot = match serde_json::from_str::<StoreSnapshot>(&data) {
            Ok(s) => s,
            Err(parse_err) => {
                if let Some(backup) = self.load_from_backup() {
                    diagnostics::warn(format!(
                        "storage_restored_from_backup path={} error={}",
                        path.display(),
                        parse_err
                    ));
                    return self.migrate(backup);
                }
                return Err(StorageError::ParseError(parse_err.to_string()));
            }
        };
        self.migrate(snapshot)
    }

    fn load_from_backup(&self) -> Option<StoreSnapshot> {
        let path = self.file_path();
        ["json.bak", "json.bak.1", "json.bak.2"]
            .iter()
            .map(|ext| path.with_extension(ext))
            .filter(|backup| backup.exists())
            .find_map(|backup| {
                let data = fs::read_to_string(&backup).ok()?;
                serde_json::from_str::<StoreSnapshot>(&data).ok()
            })
    }

    fn migrate(&self, mut snapshot: StoreSnapshot) -> StorageResult<StoreSnapshot> {
        if snapshot.schema_version < SCHEMA_VERSION {
            snapshot.schema_version = SCHEMA_VERSION;
        }
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &StoreSnapshot) -> StorageResult<()> {
        let path = self.file_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteError(e.to_string()))?;
        }
        self.rotate_backups(&path);
        let tmp_path = path.with_extension("json.tmp");
        let file =
            fs::File::create(&tmp_path).map_err(|e| StorageError::WriteError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;
        use std::io::Write;
        writer
            .flush()
            .map_err(|e| StorageError::WriteError(e.to_string()))?;
        fs::rename(&tmp_path, &path).map_err(|e| StorageError::WriteError(e.to_string()))?;
        Ok(())
    }

    fn rotate_backups(&self, path: &Path) {
        if !path.exists() {
            return;
        }

        let bak2 = path.with_extension("json.bak.2");
        let bak1 = path.with_extension("json.bak.1");
        let bak = path.with_extension("json.bak");

        let _ = fs::remove_file(&bak2);
        if bak1.exists() {
            let _ = fs::rename(&bak1, &bak2);
        }
        if bak.exists() {
            let _ = fs::rename(&bak, &bak1);
        }
        let _ = fs::copy(path, &bak);
    }

    pub fn file_path(&self) -> PathBuf {
        self.root
            .join("profiles")
            .join(&self.profile)
            .join("storage.json")
    }
}

pub fn default_storage_root() -> PathBuf {
    paths::app_root()
}

/// Key-value store that writes through to disk on every `set`.
pub struct FileStore {
    storage: Storage,
    snapshot: Mutex<StoreSnapshot>,
}

impl FileStore {
    /// Opens the store for a profile under the default storage root.
    pub fn open_profile(profile: impl Into<String>) -> StorageResult<Self> {
        Self::open(Storage::new(default_storage_root(), profile.into()))
    }

    pub fn open(storage: Storage) -> StorageResult<Self> {
        let snapshot = storage.load()?;
        Ok(Self {
            storage,
            snapshot: Mutex::new(snapshot),
        })
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.lock().clone()
    }

    fn write(&self, key: &str, value: Value) -> Result<(), HostError> {
        let mut snapshot = self.snapshot.lock();
        let previous = snapshot.values.insert(key.to_string(), value);
        if let Err(err) = self.storage.save(&snapshot) {
            // Keep memory and disk in agreement when the write fails.
            match previous {
                Some(previous) => snapshot.values.insert(key.to_string(), previous),
                None => snapshot.values.remove(key),
            };
            return Err(err.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> HostFuture<'a, Option<Value>> {
        Box::pin(async move { Ok::<_, HostError>(self.snapshot.lock().values.get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> HostFuture<'a, ()> {
        Box::pin(async move { self.write(key, value) })
    }
}
