use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::kv::{KeyValueStore, KvError};

/// Directory-backed key-value store.
///
/// Each key is a `<key>.json` file under the store directory. Writes go
/// through a temp file and rename so a crash never leaves half a record.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, KvError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(KvError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Copy an unparseable record aside, logging the outcome
    fn back_up(&self, path: &Path) {
        match backup_file(path) {
            Ok(Some(bak)) => warn!("backed up {} as {}", path.display(), bak.display()),
            Ok(None) => {}
            Err(e) => warn!("could not back up {}: {}", path.display(), e),
        }
    }
}

impl KeyValueStore for FileStore {
    fn create(&mut self) -> Result<(), KvError> {
        fs::create_dir_all(&self.dir).map_err(|e| KvError::OpenError {
            path: self.dir.clone(),
            source: e,
        })
    }

    fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        let path = self.key_path(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(KvError::ReadError {
                    key: key.to_string(),
                    source: e,
                });
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("could not parse {}", path.display());
                self.back_up(&path);
                Err(KvError::DecodeError {
                    key: key.to_string(),
                    source: e,
                })
            }
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), KvError> {
        let path = self.key_path(key)?;
        let content = serde_json::to_string_pretty(value).map_err(|e| KvError::EncodeError {
            key: key.to_string(),
            source: e,
        })?;
        atomic_write(&path, content.as_bytes()).map_err(|e| KvError::WriteError {
            key: key.to_string(),
            source: e,
        })?;
        debug!("wrote {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    fn preserve(&mut self, key: &str) -> Result<(), KvError> {
        let path = self.key_path(key)?;
        match backup_file(&path) {
            Ok(Some(bak)) => {
                warn!("kept a copy of {} as {}", path.display(), bak.display());
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(KvError::BackupError {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

/// Copy `path` to `<path>.bak`, or `<path>.bak.N` when an earlier backup
/// holds different bytes. An existing backup with the same bytes is reused.
/// Returns `None` when `path` does not exist.
fn backup_file(path: &Path) -> io::Result<Option<PathBuf>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mut n = 0;
    loop {
        let mut name = path.as_os_str().to_owned();
        name.push(".bak");
        if n > 0 {
            name.push(format!(".{}", n));
        }
        let bak = PathBuf::from(name);
        match fs::read(&bak) {
            Ok(existing) if existing == content => return Ok(Some(bak)),
            Ok(_) => n += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::write(&bak, &content)?;
                return Ok(Some(bak));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Write `content` to `path` via a temp file in the same directory.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
