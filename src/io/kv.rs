use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

/// Error type for key-value backend operations
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("could not open store at {path}: {source}")]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read key {key}: {source}")]
    ReadError {
        key: String,
        source: std::io::Error,
    },
    #[error("could not write key {key}: {source}")]
    WriteError {
        key: String,
        source: std::io::Error,
    },
    #[error("stored value for {key} is not valid JSON: {source}")]
    DecodeError {
        key: String,
        source: serde_json::Error,
    },
    #[error("could not encode value for {key}: {source}")]
    EncodeError {
        key: String,
        source: serde_json::Error,
    },
    #[error("could not back up key {key}: {source}")]
    BackupError {
        key: String,
        source: std::io::Error,
    },
    #[error("invalid key: {0:?}")]
    InvalidKey(String),
}

/// A persisted key-value capability.
///
/// `create` must be called once before `get`/`set`; calling it again is
/// harmless. `set` overwrites any previous value for the key.
pub trait KeyValueStore {
    fn create(&mut self) -> Result<(), KvError>;
    fn get(&self, key: &str) -> Result<Option<Value>, KvError>;
    fn set(&mut self, key: &str, value: &Value) -> Result<(), KvError>;

    /// Keep a copy of the current value of `key` somewhere `set` will not
    /// overwrite it. Called when a stored value can't be decoded.
    fn preserve(&mut self, _key: &str) -> Result<(), KvError> {
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn create(&mut self) -> Result<(), KvError> {
        (**self).create()
    }

    fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), KvError> {
        (**self).set(key, value)
    }

    fn preserve(&mut self, key: &str) -> Result<(), KvError> {
        (**self).preserve(key)
    }
}

/// In-memory backend. Counts writes and records preserved keys so callers
/// can assert on I/O.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    created: bool,
    preserved: Vec<(String, Value)>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Values copied aside by `preserve`, oldest first
    pub fn preserved(&self) -> &[(String, Value)] {
        &self.preserved
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Peek at a stored value without counting a read
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn create(&mut self) -> Result<(), KvError> {
        self.created = true;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), KvError> {
        self.writes += 1;
        self.values.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn preserve(&mut self, key: &str) -> Result<(), KvError> {
        if let Some(value) = self.values.get(key) {
            self.preserved.push((key.to_string(), value.clone()));
        }
        Ok(())
    }
}
