use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

use super::file_store::atomic_write;

const CONFIG_FILE: &str = "config.toml";

/// Error type for config.toml handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing. A missing file yields
/// the defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(Config, toml_edit::DocumentMut), ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    let config: Config = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the document back, preserving the user's formatting and comments.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    fs::create_dir_all(data_dir).map_err(|e| ConfigError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Append a custom category to `[categories].custom`.
pub fn add_custom_category(doc: &mut toml_edit::DocumentMut, name: &str) {
    if !doc.contains_key("categories") {
        doc["categories"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let custom = &mut doc["categories"]["custom"];
    if custom.is_none() {
        *custom = toml_edit::value(toml_edit::Array::new());
    }
    if let Some(array) = custom.as_array_mut() {
        array.push(name);
    }
}
