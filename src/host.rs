//! Narrow interfaces to the host environment: persisted settings, localized
//! strings and file delivery. The extraction core never calls these.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::HostError;
use crate::options::Settings;

pub trait SettingsStore {
    fn load(&self) -> Result<Settings, HostError>;
}

pub trait Localizer {
    /// Localized text for `key`; `fallback` when missing, `key` when the
    /// fallback is empty too.
    fn text(&self, key: &str, fallback: &str) -> String;
}

pub trait DownloadSink {
    /// Delivers `bytes` under `file_name` and reports where they went.
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, HostError>;
}

/// Settings kept in a JSON file; a missing file means defaults.
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsFile {
    fn load(&self) -> Result<Settings, HostError> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file missing, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(HostError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&body).map_err(|source| HostError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

fn fallback_or_key(key: &str, fallback: &str) -> String {
    if fallback.is_empty() {
        key.to_string()
    } else {
        fallback.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackLocalizer;

impl Localizer for FallbackLocalizer {
    fn text(&self, key: &str, fallback: &str) -> String {
        fallback_or_key(key, fallback)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    message: String,
}

/// Strings from a browser-extension style `messages.json`:
/// `{ "key": { "message": "..." } }`.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// # Errors
    /// Fails when the document is not a catalog object.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let entries = serde_json::from_str::<HashMap<String, CatalogEntry>>(body)?;
        Ok(Self {
            messages: entries
                .into_iter()
                .map(|(key, entry)| (key, entry.message))
                .collect(),
        })
    }

    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, HostError> {
        let body = fs::read_to_string(path).map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&body).map_err(|source| HostError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Localizer for MessageCatalog {
    fn text(&self, key: &str, fallback: &str) -> String {
        match self.messages.get(key) {
            Some(message) if !message.is_empty() => message.clone(),
            _ => fallback_or_key(key, fallback),
        }
    }
}

/// Writes every download into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, HostError> {
        let name = Path::new(file_name);
        let is_plain_name = name.file_name().is_some_and(|base| base == name.as_os_str());
        if file_name.is_empty() || !is_plain_name {
            return Err(HostError::InvalidFileName(file_name.to_string()));
        }

        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(|source| HostError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "delivered download");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{
        DirectorySink, DownloadSink, FallbackLocalizer, JsonSettingsFile, Localizer,
        MessageCatalog, SettingsStore,
    };
    use crate::error::HostError;
    use crate::options::Settings;

    #[test]
    fn catalog_falls_back_to_fallback_then_key() {
        let catalog = MessageCatalog::from_json(
            r#"{"default_sheet_name":{"message":"Datos"},"empty":{"message":""}}"#,
        )
        .expect("catalog should parse");
        assert_eq!(catalog.text("default_sheet_name", "Table Data"), "Datos");
        assert_eq!(catalog.text("empty", "Fallback"), "Fallback");
        assert_eq!(catalog.text("missing", ""), "missing");
        assert_eq!(FallbackLocalizer.text("k", "v"), "v");
    }

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempdir().expect("tempdir should be created");
        let store = JsonSettingsFile::new(dir.path().join("absent.json"));
        assert_eq!(store.load().expect("defaults"), Settings::default());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").expect("fixture written");
        let err = JsonSettingsFile::new(&path).load().expect_err("broken json");
        assert!(matches!(err, HostError::Json { .. }));
    }

    #[test]
    fn directory_sink_rejects_paths() {
        let dir = tempdir().expect("tempdir should be created");
        let mut sink = DirectorySink::new(dir.path());
        let written = sink.deliver("table.csv", b"a,b").expect("delivery");
        assert_eq!(std::fs::read(&written).expect("readable"), b"a,b");
        assert!(sink.deliver("../escape.csv", b"x").is_err());
        assert!(sink.deliver("", b"x").is_err());
    }
}
