//! File-backed configuration store.
//!
//! Implements [`ConfigPort`] on top of a single file.  The encoding follows
//! the extension: `*.json` is human-editable JSON (`serde_json`), anything
//! else is a compact `postcard` blob.  On the device the file lives on the
//! SD card mounted through the ESP-IDF VFS, so the same `std::fs` code
//! serves both targets.
//!
//! Values are range-checked before they are written and after they are
//! read; a file that fails either check is never applied.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Postcard,
}

pub struct FileConfigStore {
    path: PathBuf,
    encoding: Encoding,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let encoding = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Encoding::Json,
            _ => Encoding::Postcard,
        };
        Self { path, encoding }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, falling back to defaults when nothing usable is stored.
    pub fn load_or_default(&self) -> SystemConfig {
        match self.load() {
            Ok(cfg) => cfg,
            Err(ConfigError::NotFound) => {
                info!("ConfigStore: no stored config, using defaults");
                SystemConfig::default()
            }
            Err(e) => {
                warn!("ConfigStore: {} ({}), using defaults", e, self.path.display());
                SystemConfig::default()
            }
        }
    }

    fn encode(&self, config: &SystemConfig) -> Result<Vec<u8>, ConfigError> {
        match self.encoding {
            Encoding::Json => {
                serde_json::to_vec_pretty(config).map_err(|_| ConfigError::Corrupted)
            }
            Encoding::Postcard => postcard::to_allocvec(config).map_err(|_| ConfigError::Corrupted),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<SystemConfig, ConfigError> {
        match self.encoding {
            Encoding::Json => serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted),
            Encoding::Postcard => postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted),
        }
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let cfg = self.decode(&bytes)?;
        cfg.validate()?;
        info!("ConfigStore: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = self.encode(config)?;

        // Write-then-rename: readers never see a partial file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("ConfigStore: saved {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}
