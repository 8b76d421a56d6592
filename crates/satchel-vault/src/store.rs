//! Settings persistence.
//!
//! One JSON file holds the whole settings record. Loading overlays the
//! file's top-level keys onto the defaults (shallow, the file wins);
//! saving validates first so nothing invalid ever reaches disk.

use std::fs;
use std::path::{Path, PathBuf};

use satchel_core::settings::split_excluded_paths;
use satchel_core::{SatchelError, Settings};

/// Load/save boundary for the settings record.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, overlaying persisted top-level keys onto defaults.
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SatchelError::Io`] when the file cannot be read and
    /// [`SatchelError::Serialization`] when it does not parse.
    pub fn load(&self) -> Result<Settings, SatchelError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let loaded: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| SatchelError::Serialization(e.to_string()))?;
        let mut merged = serde_json::to_value(Settings::default())
            .map_err(|e| SatchelError::Serialization(e.to_string()))?;
        if let (Some(base), Some(over)) = (merged.as_object_mut(), loaded.as_object()) {
            for (key, value) in over {
                base.insert(key.clone(), value.clone());
            }
        }
        let mut settings: Settings = serde_json::from_value(merged)
            .map_err(|e| SatchelError::Serialization(e.to_string()))?;
        // the raw entry is authoritative for the parsed list
        settings.exclude_paths = split_excluded_paths(&settings.excluded_paths);
        Ok(settings)
    }

    /// Validate and persist the settings record.
    ///
    /// # Errors
    ///
    /// Returns [`SatchelError::Validation`] without writing anything when
    /// the record is invalid.
    pub fn save(&self, settings: &Settings) -> Result<(), SatchelError> {
        settings.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| SatchelError::Serialization(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
