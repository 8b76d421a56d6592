//! The layered configuration model.
//!
//! One global [`AttachmentPathSettings`] plus per-path overrides keyed by
//! vault path. The scope on an override value records whether the key is a
//! file or a folder; extension overrides nest inside any of them.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::vpath;

/// Where the attachment root directory comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveMode {
    /// The configured root folder, verbatim.
    FixedFolder,
    /// The configured root folder resolved next to the owning note.
    NextToNote,
    /// The vault-wide attachment directory configured in the host.
    #[default]
    VaultDefault,
}

/// Granularity at which a configuration record applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScopeType {
    #[default]
    Global,
    Folder,
    File,
}

/// Per-extension variant of the four template fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionOverride {
    pub extension: String,
    pub attachment_root: String,
    pub save_mode: SaveMode,
    pub attachment_path: String,
    pub attach_format: String,
}

/// A configuration record: where attachments of a note live and how they
/// are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPathSettings {
    /// Base directory for attachments, interpreted per [`SaveMode`].
    #[serde(default)]
    pub attachment_root: String,

    #[serde(default)]
    pub save_mode: SaveMode,

    /// Folder template appended under the root. May reference
    /// `${notepath}`, `${notename}` and `${parent}`.
    #[serde(default = "default_attachment_path")]
    pub attachment_path: String,

    /// Filename template. May reference `${notename}`, `${date}` and
    /// `${originalname}`.
    #[serde(default = "default_attach_format")]
    pub attach_format: String,

    #[serde(default)]
    pub scope: ScopeType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_overrides: Vec<ExtensionOverride>,
}

fn default_attachment_path() -> String {
    "${notepath}/${notename}".to_string()
}

fn default_attach_format() -> String {
    "IMG-${date}".to_string()
}

impl Default for AttachmentPathSettings {
    fn default() -> Self {
        Self {
            attachment_root: String::new(),
            save_mode: SaveMode::VaultDefault,
            attachment_path: default_attachment_path(),
            attach_format: default_attach_format(),
            scope: ScopeType::Global,
            extension_overrides: Vec::new(),
        }
    }
}

impl AttachmentPathSettings {
    /// Reject duplicate or malformed extension overrides.
    ///
    /// # Errors
    ///
    /// Returns the first offending entry: empty extension, an extension
    /// containing `.` or `/`, or a duplicate of an earlier entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen: Vec<&str> = Vec::new();
        for (index, over) in self.extension_overrides.iter().enumerate() {
            if over.extension.is_empty() {
                return Err(ValidationError::EmptyExtension { index });
            }
            if let Some(found) = over.extension.chars().find(|c| matches!(c, '.' | '/')) {
                return Err(ValidationError::InvalidExtensionCharacter {
                    extension: over.extension.clone(),
                    found,
                });
            }
            if seen.contains(&over.extension.as_str()) {
                return Err(ValidationError::DuplicateExtension {
                    extension: over.extension.clone(),
                });
            }
            seen.push(&over.extension);
        }
        Ok(())
    }
}

/// Process-wide settings: the global configuration record plus everything
/// that gates the engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Global attachment configuration.
    pub attach_path: AttachmentPathSettings,

    /// strftime pattern rendered into `${date}`.
    pub date_format: String,

    /// Regex over extensions excluded from handling. Empty disables.
    pub exclude_extension_pattern: String,

    /// Propagate note renames to attachment folders and filenames.
    pub auto_rename_attachment: bool,

    /// Handle every created non-note file, not only images.
    pub handle_all: bool,

    /// Raw `;`-separated excluded paths, as entered.
    pub excluded_paths: String,

    /// Parsed excluded paths.
    pub exclude_paths: Vec<String>,

    /// Also exclude everything under an excluded path.
    pub exclude_subpaths: bool,

    /// The host's vault-wide attachment directory, consulted by
    /// [`SaveMode::VaultDefault`].
    pub vault_attachment_dir: String,

    /// Per-path overrides of the global configuration. Keys are vault
    /// paths of currently existing files or folders; rename handling
    /// rewrites them in the same transaction as the rename itself.
    pub override_path: BTreeMap<String, AttachmentPathSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            attach_path: AttachmentPathSettings::default(),
            date_format: "%Y%m%d%H%M%S".to_string(),
            exclude_extension_pattern: String::new(),
            auto_rename_attachment: true,
            handle_all: false,
            excluded_paths: String::new(),
            exclude_paths: Vec::new(),
            exclude_subpaths: false,
            vault_attachment_dir: "/".to_string(),
            override_path: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Validate the global record and every override before persistence.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.attach_path.validate()?;
        for setting in self.override_path.values() {
            setting.validate()?;
        }
        Ok(())
    }

    /// Store a raw excluded-paths entry and reparse the list.
    pub fn set_excluded_paths(&mut self, raw: &str) {
        self.excluded_paths = raw.to_string();
        self.exclude_paths = split_excluded_paths(raw);
    }

    /// Whether a vault path is excluded from processing.
    ///
    /// Exact matches always exclude; paths strictly under an entry are
    /// excluded only when `exclude_subpaths` is set.
    #[must_use]
    pub fn is_path_excluded(&self, path: &str) -> bool {
        self.exclude_paths.iter().any(|entry| {
            !entry.is_empty()
                && (path == entry || (self.exclude_subpaths && vpath::is_inside(path, entry)))
        })
    }

    /// Whether an extension matches the exclude pattern. An empty or
    /// invalid pattern excludes nothing.
    #[must_use]
    pub fn is_extension_excluded(&self, ext: &str) -> bool {
        if self.exclude_extension_pattern.is_empty() {
            return false;
        }
        match Regex::new(&self.exclude_extension_pattern) {
            Ok(re) => re.is_match(ext),
            Err(_) => false,
        }
    }
}

/// Split a `;`-separated excluded-paths entry, trimming whitespace and
/// dropping empty items.
#[must_use]
pub fn split_excluded_paths(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
