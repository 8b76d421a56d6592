//! Most-specific-wins configuration lookup.
//!
//! Precedence chain: exact path entry, then nearest folder ancestor entry,
//! then the global record. A matching extension override then overlays the
//! four template fields of whichever record won. Excluded paths short out
//! before any of that.

use crate::settings::{AttachmentPathSettings, Settings};
use crate::vpath;

/// Result of a configuration lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingLookup {
    /// The target path is excluded from processing entirely.
    Excluded,
    /// The applicable configuration, with extension overlay applied.
    /// `used_override` records whether a per-path entry won over the
    /// global record.
    Resolved {
        setting: AttachmentPathSettings,
        used_override: bool,
    },
}

impl SettingLookup {
    /// The resolved setting, or `None` when the path is excluded.
    #[must_use]
    pub fn setting(&self) -> Option<&AttachmentPathSettings> {
        match self {
            SettingLookup::Excluded => None,
            SettingLookup::Resolved { setting, .. } => Some(setting),
        }
    }
}

/// Find the configuration applicable to a vault path.
#[must_use]
pub fn resolve_setting(settings: &Settings, target_path: &str) -> SettingLookup {
    if settings.is_path_excluded(target_path) {
        return SettingLookup::Excluded;
    }

    let (base, used_override) = match settings.override_path.get(target_path) {
        Some(setting) => (setting, true),
        None => match nearest_folder_override(settings, target_path) {
            Some(setting) => (setting, true),
            None => (&settings.attach_path, false),
        },
    };

    SettingLookup::Resolved {
        setting: overlay_extension(base, vpath::extension(target_path)),
        used_override,
    }
}

/// Rewrite override keys after a rename. Handles both a renamed leaf
/// (exact key) and a renamed ancestor folder (every key under the old
/// prefix). Returns whether anything changed, so callers know to persist.
pub fn update_override_keys(settings: &mut Settings, new_path: &str, old_path: &str) -> bool {
    let moves: Vec<(String, String)> = settings
        .override_path
        .keys()
        .filter_map(|key| {
            if key == old_path {
                Some((key.clone(), new_path.to_string()))
            } else if vpath::is_inside(key, old_path) {
                let tail = &key[old_path.len()..];
                Some((key.clone(), format!("{new_path}{tail}")))
            } else {
                None
            }
        })
        .collect();

    for (old_key, new_key) in &moves {
        if let Some(value) = settings.override_path.remove(old_key) {
            settings.override_path.insert(new_key.clone(), value);
        }
    }
    !moves.is_empty()
}

/// Longest folder-scope ancestor entry, if any.
fn nearest_folder_override<'a>(
    settings: &'a Settings,
    target_path: &str,
) -> Option<&'a AttachmentPathSettings> {
    use crate::settings::ScopeType;
    settings
        .override_path
        .iter()
        .filter(|(key, setting)| {
            setting.scope == ScopeType::Folder && vpath::is_inside(target_path, key)
        })
        .max_by_key(|(key, _)| key.len())
        .map(|(_, setting)| setting)
}

fn overlay_extension(base: &AttachmentPathSettings, ext: &str) -> AttachmentPathSettings {
    let mut setting = base.clone();
    if let Some(over) = base
        .extension_overrides
        .iter()
        .find(|over| over.extension == ext)
    {
        setting.attachment_root = over.attachment_root.clone();
        setting.save_mode = over.save_mode;
        setting.attachment_path = over.attachment_path.clone();
        setting.attach_format = over.attach_format.clone();
    }
    setting
}
