//! Event orchestration: the glue between host notifications and the
//! engines, plus settings persistence on every mutation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use satchel_core::overrides::update_override_keys;
use satchel_core::rename::RenameKind;
use satchel_core::{AttachmentPathSettings, SatchelError, Settings};

use crate::intake::{process_created, ActiveDocument, Intake, IntakeSkip};
use crate::relocate::{relocate_attachments, Relocation, RenameEvent};
use crate::storage::{Storage, StorageError};
use crate::store::SettingsStore;

/// Create events older than this replay existing files at startup.
pub const MAX_CREATE_AGE: Duration = Duration::from_secs(1);

/// Drives the engines from host events and owns the settings lifecycle:
/// loaded on construction, persisted immediately after every mutation.
pub struct VaultHandler<S> {
    storage: S,
    store: SettingsStore,
    settings: Settings,
}

impl<S: Storage> VaultHandler<S> {
    /// Load settings and wire up the handler.
    ///
    /// # Errors
    ///
    /// Fails when the settings file exists but cannot be read or parsed.
    pub fn new(storage: S, store: SettingsStore) -> Result<Self, SatchelError> {
        let settings = store.load()?;
        Ok(Self {
            storage,
            store,
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Handle a create notification.
    ///
    /// `age` is the time since the file appeared on disk, when known;
    /// stale notifications are replays from a startup scan and skipped.
    ///
    /// # Errors
    ///
    /// Storage failures are propagated; the created file stays put.
    pub fn on_create(
        &self,
        created_path: &str,
        active_note: Option<&str>,
        age: Option<Duration>,
        now: DateTime<Utc>,
        doc: Option<&mut dyn ActiveDocument>,
    ) -> Result<Intake, StorageError> {
        debug!(%created_path, "create event");
        if age.is_some_and(|age| age > MAX_CREATE_AGE) {
            return Ok(Intake::Skipped(IntakeSkip::StaleCreate));
        }
        let outcome = process_created(
            &self.storage,
            &self.settings,
            created_path,
            active_note,
            now,
            doc,
        )?;
        if outcome == Intake::Skipped(IntakeSkip::NoActiveNote) {
            warn!("no active note found for created file {created_path}");
        }
        Ok(outcome)
    }

    /// Handle a rename notification for a file or folder.
    ///
    /// Override keys under the old path are rewritten and persisted in the
    /// same transaction as the event, then attachment relocation runs.
    ///
    /// # Errors
    ///
    /// Settings persistence and storage failures are propagated; already
    /// completed relocation steps are not rolled back.
    pub fn on_rename(
        &mut self,
        new_path: &str,
        old_path: &str,
        entity_is_folder: bool,
    ) -> Result<Relocation, SatchelError> {
        debug!(%old_path, %new_path, "rename event");
        if update_override_keys(&mut self.settings, new_path, old_path) {
            self.store.save(&self.settings)?;
        }

        let event = RenameEvent {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
        };
        let outcome =
            relocate_attachments(&self.storage, &self.settings, &event, entity_is_folder)?;
        match &outcome {
            Relocation::Conflict {
                dest,
                kind: RenameKind::File,
            } => warn!("same file name exists: {dest}"),
            Relocation::Conflict {
                dest,
                kind: RenameKind::Folder,
            } => warn!("folder already exists: {dest}"),
            Relocation::Completed {
                folder_move,
                file_moves,
            } => {
                if let Some((src, dst)) = folder_move {
                    info!("moved attachment folder {src} to {dst}");
                }
                for (src, dst) in file_moves {
                    info!("renamed attachment {src} to {dst}");
                }
            }
            Relocation::Skipped(reason) => debug!(?reason, "rename skipped"),
        }
        Ok(outcome)
    }

    /// Install or replace the override entry for a vault path.
    ///
    /// # Errors
    ///
    /// An invalid record is rejected and nothing is saved.
    pub fn set_override(
        &mut self,
        path: &str,
        setting: AttachmentPathSettings,
    ) -> Result<(), SatchelError> {
        setting.validate()?;
        self.settings
            .override_path
            .insert(path.to_string(), setting);
        self.store.save(&self.settings)
    }

    /// Delete the override entry for a vault path. Returns whether an
    /// entry existed.
    ///
    /// # Errors
    ///
    /// Persistence failures are propagated.
    pub fn reset_override(&mut self, path: &str) -> Result<bool, SatchelError> {
        let removed = self.settings.override_path.remove(path).is_some();
        if removed {
            self.store.save(&self.settings)?;
            info!("reset attachment setting of {path}");
        }
        Ok(removed)
    }
}
