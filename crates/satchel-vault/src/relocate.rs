//! Rename propagation for attachment folders and files.
//!
//! One rename event runs through a guard chain, then up to two phases:
//! the folder phase moves the attachment folder by its minimal rename,
//! the file phase substitutes the new note stem into attachment names.
//! A conflict aborts the event without touching siblings; a storage error
//! aborts the remaining steps without rolling back completed ones.

use tracing::debug;

use satchel_core::overrides::{resolve_setting, SettingLookup};
use satchel_core::rename::{attach_scope, classify_rename, strip_paths, AttachScope, RenameKind};
use satchel_core::template::resolve_attachment_folder;
use satchel_core::{kind, vpath, Settings};

use crate::storage::{Storage, StorageError};

/// A rename notification from the host: the entity's new path plus where
/// it used to live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEvent {
    pub old_path: String,
    pub new_path: String,
}

/// Why a rename event required no relocation. These are expected
/// steady-state outcomes, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Auto-rename is switched off.
    AutoRenameDisabled,
    /// The old path is excluded from processing.
    ExcludedPath,
    /// No template references the note identity.
    NoVariableInUse,
    /// Folder renames only refresh override keys; each contained note's
    /// own event drives its attachment moves.
    FolderEvent,
    /// The renamed entity is an attachment, not a note.
    NotANote,
    /// The old attachment folder does not exist; nothing to move.
    SourceMissing,
}

/// Outcome of propagating one rename event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    Skipped(SkipReason),
    /// The computed destination already exists. `kind` distinguishes a
    /// file-triggered conflict from a folder-triggered one for reporting.
    Conflict { dest: String, kind: RenameKind },
    Completed {
        folder_move: Option<(String, String)>,
        file_moves: Vec<(String, String)>,
    },
}

/// Propagate a note rename to its attachments.
///
/// # Errors
///
/// Storage failures during a move are returned as-is; steps already
/// completed stay completed.
pub fn relocate_attachments<S: Storage + ?Sized>(
    storage: &S,
    settings: &Settings,
    event: &RenameEvent,
    entity_is_folder: bool,
) -> Result<Relocation, StorageError> {
    if !settings.auto_rename_attachment {
        return Ok(Relocation::Skipped(SkipReason::AutoRenameDisabled));
    }

    // the event is keyed by where the note used to live
    let setting = match resolve_setting(settings, &event.old_path) {
        SettingLookup::Excluded => return Ok(Relocation::Skipped(SkipReason::ExcludedPath)),
        SettingLookup::Resolved { setting, .. } => setting,
    };

    let scope = attach_scope(&setting);
    if scope == AttachScope::None {
        return Ok(Relocation::Skipped(SkipReason::NoVariableInUse));
    }
    if entity_is_folder {
        return Ok(Relocation::Skipped(SkipReason::FolderEvent));
    }
    if !kind::is_note_extension(vpath::extension(&event.old_path)) {
        return Ok(Relocation::Skipped(SkipReason::NotANote));
    }

    let kind = classify_rename(&event.old_path, &event.new_path);
    let old_stem = vpath::stem(&event.old_path);
    let new_stem = vpath::stem(&event.new_path);

    let old_attach = resolve_attachment_folder(
        old_stem,
        vpath::parent(&event.old_path),
        &setting,
        &settings.vault_attachment_dir,
    );
    let new_attach = resolve_attachment_folder(
        new_stem,
        vpath::parent(&event.new_path),
        &setting,
        &settings.vault_attachment_dir,
    );
    debug!(old = %old_attach, new = %new_attach, ?kind, "attachment paths for rename");

    if !storage.exists(&old_attach)? {
        return Ok(Relocation::Skipped(SkipReason::SourceMissing));
    }

    let mut folder_move = None;
    if matches!(scope, AttachScope::Folder | AttachScope::Both) {
        let (src, dst) = strip_paths(&old_attach, &new_attach);
        debug!(%src, %dst, "stripped folder rename");
        if src != dst {
            if storage.exists(&dst)? {
                return Ok(Relocation::Conflict { dest: dst, kind });
            }
            storage.rename(&src, &dst)?;
            folder_move = Some((src, dst));
        }
    }

    let mut file_moves = Vec::new();
    if matches!(scope, AttachScope::File | AttachScope::Both) && kind == RenameKind::File {
        // the folder phase, if any, already ran: list the new location
        for file in storage.list(&new_attach)?.files {
            let name = vpath::file_name(&file);
            let ext = vpath::extension(name);
            if !kind::is_image_extension(ext) {
                debug!(%file, "not an accepted extension, left untouched");
                continue;
            }
            if settings.handle_all && settings.is_extension_excluded(ext) {
                debug!(%file, "excluded extension, left untouched");
                continue;
            }
            let renamed = name.replacen(old_stem, new_stem, 1);
            if renamed == name {
                continue;
            }
            let dest = vpath::join(&new_attach, &renamed);
            storage.rename(&file, &dest)?;
            file_moves.push((file, dest));
        }
    }

    Ok(Relocation::Completed {
        folder_move,
        file_moves,
    })
}
