//! Placement of newly created attachment files.
//!
//! On a create notification for a non-note file, compute where the
//! attachment belongs for the currently active note, move it there, and
//! update the freshly inserted link in the active document.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use satchel_core::overrides::{resolve_setting, SettingLookup};
use satchel_core::template::{resolve_attachment_folder, resolve_attachment_name};
use satchel_core::{kind, vpath, Settings};

use crate::link;
use crate::storage::{Storage, StorageError};

/// Accessor for the document open in the host editor.
pub trait ActiveDocument {
    fn content(&self) -> String;
    fn set_content(&mut self, content: String);
}

/// Why a created file was not taken in. Expected steady-state outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeSkip {
    /// Notes are never treated as attachments.
    NoteFile,
    /// Not an image and handle-all is off.
    NotHandled,
    /// The created file's extension matches the exclude pattern.
    ExcludedExtension,
    /// The active note's path is excluded from processing.
    ExcludedPath,
    /// No active note to attribute the attachment to.
    NoActiveNote,
    /// The create notification replayed an old file at startup.
    StaleCreate,
}

/// Outcome of processing one created file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    Skipped(IntakeSkip),
    Moved {
        from: String,
        dest: String,
        link_updated: bool,
    },
}

/// Process a newly created file.
///
/// The destination folder is created when absent. A failing move leaves
/// the created file in its original location.
///
/// # Errors
///
/// Storage failures (mkdir, move) are propagated to the caller.
pub fn process_created<S: Storage + ?Sized>(
    storage: &S,
    settings: &Settings,
    created_path: &str,
    active_note: Option<&str>,
    now: DateTime<Utc>,
    doc: Option<&mut dyn ActiveDocument>,
) -> Result<Intake, StorageError> {
    let created_name = vpath::file_name(created_path);
    let created_ext = vpath::extension(created_path);

    if kind::is_note_extension(created_ext) {
        return Ok(Intake::Skipped(IntakeSkip::NoteFile));
    }
    let image = kind::is_image_extension(created_ext) || kind::is_pasted_image_name(created_name);
    if !image {
        if !settings.handle_all {
            return Ok(Intake::Skipped(IntakeSkip::NotHandled));
        }
        if settings.is_extension_excluded(created_ext) {
            debug!(%created_path, "excluded by extension pattern");
            return Ok(Intake::Skipped(IntakeSkip::ExcludedExtension));
        }
    }

    let Some(note_path) = active_note else {
        return Ok(Intake::Skipped(IntakeSkip::NoActiveNote));
    };
    let setting = match resolve_setting(settings, note_path) {
        SettingLookup::Excluded => return Ok(Intake::Skipped(IntakeSkip::ExcludedPath)),
        SettingLookup::Resolved { setting, .. } => setting,
    };

    let note_stem = vpath::stem(note_path);
    let attach_dir = resolve_attachment_folder(
        note_stem,
        vpath::parent(note_path),
        &setting,
        &settings.vault_attachment_dir,
    );
    let base = resolve_attachment_name(
        note_stem,
        vpath::stem(created_path),
        &setting,
        &settings.date_format,
        now,
    );
    let attach_name = format!("{base}.{created_ext}");
    let dest = vpath::join(&attach_dir, &attach_name);
    debug!(%created_path, %dest, "intake destination");

    if !storage.exists(&attach_dir)? {
        storage.mkdir(&attach_dir)?;
    }

    let old_link = link::link_text(created_path);
    storage.rename(created_path, &dest)?;
    info!("renamed {created_name} to {attach_name}");

    let mut link_updated = false;
    if let Some(doc) = doc {
        let new_link = link::link_text(&dest);
        let content = doc.content();
        let (rewritten, changed) = match vpath::extension(note_path) {
            "md" => link::rewrite_markdown_link(&content, &old_link, &new_link),
            "canvas" => link::rewrite_canvas_file_ref(&content, created_path, &dest),
            _ => (content.clone(), false),
        };
        if changed {
            doc.set_content(rewritten);
            link_updated = true;
            info!("updated 1 link in {note_path}");
        }
    }

    Ok(Intake::Moved {
        from: created_path.to_string(),
        dest,
        link_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;
    use satchel_core::{AttachmentPathSettings, SaveMode};

    struct FakeDoc {
        content: String,
    }

    impl ActiveDocument for FakeDoc {
        fn content(&self) -> String {
            self.content.clone()
        }
        fn set_content(&mut self, content: String) {
            self.content = content;
        }
    }

    fn settings() -> Settings {
        Settings {
            attach_path: AttachmentPathSettings {
                attachment_root: "./assets".to_string(),
                save_mode: SaveMode::NextToNote,
                attachment_path: "${notename}".to_string(),
                attach_format: "${notename}-${date}".to_string(),
                ..AttachmentPathSettings::default()
            },
            date_format: "%Y%m%d".to_string(),
            ..Settings::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn pasted_image_moves_next_to_the_note_and_updates_the_link() {
        let storage = MemoryStorage::new();
        storage.add_file("Pasted image 20260807120000.png");
        let mut doc = FakeDoc {
            content: "intro text\n![[Pasted image 20260807120000.png]]\n".to_string(),
        };

        let outcome = process_created(
            &storage,
            &settings(),
            "Pasted image 20260807120000.png",
            Some("Notes/Intro.md"),
            now(),
            Some(&mut doc),
        )
        .unwrap();

        assert_eq!(
            outcome,
            Intake::Moved {
                from: "Pasted image 20260807120000.png".to_string(),
                dest: "Notes/assets/Intro/Intro-20260807.png".to_string(),
                link_updated: true,
            }
        );
        assert!(storage.has_file("Notes/assets/Intro/Intro-20260807.png"));
        assert!(doc.content.contains("![[Notes/assets/Intro/Intro-20260807.png]]"));
        assert!(!doc.content.contains("![[Pasted image"));
    }

    #[test]
    fn canvas_note_gets_a_structured_file_reference_update() {
        let storage = MemoryStorage::new();
        storage.add_file("shot.png");
        let mut doc = FakeDoc {
            content: r#"{"nodes":[{"type":"file","file":"shot.png"}]}"#.to_string(),
        };

        let outcome = process_created(
            &storage,
            &settings(),
            "shot.png",
            Some("Board.canvas"),
            now(),
            Some(&mut doc),
        )
        .unwrap();

        match outcome {
            Intake::Moved { dest, link_updated, .. } => {
                assert!(link_updated);
                assert!(doc.content.contains(&format!(r#""file":"{dest}""#)));
            }
            other => panic!("expected Moved, got {other:?}"),
        }
    }

    #[test]
    fn non_image_without_handle_all_is_left_alone() {
        let storage = MemoryStorage::new();
        storage.add_file("report.pdf");

        let outcome = process_created(
            &storage,
            &settings(),
            "report.pdf",
            Some("Notes/Intro.md"),
            now(),
            None,
        )
        .unwrap();
        assert_eq!(outcome, Intake::Skipped(IntakeSkip::NotHandled));
        assert!(storage.has_file("report.pdf"));
    }

    #[test]
    fn excluded_extension_with_handle_all_is_skipped_entirely() {
        let storage = MemoryStorage::new();
        storage.add_file("report.pdf");
        let mut settings = settings();
        settings.handle_all = true;
        settings.exclude_extension_pattern = "pdf|zip".to_string();

        let outcome = process_created(
            &storage,
            &settings,
            "report.pdf",
            Some("Notes/Intro.md"),
            now(),
            None,
        )
        .unwrap();
        assert_eq!(outcome, Intake::Skipped(IntakeSkip::ExcludedExtension));
        assert!(storage.has_file("report.pdf"));
    }

    #[test]
    fn handle_all_takes_in_non_image_files() {
        let storage = MemoryStorage::new();
        storage.add_file("report.pdf");
        let mut settings = settings();
        settings.handle_all = true;

        let outcome = process_created(
            &storage,
            &settings,
            "report.pdf",
            Some("Notes/Intro.md"),
            now(),
            None,
        )
        .unwrap();
        match outcome {
            Intake::Moved { dest, .. } => {
                assert_eq!(dest, "Notes/assets/Intro/Intro-20260807.pdf");
            }
            other => panic!("expected Moved, got {other:?}"),
        }
    }

    #[test]
    fn created_note_files_are_ignored() {
        let storage = MemoryStorage::new();
        let outcome = process_created(
            &storage,
            &settings(),
            "New Note.md",
            Some("Notes/Intro.md"),
            now(),
            None,
        )
        .unwrap();
        assert_eq!(outcome, Intake::Skipped(IntakeSkip::NoteFile));
    }

    #[test]
    fn missing_active_note_is_reported() {
        let storage = MemoryStorage::new();
        storage.add_file("shot.png");
        let outcome =
            process_created(&storage, &settings(), "shot.png", None, now(), None).unwrap();
        assert_eq!(outcome, Intake::Skipped(IntakeSkip::NoActiveNote));
    }

    #[test]
    fn excluded_active_note_path_skips_intake() {
        let storage = MemoryStorage::new();
        storage.add_file("shot.png");
        let mut settings = settings();
        settings.set_excluded_paths("Notes");
        settings.exclude_subpaths = true;

        let outcome = process_created(
            &storage,
            &settings,
            "shot.png",
            Some("Notes/Intro.md"),
            now(),
            None,
        )
        .unwrap();
        assert_eq!(outcome, Intake::Skipped(IntakeSkip::ExcludedPath));
        assert!(storage.has_file("shot.png"));
    }

    #[test]
    fn failed_move_propagates_and_leaves_the_file_in_place() {
        let storage = MemoryStorage::new();
        storage.add_file("shot.png");
        // occupy the destination
        storage.add_file("Notes/assets/Intro/Intro-20260807.png");

        let result = process_created(
            &storage,
            &settings(),
            "shot.png",
            Some("Notes/Intro.md"),
            now(),
            None,
        );
        assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
        assert!(storage.has_file("shot.png"));
    }
}
