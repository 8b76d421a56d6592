//! Rename classification and minimal folder-rename computation.

use crate::settings::AttachmentPathSettings;
use crate::template::{VAR_NOTENAME, VAR_NOTEPATH};
use crate::vpath;

/// What a rename event means for the renamed note.
///
/// A rename is folder-classified when the stem is unchanged: the event was
/// fired because a containing folder moved. A file whose extension changed
/// but whose stem did not is classified the same way; the stem is the only
/// signal the event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameKind {
    Folder,
    File,
}

/// Which attachment identities depend on the note's identity, derived from
/// template variable usage. Gates which relocation phases run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachScope {
    /// Neither template references the note; renames propagate nothing.
    None,
    /// Only the folder template is note-sensitive.
    Folder,
    /// Only the filename template is note-sensitive.
    File,
    /// Both templates are note-sensitive.
    Both,
}

/// Classify a rename from the old and new full paths.
#[must_use]
pub fn classify_rename(old_path: &str, new_path: &str) -> RenameKind {
    if vpath::stem(old_path) == vpath::stem(new_path) {
        RenameKind::Folder
    } else {
        RenameKind::File
    }
}

/// Derive the relocation scope from a configuration record.
#[must_use]
pub fn attach_scope(setting: &AttachmentPathSettings) -> AttachScope {
    let folder_sensitive = setting.attachment_path.contains(VAR_NOTENAME)
        || setting.attachment_path.contains(VAR_NOTEPATH);
    let file_sensitive = setting.attach_format.contains(VAR_NOTENAME);
    match (folder_sensitive, file_sensitive) {
        (true, true) => AttachScope::Both,
        (true, false) => AttachScope::Folder,
        (false, true) => AttachScope::File,
        (false, false) => AttachScope::None,
    }
}

/// Truncate two attachment paths at their first differing segment,
/// yielding the minimal folder rename.
///
/// `a/b/old` vs `a/b/new` becomes `a/b/old` → `a/b/new`; a deeper pair
/// like `a/old/sub` vs `a/new/sub` becomes `a/old` → `a/new`, so segments
/// shared with unrelated content are never touched. Equal inputs come back
/// unchanged.
#[must_use]
pub fn strip_paths(src: &str, dst: &str) -> (String, String) {
    if src == dst {
        return (src.to_string(), dst.to_string());
    }
    let s: Vec<&str> = src.split('/').collect();
    let d: Vec<&str> = dst.split('/').collect();
    let mut idx = 0;
    while idx < s.len() && idx < d.len() && s[idx] == d[idx] {
        idx += 1;
    }
    let end_s = (idx + 1).min(s.len());
    let end_d = (idx + 1).min(d.len());
    (s[..end_s].join("/"), d[..end_d].join("/"))
}
