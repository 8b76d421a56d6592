//! Attachment folder and filename resolution.
//!
//! A tiny template language with a fixed variable set. Substitution is a
//! single left-to-right pass; unknown `${...}` tokens are left literal so
//! a typo degrades to visible text instead of silently vanishing. Both
//! resolvers are total: they always return a string and never fail.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::settings::{AttachmentPathSettings, SaveMode};
use crate::vpath;

/// Note directory, substituted in the folder template.
pub const VAR_NOTEPATH: &str = "${notepath}";
/// Note stem, substituted in both templates.
pub const VAR_NOTENAME: &str = "${notename}";
/// Name of the note's immediate parent folder.
pub const VAR_PARENT: &str = "${parent}";
/// Timestamp rendered with the configured date pattern.
pub const VAR_DATE: &str = "${date}";
/// Original stem of the created attachment.
pub const VAR_ORIGINALNAME: &str = "${originalname}";

/// Pattern used when the configured date pattern is empty or malformed.
pub const FALLBACK_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Compute the attachment folder for a note.
///
/// The root comes from the save mode: a fixed folder, a folder next to
/// the note, or the host's vault-wide attachment directory
/// (`/` = vault root, `./` = the note's folder, `./sub` = a subfolder of
/// it, anything else = that literal path). The folder template is then
/// appended with `${notepath}`, `${notename}` and `${parent}` substituted,
/// and the result normalized.
#[must_use]
pub fn resolve_attachment_folder(
    note_name: &str,
    note_path: &str,
    setting: &AttachmentPathSettings,
    vault_attachment_dir: &str,
) -> String {
    let root = resolve_root(note_path, setting, vault_attachment_dir);
    let sub = substitute(
        &setting.attachment_path,
        &[
            (VAR_NOTEPATH, note_path),
            (VAR_NOTENAME, note_name),
            (VAR_PARENT, vpath::file_name(note_path)),
        ],
    );
    let joined = vpath::join(&root, &sub);
    if joined == "/" {
        joined
    } else {
        vpath::normalize(&joined)
    }
}

/// Compute the (extension-less) name for a newly created attachment.
///
/// `now` is injected so callers can pin the timestamp; production wiring
/// passes the wall clock.
#[must_use]
pub fn resolve_attachment_name(
    note_name: &str,
    original_name: &str,
    setting: &AttachmentPathSettings,
    date_pattern: &str,
    now: DateTime<Utc>,
) -> String {
    let date = format_date(now, date_pattern);
    substitute(
        &setting.attach_format,
        &[
            (VAR_DATE, &date),
            (VAR_NOTENAME, note_name),
            (VAR_ORIGINALNAME, original_name),
        ],
    )
}

fn resolve_root(
    note_path: &str,
    setting: &AttachmentPathSettings,
    vault_attachment_dir: &str,
) -> String {
    let root = match setting.save_mode {
        SaveMode::FixedFolder => setting.attachment_root.clone(),
        SaveMode::NextToNote => {
            let sub = setting
                .attachment_root
                .strip_prefix("./")
                .unwrap_or(&setting.attachment_root);
            vpath::join(note_path, sub)
        }
        SaveMode::VaultDefault => match vault_attachment_dir {
            "/" => return "/".to_string(),
            "./" => note_path.to_string(),
            dir => match dir.strip_prefix("./") {
                Some(sub) => vpath::join(note_path, sub),
                None => dir.to_string(),
            },
        },
    };
    vpath::normalize(&root)
}

/// Render `now` with an strftime pattern, falling back to
/// [`FALLBACK_DATE_FORMAT`] when the pattern is empty or malformed.
#[must_use]
pub fn format_date(now: DateTime<Utc>, pattern: &str) -> String {
    if pattern.is_empty() {
        return now.format(FALLBACK_DATE_FORMAT).to_string();
    }
    let items: Vec<Item> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return now.format(FALLBACK_DATE_FORMAT).to_string();
    }
    now.format_with_items(items.into_iter()).to_string()
}

/// Single-pass `${...}` substitution. Tokens not present in `vars` stay
/// literal; scanning resumes right after an unrecognized `${` so a
/// recognized token is substituted wherever it appears.
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let token = tail.find('}').map(|end| &tail[..=end]);
        let known = token.and_then(|t| {
            vars.iter()
                .find(|(name, _)| *name == t)
                .map(|(_, value)| (t, *value))
        });
        match known {
            Some((t, value)) => {
                out.push_str(value);
                rest = &tail[t.len()..];
            }
            None => {
                out.push_str("${");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}
