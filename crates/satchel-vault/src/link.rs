//! Link text generation and rewriting in the active document.
//!
//! Markdown notes embed attachments with wiki links; canvas notes carry a
//! structured `"file"` reference. Rewrites replace the first markdown
//! occurrence (the one just inserted) and every matching canvas node.

use regex::{NoExpand, Regex};

/// Embed link text for an attachment at a vault path.
#[must_use]
pub fn link_text(target: &str) -> String {
    format!("![[{target}]]")
}

/// Replace the first occurrence of `old_link` with `new_link`.
/// Returns the content and whether anything changed.
#[must_use]
pub fn rewrite_markdown_link(content: &str, old_link: &str, new_link: &str) -> (String, bool) {
    if content.contains(old_link) {
        (content.replacen(old_link, new_link, 1), true)
    } else {
        (content.to_string(), false)
    }
}

/// Replace `"file"` references to `old_path` with `new_path` in canvas
/// content.
#[must_use]
pub fn rewrite_canvas_file_ref(content: &str, old_path: &str, new_path: &str) -> (String, bool) {
    let pattern = format!(r#""file"\s*:\s*"{}""#, regex::escape(old_path));
    let Ok(re) = Regex::new(&pattern) else {
        return (content.to_string(), false);
    };
    let replacement = format!(r#""file":"{new_path}""#);
    let rewritten = re.replace_all(content, NoExpand(&replacement));
    let changed = rewritten != content;
    (rewritten.into_owned(), changed)
}
