//! File classification helpers.
//!
//! A note is a `md` or `canvas` file; everything else is attachment
//! material. Images are always handled by the intake path; other files
//! only when the handle-all switch is on.

/// Extensions that identify a note.
pub const NOTE_EXTENSIONS: [&str; 2] = ["md", "canvas"];

/// Image extensions always accepted as attachments.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "avif"];

/// Prefix the host gives to images pasted from the clipboard.
pub const PASTED_IMAGE_PREFIX: &str = "Pasted image ";

/// Whether an extension identifies a note file.
#[must_use]
pub fn is_note_extension(ext: &str) -> bool {
    NOTE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

/// Whether an extension identifies an image file.
#[must_use]
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

/// Whether a file name follows the host's pasted-image naming.
#[must_use]
pub fn is_pasted_image_name(name: &str) -> bool {
    name.starts_with(PASTED_IMAGE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_markdown_or_canvas() {
        assert!(is_note_extension("md"));
        assert!(is_note_extension("canvas"));
        assert!(is_note_extension("MD"));
        assert!(!is_note_extension("png"));
        assert!(!is_note_extension(""));
    }

    #[test]
    fn image_extensions_match_case_insensitively() {
        assert!(is_image_extension("png"));
        assert!(is_image_extension("JPEG"));
        assert!(!is_image_extension("pdf"));
    }

    #[test]
    fn pasted_image_names_are_detected() {
        assert!(is_pasted_image_name("Pasted image 20260807121530.png"));
        assert!(!is_pasted_image_name("diagram.png"));
    }
}
