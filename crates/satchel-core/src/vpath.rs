//! Vault-relative path helpers.
//!
//! Vault paths are `/`-separated strings relative to the vault root — the
//! same identity the host uses for files. Operating on strings instead of
//! `std::path` keeps the resolvers pure and platform-independent; the
//! storage adapter maps them onto real locations at the edge.

/// Normalize a vault path: collapse separators, drop `.` segments, strip
/// leading and trailing slashes. The literal root `/` is preserved.
#[must_use]
pub fn normalize(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    segments.join("/")
}

/// Join two vault paths. An empty or root-`/` side contributes nothing.
#[must_use]
pub fn join(base: &str, rest: &str) -> String {
    if rest.is_empty() {
        return base.to_string();
    }
    if base.is_empty() || base == "/" {
        return rest.to_string();
    }
    format!("{base}/{rest}")
}

/// Parent directory of a vault path. The vault root is the empty string.
#[must_use]
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Final component of a vault path.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name with the extension stripped. Dotfiles keep their full name.
#[must_use]
pub fn stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Extension without the dot, or `""` if there is none.
#[must_use]
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[idx + 1..],
        _ => "",
    }
}

/// Whether `path` lies strictly inside `ancestor`.
#[must_use]
pub fn is_inside(path: &str, ancestor: &str) -> bool {
    !ancestor.is_empty()
        && path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
