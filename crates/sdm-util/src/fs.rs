use std::path::{Component, Path, PathBuf};

/// Walk up from `start` to the nearest directory holding `filename`
/// (how the CLI finds the project's `Sdm.toml`).
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(filename).is_file())
        .map(Path::to_path_buf)
}

/// Create `path` and its parents unless it is already a directory.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path)
}

/// Remove a directory tree if present. Missing directories are not an error.
pub fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// `base/name`, provided `name` is exactly one ordinary path component.
///
/// Returns `None` for names such as `..`, `a/b` or absolute paths, which
/// would land outside `base`.
pub fn child_dir(base: &Path, name: &str) -> Option<PathBuf> {
    if name.contains(['/', '\\']) {
        return None;
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => Some(base.join(part)),
        _ => None,
    }
}
