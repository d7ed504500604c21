//! Remote addressing and `git ls-remote` output parsing.

use std::collections::HashMap;
use std::path::Path;

use sdm_resolver::{RefKind, RemoteRef};

/// Whether `location` names a filesystem path rather than a URL.
///
/// URLs carry a scheme (`https://`, `ssh://`, `file://`) and scp-style
/// addresses (`git@host:org/repo.git`) carry a colon; everything else is a path.
pub fn is_local_path(location: &str) -> bool {
    if location.contains("://") {
        return false;
    }
    Path::new(location).is_absolute() || !location.contains(':')
}

/// The address to hand to `git`. Relative paths are taken relative to `base`.
pub fn remote_url(location: &str, base: Option<&Path>) -> String {
    match base {
        Some(base) if is_local_path(location) && Path::new(location).is_relative() => {
            base.join(location).display().to_string()
        }
        _ => location.to_string(),
    }
}

/// Whether `location` may be handed to `git` as a repository address.
///
/// Anything git could read as an option (a leading `-`) or that spans lines
/// is refused.
pub fn is_valid_location(location: &str) -> bool {
    !location.trim().is_empty()
        && !location.starts_with('-')
        && !location.chars().any(char::is_control)
}

/// Whether `revision` is a commit id or a ref name `git check-ref-format
/// --allow-onelevel` would accept.
pub fn is_valid_revision(revision: &str) -> bool {
    if revision.is_empty() || revision == "@" || revision.starts_with('-') {
        return false;
    }
    if revision.starts_with('/') || revision.ends_with('/') || revision.ends_with('.') {
        return false;
    }
    if revision.ends_with(".lock")
        || revision.contains("..")
        || revision.contains("//")
        || revision.contains("@{")
    {
        return false;
    }
    if revision.split('/').any(|part| part.starts_with('.')) {
        return false;
    }
    !revision
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || "~^:?*[\\".contains(c))
}

/// Parse `git ls-remote --tags --heads` output.
///
/// Annotated tags appear twice: once for the tag object and once more with a
/// `^{}` suffix for the commit it points at. The commit wins.
pub fn parse_ls_remote(output: &str) -> Vec<RemoteRef> {
    let mut refs = Vec::new();
    let mut peeled: HashMap<&str, &str> = HashMap::new();

    for line in output.lines() {
        let Some((commit, name)) = line.trim_end().split_once('\t') else {
            continue;
        };
        if let Some(branch) = name.strip_prefix("refs/heads/") {
            refs.push(RemoteRef::branch(branch, commit));
        } else if let Some(tag) = name.strip_prefix("refs/tags/") {
            match tag.strip_suffix("^{}") {
                Some(tag) => {
                    peeled.insert(tag, commit);
                }
                None => refs.push(RemoteRef::tag(tag, commit)),
            }
        }
    }

    for r in refs.iter_mut().filter(|r| r.kind == RefKind::Tag) {
        if let Some(commit) = peeled.get(r.name.as_str()) {
            r.commit = commit.to_string();
        }
    }
    refs
}
