//! Operation: re-resolve every branch to its current head and rewrite Sdm.lock.

use std::path::Path;
use std::sync::Arc;

use sdm_core::config::BranchPolicy;
use sdm_core::lockfile::{LockedPackage, Lockfile};
use sdm_core::LOCKFILE_FILE;

use crate::ops_lock::write_if_changed;
use crate::project::Project;
use crate::reporter::ConsoleReporter;
use crate::{resolve_project, ResolveSettings};

/// One difference between the previous and the new lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChange {
    Added { name: String, to: String },
    Removed { name: String, from: String },
    Updated { name: String, from: String, to: String },
}

impl LockChange {
    fn label(&self) -> &'static str {
        match self {
            LockChange::Added { .. } => "Adding",
            LockChange::Removed { .. } => "Removing",
            LockChange::Updated { .. } => "Updating",
        }
    }

    fn describe(&self) -> String {
        match self {
            LockChange::Added { name, to } => format!("{name} {to}"),
            LockChange::Removed { name, from } => format!("{name} {from}"),
            LockChange::Updated { name, from, to } => format!("{name} {from} -> {to}"),
        }
    }
}

/// Resolve with branch pins refreshed, rewrite `Sdm.lock` and report what moved.
pub async fn update(project_root: &Path, settings: &ResolveSettings) -> miette::Result<()> {
    let project = Project::load(project_root)?;
    let reporter = Arc::new(ConsoleReporter::new(settings.output_format));
    if settings.branch_policy == Some(BranchPolicy::Sticky) {
        reporter.warn("--branch-policy sticky is ignored by update");
    }
    let mut options = settings.options(&project.config);
    options.branch_policy = BranchPolicy::Refresh;

    let (resolution, _source) = resolve_project(&project, options, reporter.clone()).await?;
    let lockfile = resolution.graph.to_lockfile();

    let changes = diff(project.lockfile.as_ref(), &lockfile);
    for change in &changes {
        reporter.status(change.label(), &change.describe());
    }
    write_if_changed(&project, &lockfile)?;

    if changes.is_empty() {
        reporter.info("Updated", "all packages already at their latest revision");
    } else {
        reporter.status(
            "Updated",
            &format!("{} packages in {LOCKFILE_FILE}", changes.len()),
        );
    }
    Ok(())
}

/// Compare two lockfiles package by package, in name order.
pub fn diff(old: Option<&Lockfile>, new: &Lockfile) -> Vec<LockChange> {
    let empty = Lockfile::default();
    let old = old.unwrap_or(&empty);
    let mut changes = Vec::new();

    for pkg in &new.package {
        match old.find(&pkg.name) {
            None => changes.push(LockChange::Added {
                name: pkg.name.clone(),
                to: describe(pkg),
            }),
            Some(prev) if prev.revision != pkg.revision || prev.location != pkg.location => {
                changes.push(LockChange::Updated {
                    name: pkg.name.clone(),
                    from: describe(prev),
                    to: describe(pkg),
                })
            }
            Some(_) => {}
        }
    }
    for pkg in &old.package {
        if new.find(&pkg.name).is_none() {
            changes.push(LockChange::Removed {
                name: pkg.name.clone(),
                from: describe(pkg),
            });
        }
    }

    changes.sort_by(|a, b| change_name(a).cmp(change_name(b)));
    changes
}

fn change_name(change: &LockChange) -> &str {
    match change {
        LockChange::Added { name, .. }
        | LockChange::Removed { name, .. }
        | LockChange::Updated { name, .. } => name,
    }
}

fn describe(pkg: &LockedPackage) -> String {
    let short = pkg.revision.get(..7).unwrap_or(&pkg.revision);
    match (&pkg.version, &pkg.branch) {
        (Some(v), _) => format!("{v} ({short})"),
        (None, Some(b)) => format!("@{b} ({short})"),
        (None, None) => format!("({short})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, version: Option<&str>, revision: &str) -> LockedPackage {
        LockedPackage {
            name: name.into(),
            location: format!("https://example.com/{name}.git"),
            revision: revision.into(),
            version: version.map(String::from),
            branch: None,
            dependencies: vec![],
        }
    }

    #[test]
    fn first_lock_adds_everything() {
        let new = Lockfile::generate(vec![
            pkg("b", Some("1.0.0"), "bbbbbbbbbb"),
            pkg("a", None, "aaaaaaaaaa"),
        ]);
        let changes = diff(None, &new);
        assert_eq!(
            changes,
            vec![
                LockChange::Added {
                    name: "a".into(),
                    to: "(aaaaaaa)".into()
                },
                LockChange::Added {
                    name: "b".into(),
                    to: "1.0.0 (bbbbbbb)".into()
                },
            ]
        );
    }

    #[test]
    fn detects_updates_and_removals() {
        let old = Lockfile::generate(vec![
            pkg("a", Some("1.0.0"), "a100000000"),
            pkg("gone", Some("0.1.0"), "0000000000"),
            pkg("same", Some("2.0.0"), "5555555555"),
        ]);
        let new = Lockfile::generate(vec![
            pkg("a", Some("1.1.0"), "a110000000"),
            pkg("same", Some("2.0.0"), "5555555555"),
        ]);

        let changes = diff(Some(&old), &new);
        assert_eq!(
            changes,
            vec![
                LockChange::Updated {
                    name: "a".into(),
                    from: "1.0.0 (a100000)".into(),
                    to: "1.1.0 (a110000)".into()
                },
                LockChange::Removed {
                    name: "gone".into(),
                    from: "0.1.0 (0000000)".into()
                },
            ]
        );
    }

    #[test]
    fn branch_moves_are_updates() {
        let mut before = pkg("lib", None, "1111111111");
        before.branch = Some("main".into());
        let mut after = before.clone();
        after.revision = "2222222222".into();

        let changes = diff(
            Some(&Lockfile::generate(vec![before])),
            &Lockfile::generate(vec![after]),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].describe(), "lib @main (1111111) -> @main (2222222)");
    }

    #[test]
    fn identical_lockfiles_have_no_changes() {
        let lock = Lockfile::generate(vec![pkg("a", Some("1.0.0"), "abcdef0123")]);
        assert!(diff(Some(&lock), &lock).is_empty());
    }
}
