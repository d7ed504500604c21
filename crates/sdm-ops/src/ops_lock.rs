//! Operation: resolve all dependencies and regenerate Sdm.lock.

use std::path::Path;
use std::sync::Arc;

use sdm_core::lockfile::Lockfile;
use sdm_core::LOCKFILE_FILE;

use crate::project::Project;
use crate::reporter::ConsoleReporter;
use crate::{resolve_project, ResolveSettings};

/// Resolve (honouring `Sdm.lock` for sticky branches) and write `Sdm.lock`.
pub async fn lock(project_root: &Path, settings: &ResolveSettings) -> miette::Result<()> {
    let project = Project::load(project_root)?;
    let reporter = Arc::new(ConsoleReporter::new(settings.output_format));
    let options = settings.options(&project.config);
    let (resolution, _source) = resolve_project(&project, options, reporter.clone()).await?;

    let lockfile = resolution.graph.to_lockfile();
    if write_if_changed(&project, &lockfile)? {
        reporter.status(
            "Locking",
            &format!("{} packages to {LOCKFILE_FILE}", lockfile.package.len()),
        );
    } else {
        reporter.info("Locked", &format!("{LOCKFILE_FILE} is up to date"));
    }
    Ok(())
}

/// Write `lockfile` unless the project's current lockfile is identical.
/// Returns whether the file was written.
pub(crate) fn write_if_changed(project: &Project, lockfile: &Lockfile) -> miette::Result<bool> {
    let path = project.lockfile_path();
    if project.lockfile.as_ref() == Some(lockfile) && path.is_file() {
        return Ok(false);
    }
    lockfile.write_to(&path)?;
    tracing::debug!("wrote {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdm_core::config::GlobalConfig;
    use sdm_core::lockfile::LockedPackage;
    use tempfile::TempDir;

    fn project(tmp: &TempDir) -> Project {
        std::fs::write(tmp.path().join("Sdm.toml"), "[package]\nname = \"app\"\n").unwrap();
        Project::load_with_config(tmp.path(), GlobalConfig::default()).unwrap()
    }

    fn locked(name: &str, revision: &str) -> LockedPackage {
        LockedPackage {
            name: name.into(),
            location: format!("../{name}"),
            revision: revision.into(),
            version: None,
            branch: None,
            dependencies: vec![],
        }
    }

    #[test]
    fn writes_new_lockfile() {
        let tmp = TempDir::new().unwrap();
        let project = project(&tmp);
        let lockfile = Lockfile::generate(vec![locked("lib", "abc")]);

        assert!(write_if_changed(&project, &lockfile).unwrap());
        let on_disk = Lockfile::from_path(&tmp.path().join("Sdm.lock")).unwrap();
        assert_eq!(on_disk, lockfile);
    }

    #[test]
    fn unchanged_lockfile_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let lockfile = Lockfile::generate(vec![locked("lib", "abc")]);
        project(&tmp);
        lockfile.write_to(&tmp.path().join("Sdm.lock")).unwrap();
        let project = Project::load_with_config(tmp.path(), GlobalConfig::default()).unwrap();

        assert!(!write_if_changed(&project, &lockfile).unwrap());
        let changed = Lockfile::generate(vec![locked("lib", "def")]);
        assert!(write_if_changed(&project, &changed).unwrap());
    }
}
