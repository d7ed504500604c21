//! Scoped clones used to read files at arbitrary revisions.

use std::path::Path;
use std::process::Output;

use sdm_resolver::SourceError;
use sdm_util::errors::SdmError;
use sdm_util::process::CommandBuilder;
use tempfile::TempDir;

use crate::remote;

/// A blob-filtered, no-checkout clone of one repository.
///
/// The clone lives in a temporary directory that is removed when the
/// `Checkout` is dropped.
#[derive(Debug)]
pub struct Checkout {
    program: String,
    location: String,
    dir: TempDir,
}

impl Checkout {
    /// Clone `url` (the resolved address of `location`) into a fresh temporary directory.
    pub async fn create(program: &str, location: &str, url: &str) -> Result<Self, SourceError> {
        if !remote::is_valid_location(location) || !remote::is_valid_location(url) {
            return Err(unreachable(location, "not a repository address".to_string()));
        }
        let dir = tempfile::Builder::new()
            .prefix("sdm-checkout-")
            .tempdir()
            .map_err(|e| unreachable(location, e.to_string()))?;

        tracing::debug!("cloning {location} into {}", dir.path().display());
        CommandBuilder::new(program)
            .args([
                "clone",
                "--quiet",
                "--filter=blob:none",
                "--no-checkout",
                "--end-of-options",
                url,
            ])
            .arg(dir.path().display().to_string())
            .exec_checked()
            .await
            .map_err(|e| unreachable(location, e.to_string()))?;

        Ok(Self {
            program: program.to_string(),
            location: location.to_string(),
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    async fn git<I, S>(&self, args: I) -> Result<Output, SdmError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandBuilder::new(&self.program)
            .cwd(self.dir.path().display().to_string())
            .args(args)
            .exec()
            .await
    }

    async fn succeeds<I, S>(&self, args: I) -> Result<bool, SourceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.git(args)
            .await
            .map(|output| output.status.success())
            .map_err(|e| unreachable(&self.location, e.to_string()))
    }

    /// Make sure `revision` names a commit in this clone, fetching it from the
    /// remote when no branch or tag reaches it.
    pub async fn ensure_commit(&self, revision: &str) -> Result<(), SourceError> {
        if !remote::is_valid_revision(revision) {
            return Err(self.revision_not_found(revision));
        }
        let object = format!("{revision}^{{commit}}");
        if self.object_exists(&object).await? {
            return Ok(());
        }
        tracing::debug!("{revision} not in clone of {}, fetching it", self.location);
        let fetched = self
            .succeeds([
                "fetch",
                "--quiet",
                "--filter=blob:none",
                "--end-of-options",
                "origin",
                revision,
            ])
            .await?;
        if fetched && self.object_exists(&object).await? {
            return Ok(());
        }
        Err(self.revision_not_found(revision))
    }

    async fn object_exists(&self, object: &str) -> Result<bool, SourceError> {
        self.succeeds(["cat-file", "-e", "--end-of-options", object])
            .await
    }

    fn revision_not_found(&self, revision: &str) -> SourceError {
        SourceError::RevisionNotFound {
            location: self.location.clone(),
            revision: revision.to_string(),
        }
    }

    /// Contents of `file` at `revision`, or `None` if the file does not exist there.
    pub async fn read_file(&self, revision: &str, file: &str) -> Result<Option<Vec<u8>>, SourceError> {
        self.ensure_commit(revision).await?;
        let object = format!("{revision}:{file}");
        if !self.object_exists(&object).await? {
            return Ok(None);
        }
        let output = self
            .git(["cat-file", "blob", "--end-of-options", object.as_str()])
            .await
            .map_err(|e| unreachable(&self.location, e.to_string()))?;
        if !output.status.success() {
            return Err(unreachable(
                &self.location,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(Some(output.stdout))
    }
}

pub(crate) fn unreachable(location: &str, detail: String) -> SourceError {
    SourceError::RepositoryUnreachable {
        location: location.to_string(),
        detail,
    }
}
