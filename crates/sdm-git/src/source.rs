//! [`RevisionSource`] implementation driving the `git` executable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sdm_core::config::GitConfig;
use sdm_core::MANIFEST_FILE;
use sdm_resolver::{RemoteRef, RevisionSource, SourceError};
use sdm_util::errors::{SdmError, SdmResult};
use sdm_util::process::CommandBuilder;
use tokio::sync::Mutex;

use crate::checkout::{unreachable, Checkout};
use crate::remote;

type CheckoutSlot = Arc<Mutex<Option<Checkout>>>;

/// Repository access through `git`.
///
/// Each location is cloned at most once per `GitSource`; clones are deleted
/// when the source is dropped.
#[derive(Debug)]
pub struct GitSource {
    program: String,
    base_dir: Option<PathBuf>,
    checkouts: Mutex<HashMap<String, CheckoutSlot>>,
}

impl Default for GitSource {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_dir: None,
            checkouts: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self::new(config.program.clone())
    }

    /// Directory relative path locations are resolved against, normally the
    /// directory holding the root `Sdm.toml`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn url(&self, location: &str) -> String {
        remote::remote_url(location, self.base_dir.as_deref())
    }

    /// The clone slot for `location`. Holding its lock serializes all work in
    /// that clone.
    async fn slot(&self, location: &str) -> CheckoutSlot {
        let mut checkouts = self.checkouts.lock().await;
        Arc::clone(checkouts.entry(location.to_string()).or_default())
    }

    /// Materialise the working tree of `location` at `revision` into `dest`,
    /// replacing whatever was there.
    pub async fn install_into(&self, location: &str, revision: &str, dest: &Path) -> SdmResult<()> {
        if !remote::is_valid_location(location) {
            return Err(SdmError::Git {
                message: format!("refusing to clone '{location}': not a repository address"),
            }
            .into());
        }
        if !remote::is_valid_revision(revision) {
            return Err(SdmError::Git {
                message: format!("refusing to check out '{revision}' of {location}: not a revision"),
            }
            .into());
        }
        sdm_util::fs::remove_dir_if_exists(dest).map_err(SdmError::Io)?;
        if let Some(parent) = dest.parent() {
            sdm_util::fs::ensure_dir(parent).map_err(SdmError::Io)?;
        }
        let dest_str = dest.display().to_string();

        tracing::debug!("installing {location} at {revision} into {dest_str}");
        CommandBuilder::new(&self.program)
            .args([
                "clone",
                "--quiet",
                "--no-checkout",
                "--end-of-options",
                self.url(location).as_str(),
                dest_str.as_str(),
            ])
            .exec_checked()
            .await
            .map_err(git_error)?;

        let detach = CommandBuilder::new(&self.program)
            .cwd(dest_str.clone())
            .args(["checkout", "--quiet", "--detach", "--end-of-options", revision]);
        if detach.exec().await?.status.success() {
            return Ok(());
        }

        // Commits no branch or tag reaches are not part of the initial clone.
        CommandBuilder::new(&self.program)
            .cwd(dest_str)
            .args(["fetch", "--quiet", "--end-of-options", "origin", revision])
            .exec_checked()
            .await
            .map_err(git_error)?;
        detach.exec_checked().await.map_err(git_error)?;
        Ok(())
    }
}

fn git_error(err: SdmError) -> SdmError {
    match err {
        SdmError::Generic { message } => SdmError::Git { message },
        other => other,
    }
}

#[async_trait]
impl RevisionSource for GitSource {
    async fn list_revisions(&self, location: &str) -> Result<Vec<RemoteRef>, SourceError> {
        if !remote::is_valid_location(location) {
            return Err(unreachable(location, "not a repository address".to_string()));
        }
        let output = CommandBuilder::new(&self.program)
            .args([
                "ls-remote",
                "--tags",
                "--heads",
                "--end-of-options",
                self.url(location).as_str(),
            ])
            .exec()
            .await
            .map_err(|e| unreachable(location, e.to_string()))?;
        if !output.status.success() {
            return Err(unreachable(
                location,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let refs = remote::parse_ls_remote(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!("{location}: {} refs", refs.len());
        Ok(refs)
    }

    async fn checkout_manifest(
        &self,
        location: &str,
        revision: &str,
    ) -> Result<Option<Vec<u8>>, SourceError> {
        if !remote::is_valid_revision(revision) {
            return Err(SourceError::RevisionNotFound {
                location: location.to_string(),
                revision: revision.to_string(),
            });
        }
        let slot = self.slot(location).await;
        let mut slot = slot.lock().await;
        let checkout = match slot.take() {
            Some(checkout) => checkout,
            None => Checkout::create(&self.program, location, &self.url(location)).await?,
        };
        let manifest = checkout.read_file(revision, MANIFEST_FILE).await;
        *slot = Some(checkout);
        manifest
    }
}
