//! The project being operated on: its root manifest, lockfile and settings.

use std::path::{Path, PathBuf};

use sdm_core::config::GlobalConfig;
use sdm_core::lockfile::Lockfile;
use sdm_core::manifest::Manifest;
use sdm_core::{LOCKFILE_FILE, MANIFEST_FILE};
use sdm_util::errors::SdmError;

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub manifest: Manifest,
    /// The existing `Sdm.lock`, if present and readable.
    pub lockfile: Option<Lockfile>,
    pub config: GlobalConfig,
}

impl Project {
    /// Load the project rooted at `root` with the user's global configuration.
    pub fn load(root: &Path) -> miette::Result<Self> {
        Self::load_with_config(root, GlobalConfig::load()?)
    }

    pub fn load_with_config(root: &Path, config: GlobalConfig) -> miette::Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(SdmError::Manifest {
                message: format!("No {MANIFEST_FILE} found in {}", root.display()),
            }
            .into());
        }
        let manifest = Manifest::from_path(&manifest_path)?;

        let lockfile_path = root.join(LOCKFILE_FILE);
        let lockfile = if lockfile_path.is_file() {
            match Lockfile::from_path(&lockfile_path) {
                Ok(lockfile) => Some(lockfile),
                Err(e) => {
                    tracing::warn!("ignoring {LOCKFILE_FILE}: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            lockfile,
            config,
        })
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.root.join(LOCKFILE_FILE)
    }

    /// Where `sdm install` places package working trees.
    pub fn checkouts_dir(&self) -> PathBuf {
        self.root.join(".sdm").join("checkouts")
    }
}
