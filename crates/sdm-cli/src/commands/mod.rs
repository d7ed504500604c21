//! Command dispatch and handler modules.

mod install;
mod lock;
mod resolve;
mod tree;
mod update;

use std::path::PathBuf;

use miette::Result;
use sdm_core::MANIFEST_FILE;
use sdm_util::errors::SdmError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let settings = cli.settings();
    match cli.command {
        Command::Resolve { format } => resolve::exec(&settings, format).await,
        Command::Lock => lock::exec(&settings).await,
        Command::Update => update::exec(&settings).await,
        Command::Install => install::exec(&settings).await,
        Command::Tree {
            depth,
            why,
            inverted,
            cycles,
        } => tree::exec(&settings, depth, why, inverted, cycles).await,
    }
}

/// The nearest directory at or above the current one holding an `Sdm.toml`.
fn project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(SdmError::Io)?;
    sdm_util::fs::find_ancestor_with(&cwd, MANIFEST_FILE).ok_or_else(|| {
        SdmError::Manifest {
            message: format!("No {MANIFEST_FILE} found in current directory or any parent"),
        }
        .into()
    })
}
