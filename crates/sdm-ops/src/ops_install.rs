//! Operation: resolve, lock and check every package out under `.sdm/checkouts`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sdm_util::errors::SdmError;
use sdm_util::{fs, progress};

use crate::ops_lock::write_if_changed;
use crate::project::Project;
use crate::reporter::{ConsoleReporter, OutputFormat};
use crate::{resolve_project, ResolveSettings};

/// Resolve the project, write `Sdm.lock` and install each resolved package's
/// working tree into `.sdm/checkouts/<name>`.
pub async fn install(project_root: &Path, settings: &ResolveSettings) -> miette::Result<()> {
    let project = Project::load(project_root)?;
    let reporter = Arc::new(ConsoleReporter::new(settings.output_format));
    let options = settings.options(&project.config);
    let (resolution, source) = resolve_project(&project, options, reporter.clone()).await?;

    write_if_changed(&project, &resolution.graph.to_lockfile())?;

    let checkouts = project.checkouts_dir();
    let nodes: Vec<_> = resolution.graph.nodes().collect();
    // Every destination is checked before any directory is replaced.
    let dests = nodes
        .iter()
        .map(|node| checkout_dest(&checkouts, &node.name))
        .collect::<miette::Result<Vec<_>>>()?;
    let pb = match reporter.format() {
        OutputFormat::Human => Some(progress::progress_bar(nodes.len() as u64, "Installing")),
        OutputFormat::Xcode => None,
    };

    for (node, dest) in nodes.iter().zip(&dests) {
        if let Some(pb) = &pb {
            pb.set_message(node.name.clone());
        }
        if let Err(e) = source.install_into(&node.location, &node.revision, dest).await {
            if let Some(pb) = &pb {
                pb.finish_and_clear();
            }
            reporter.fail(&format!("failed to install {node}"));
            return Err(e);
        }
        match &pb {
            Some(pb) => {
                pb.suspend(|| reporter.status("Installed", &node.to_string()));
                pb.inc(1);
            }
            None => reporter.status("Installed", &node.to_string()),
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    reporter.status(
        "Finished",
        &format!("{} packages in {}", nodes.len(), checkouts.display()),
    );
    Ok(())
}

/// Directory a package is installed into. Must be a direct child of `checkouts`.
fn checkout_dest(checkouts: &Path, name: &str) -> miette::Result<PathBuf> {
    fs::child_dir(checkouts, name).ok_or_else(|| {
        SdmError::Manifest {
            message: format!(
                "package name '{name}' cannot be used as a directory under {}",
                checkouts.display()
            ),
        }
        .into()
    })
}
