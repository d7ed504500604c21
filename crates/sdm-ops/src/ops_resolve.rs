//! Operation: resolve the dependency graph and print the resolved set.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use sdm_resolver::ResolvedGraph;
use sdm_util::errors::SdmError;
use serde::Serialize;

use crate::project::Project;
use crate::reporter::ConsoleReporter;
use crate::{resolve_project, ResolveSettings};

/// How `sdm resolve` prints its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for ListFormat {
    type Err = SdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(SdmError::Config {
                message: format!("unknown list format '{other}' (expected human or json)"),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResolvedEntry<'a> {
    name: &'a str,
    location: &'a str,
    revision: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    dependencies: Vec<&'a str>,
}

/// Resolve the project at `project_root` and print every resolved package.
pub async fn resolve(
    project_root: &Path,
    settings: &ResolveSettings,
    format: ListFormat,
) -> miette::Result<()> {
    let project = Project::load(project_root)?;
    let reporter = Arc::new(ConsoleReporter::new(settings.output_format));
    let options = settings.options(&project.config);
    let (resolution, _source) = resolve_project(&project, options, reporter).await?;

    tracing::debug!(
        "{} listings, {} manifest fetches",
        resolution.stats.listings,
        resolution.stats.manifest_fetches
    );
    print!("{}", render(&resolution.graph, format)?);
    Ok(())
}

/// Render the resolved set, one package per line or as a JSON array.
pub fn render(graph: &ResolvedGraph, format: ListFormat) -> miette::Result<String> {
    match format {
        ListFormat::Human => {
            let mut out = String::new();
            for node in graph.nodes() {
                let _ = writeln!(out, "{node}  {}", node.location);
            }
            Ok(out)
        }
        ListFormat::Json => {
            let entries: Vec<ResolvedEntry<'_>> = graph
                .nodes()
                .map(|node| ResolvedEntry {
                    name: &node.name,
                    location: &node.location,
                    revision: &node.revision,
                    version: node.version.as_ref().map(ToString::to_string),
                    branch: node.branch.as_deref(),
                    dependencies: graph
                        .dependencies_of(&node.name)
                        .into_iter()
                        .map(|(child, _)| child)
                        .collect(),
                })
                .collect();
            let mut json = serde_json::to_string_pretty(&entries).map_err(|e| SdmError::Generic {
                message: format!("Failed to serialize resolved packages: {e}"),
            })?;
            json.push('\n');
            Ok(json)
        }
    }
}
