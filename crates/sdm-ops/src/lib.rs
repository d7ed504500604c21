pub mod ops_install;
pub mod ops_lock;
pub mod ops_resolve;
pub mod ops_tree;
pub mod ops_update;
pub mod project;
pub mod reporter;

use std::sync::Arc;

use sdm_core::config::{BranchPolicy, GlobalConfig};
use sdm_git::GitSource;
use sdm_resolver::{Resolution, ResolveOptions, Resolver};

use crate::project::Project;
use crate::reporter::{ConsoleReporter, OutputFormat};

/// Settings shared by every resolving command. Unset fields fall back to the
/// global configuration.
#[derive(Debug, Clone, Default)]
pub struct ResolveSettings {
    pub output_format: OutputFormat,
    pub branch_policy: Option<BranchPolicy>,
    pub jobs: Option<usize>,
}

impl ResolveSettings {
    pub fn options(&self, config: &GlobalConfig) -> ResolveOptions {
        ResolveOptions {
            branch_policy: self.branch_policy.unwrap_or(config.resolve.branch_policy),
            max_concurrent_fetches: self.jobs.unwrap_or(config.resolve.max_concurrent_fetches),
        }
    }
}

/// Resolve the project's dependency graph against the real repositories.
///
/// Returns the git source too, so callers can reuse its clones.
pub async fn resolve_project(
    project: &Project,
    options: ResolveOptions,
    reporter: Arc<ConsoleReporter>,
) -> miette::Result<(Resolution, Arc<GitSource>)> {
    let source =
        Arc::new(GitSource::from_config(&project.config.git).with_base_dir(project.root.clone()));
    let resolver = Resolver::new(source.clone())
        .with_reporter(reporter.clone())
        .with_options(options)
        .with_lockfile(project.lockfile.clone());

    tracing::debug!(
        "resolving with branch policy {} and {} concurrent fetches",
        options.branch_policy,
        options.max_concurrent_fetches
    );
    match resolver.resolve(&project.manifest).await {
        Ok(resolution) => Ok((resolution, source)),
        Err(err) => {
            reporter.fail(&err.to_string());
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = GlobalConfig::default();
        config.resolve.branch_policy = BranchPolicy::Sticky;
        config.resolve.max_concurrent_fetches = 3;

        let defaults = ResolveSettings::default().options(&config);
        assert_eq!(defaults.branch_policy, BranchPolicy::Sticky);
        assert_eq!(defaults.max_concurrent_fetches, 3);

        let settings = ResolveSettings {
            branch_policy: Some(BranchPolicy::Refresh),
            jobs: Some(16),
            ..ResolveSettings::default()
        };
        let options = settings.options(&config);
        assert_eq!(options.branch_policy, BranchPolicy::Refresh);
        assert_eq!(options.max_concurrent_fetches, 16);
    }
}
