//! CLI argument definitions for sdm.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in the
//! [`super::commands`] module.

use clap::{Parser, Subcommand};
use sdm_core::config::BranchPolicy;
use sdm_ops::ops_resolve::ListFormat;
use sdm_ops::reporter::OutputFormat;
use sdm_ops::ResolveSettings;

#[derive(Parser, Debug)]
#[command(
    name = "sdm",
    version,
    about = "Resolve source-control dependencies to exact revisions",
    long_about = "sdm reads Sdm.toml, walks the dependency graph across git repositories \
                  and pins every package to a single commit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Console output style: human or xcode
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// How branch pins treat commits already in Sdm.lock: refresh or sticky
    #[arg(long, global = true)]
    pub branch_policy: Option<BranchPolicy>,

    /// Maximum number of concurrent repository fetches
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,
}

impl Cli {
    pub fn settings(&self) -> ResolveSettings {
        ResolveSettings {
            output_format: self.output_format,
            branch_policy: self.branch_policy,
            jobs: self.jobs,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve dependencies and print the resolved packages
    Resolve {
        /// Listing format: human or json
        #[arg(long, default_value = "human")]
        format: ListFormat,
    },

    /// Resolve dependencies and write Sdm.lock
    Lock,

    /// Move branch pins to their current heads and rewrite Sdm.lock
    Update,

    /// Resolve, lock and check every package out into .sdm/checkouts
    Install,

    /// Print the dependency tree
    Tree {
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
        /// Explain why a dependency is included
        #[arg(long)]
        why: Option<String>,
        /// Show what depends on the given package
        #[arg(long, value_name = "NAME")]
        inverted: Option<String>,
        /// List dependency cycles
        #[arg(long)]
        cycles: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
