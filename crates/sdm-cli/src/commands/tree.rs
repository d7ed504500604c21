//! Handler for `sdm tree`.

use miette::Result;

use sdm_ops::ops_tree::{self, TreeOptions};
use sdm_ops::ResolveSettings;

pub async fn exec(
    settings: &ResolveSettings,
    depth: Option<usize>,
    why: Option<String>,
    inverted: Option<String>,
    cycles: bool,
) -> Result<()> {
    let project_root = super::project_root()?;

    let opts = TreeOptions {
        depth,
        why,
        inverted,
        cycles,
    };

    ops_tree::tree(&project_root, settings, &opts).await
}
