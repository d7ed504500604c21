//! Handler for `sdm install`.

use miette::Result;

use sdm_ops::ops_install;
use sdm_ops::ResolveSettings;

pub async fn exec(settings: &ResolveSettings) -> Result<()> {
    let project_root = super::project_root()?;
    ops_install::install(&project_root, settings).await
}
