//! Handler for `sdm update`.

use miette::Result;

use sdm_ops::ops_update;
use sdm_ops::ResolveSettings;

pub async fn exec(settings: &ResolveSettings) -> Result<()> {
    let project_root = super::project_root()?;
    ops_update::update(&project_root, settings).await
}
