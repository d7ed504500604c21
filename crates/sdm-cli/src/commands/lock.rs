//! Handler for `sdm lock`.

use miette::Result;

use sdm_ops::ops_lock;
use sdm_ops::ResolveSettings;

pub async fn exec(settings: &ResolveSettings) -> Result<()> {
    let project_root = super::project_root()?;
    ops_lock::lock(&project_root, settings).await
}
