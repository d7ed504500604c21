//! Handler for `sdm resolve`.

use miette::Result;

use sdm_ops::ops_resolve::{self, ListFormat};
use sdm_ops::ResolveSettings;

pub async fn exec(settings: &ResolveSettings, format: ListFormat) -> Result<()> {
    let project_root = super::project_root()?;
    ops_resolve::resolve(&project_root, settings, format).await
}
