use std::sync::Arc;

use checkmark_core::remote::RemoteStore;
use checkmark_http::HttpRemoteStore;
use color_eyre::Result;
use tracing::debug;

use crate::config::Config;

/// Build the HTTP remote store described by the config.
pub fn store_from_config(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    let remote = config.remote();
    let store = HttpRemoteStore::new(&remote)?;
    debug!(base = %store.base_url(), "using remote task store");
    Ok(Arc::new(store))
}
