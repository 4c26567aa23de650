use std::path::PathBuf;

use crate::config::Config;
use checkmark_storage::file_store::FilePreferenceStore;
use color_eyre::Result;
use dirs::data_dir;
use tracing::debug;

/// Resolve the default data directory for Checkmark.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("checkmark"))
}

/// Build the preference store, honouring the config override.
pub fn prefs_from_config(config: &Config) -> Result<FilePreferenceStore> {
    let root = match &config.data_dir {
        Some(root) => root.clone(),
        None => default_data_dir()?,
    };
    debug!(?root, "initializing preference store");
    Ok(FilePreferenceStore::new(root))
}
