//! Messaging config loading.

use anyhow::{Context, Result};
use nostrkit_lib::MessagingConfig;
use std::path::Path;

/// Read `MessagingConfig` from `explicit`, or from `<storage-dir>/config.toml`
/// when present. Missing default file means built-in defaults; a missing
/// explicit file is an error.
pub fn load(explicit: Option<&Path>, storage_dir: &Path) -> Result<MessagingConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = storage_dir.join("config.toml");
            if !default_path.exists() {
                tracing::debug!("no config at {:?}, using defaults", default_path);
                return Ok(MessagingConfig::default());
            }
            default_path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: MessagingConfig =
        toml::from_str(&content).with_context(|| format!("Invalid config {:?}", path))?;
    tracing::debug!(?config, "loaded messaging config");
    Ok(config)
}
