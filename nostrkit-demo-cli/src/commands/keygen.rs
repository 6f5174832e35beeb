//! Keygen command - create a new identity

use anyhow::Result;
use nostrkit_lib::Keys;
use std::path::Path;

use crate::identity::IdentityStore;
use crate::ui;

pub async fn run(storage_dir: &Path, name: &str, force: bool, verbose: bool) -> Result<()> {
    let store = IdentityStore::new(storage_dir);

    if store.exists(name) && !force {
        anyhow::bail!(
            "Identity '{}' already exists. Pass --force to overwrite it.",
            name
        );
    }

    if verbose {
        ui::info(&format!("Creating identity '{}'...", name));
    }

    let keys = Keys::generate();
    let path = store.save(name, &keys)?;
    tracing::debug!(?path, "identity saved");

    ui::success(&format!("Identity '{}' created", name));
    ui::separator();
    ui::key_value("Public Key", keys.public_key());
    if verbose {
        ui::key_value("Stored At", &path.display().to_string());
    }

    Ok(())
}
