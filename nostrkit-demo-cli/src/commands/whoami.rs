//! Whoami command - show an identity's public key

use anyhow::Result;
use std::path::Path;

use crate::identity::IdentityStore;
use crate::ui;

pub async fn run(storage_dir: &Path, name: &str) -> Result<()> {
    let keys = IdentityStore::new(storage_dir).load(name)?;

    ui::header("Identity");
    ui::key_value("Name", name);
    ui::key_value("Public Key", keys.public_key());

    Ok(())
}
