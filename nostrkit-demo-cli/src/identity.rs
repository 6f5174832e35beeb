//! On-disk identities.
//!
//! One JSON file per identity under `<storage-dir>/identities/<name>.json`,
//! readable only by the owner on unix.

use anyhow::{Context, Result};
use nostrkit_lib::Keys;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize)]
struct StoredIdentity {
    name: String,
    public_key: String,
    secret_key_hex: String,
}

/// Manages identity persistence and loading
pub struct IdentityStore {
    dir: PathBuf,
}

impl IdentityStore {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            dir: storage_dir.join("identities"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    pub fn save(&self, name: &str, keys: &Keys) -> Result<PathBuf> {
        validate_name(name)?;
        std::fs::create_dir_all(&self.dir).context("Failed to create identity directory")?;

        let stored = StoredIdentity {
            name: name.to_string(),
            public_key: keys.public_key().to_string(),
            secret_key_hex: keys.secret_hex(),
        };
        let path = self.path(name);
        let json = serde_json::to_string_pretty(&stored)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&path)
            .with_context(|| format!("Failed to open identity file {:?}", path))?;

        // `mode` only applies on creation; an overwritten file keeps its old bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict permissions on {:?}", path))?;
        }

        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write identity to {:?}", path))?;

        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Keys> {
        validate_name(name)?;
        let path = self.path(name);
        let json = std::fs::read_to_string(&path).with_context(|| {
            format!("Identity '{}' not found. Run 'nostrkit-demo keygen --name {}' first.", name, name)
        })?;
        let stored: StoredIdentity = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt identity file {:?}", path))?;

        let keys = Keys::from_secret_hex(&stored.secret_key_hex)
            .with_context(|| format!("Invalid secret key in {:?}", path))?;
        if keys.public_key() != stored.public_key {
            anyhow::bail!("Identity file {:?} has a public key that does not match its secret", path);
        }
        Ok(keys)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        anyhow::bail!("Identity names may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}
