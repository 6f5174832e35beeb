//! CLI command implementations

pub mod group;
pub mod inspect;
pub mod keygen;
pub mod open;
pub mod send;
pub mod whoami;

use anyhow::{Context, Result};
use nostrkit_lib::MessagingConfig;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::ui;

/// Read a file, or stdin when `input` is `-`.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

/// Write `value` as JSON to `output`, or print it when no path is given.
///
/// Returns true when the value went to a file.
pub fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<bool> {
    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(value)?)
                .with_context(|| format!("Failed to write {:?}", path))?;
            Ok(true)
        }
        None => {
            ui::json(value)?;
            Ok(false)
        }
    }
}

/// Explicit level label, or the configured default.
pub fn level_label(explicit: Option<&str>, config: &MessagingConfig) -> String {
    explicit
        .map(str::to_string)
        .unwrap_or_else(|| config.default_privacy_level.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostrkit_lib::PrivacyLevel;

    #[test]
    fn test_level_label_falls_back_to_config() {
        let config = MessagingConfig::default().with_default_privacy_level(PrivacyLevel::Encrypted);
        assert_eq!(level_label(None, &config), "encrypted");
        assert_eq!(level_label(Some("standard"), &config), "standard");
    }
}
