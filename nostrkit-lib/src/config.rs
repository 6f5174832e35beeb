//! Messaging defaults applied by the dispatcher.

use serde::{Deserialize, Serialize};

use crate::privacy::PrivacyLevel;

/// Defaults and limits for [`MessageDispatcher`](crate::MessageDispatcher).
///
/// Every field has a serde default, so a partial TOML or JSON document is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Delay applied to gift wraps when the caller does not pass one.
    #[serde(default = "default_delay_minutes")]
    pub default_delay_minutes: u32,

    /// Level used by callers that have no explicit preference.
    #[serde(default)]
    pub default_privacy_level: PrivacyLevel,

    /// Largest member list accepted by a group send.
    #[serde(default = "default_max_group_members")]
    pub max_group_members: usize,

    /// Number of per-recipient envelopes built concurrently.
    #[serde(default = "default_fanout_concurrency")]
    pub fanout_concurrency: usize,
}

fn default_delay_minutes() -> u32 {
    5
}

fn default_max_group_members() -> usize {
    256
}

fn default_fanout_concurrency() -> usize {
    16
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_delay_minutes: default_delay_minutes(),
            default_privacy_level: PrivacyLevel::default(),
            max_group_members: default_max_group_members(),
            fanout_concurrency: default_fanout_concurrency(),
        }
    }
}

impl MessagingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default gift-wrap delay.
    pub fn with_default_delay(mut self, minutes: u32) -> Self {
        self.default_delay_minutes = minutes;
        self
    }

    /// Set the default privacy level.
    pub fn with_default_privacy_level(mut self, level: PrivacyLevel) -> Self {
        self.default_privacy_level = level;
        self
    }

    /// Set the maximum group size.
    pub fn with_max_group_members(mut self, max: usize) -> Self {
        self.max_group_members = max;
        self
    }

    /// Set fan-out concurrency.
    pub fn with_fanout_concurrency(mut self, concurrency: usize) -> Self {
        self.fanout_concurrency = concurrency;
        self
    }

    /// Fan-out concurrency, never below one.
    pub fn effective_concurrency(&self) -> usize {
        self.fanout_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MessagingConfig::default();
        assert_eq!(config.default_delay_minutes, 5);
        assert_eq!(config.default_privacy_level, PrivacyLevel::GiftWrapped);
        assert_eq!(config.max_group_members, 256);
        assert_eq!(config.effective_concurrency(), 16);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: MessagingConfig =
            serde_json::from_str(r#"{"default_privacy_level":"standard","fanout_concurrency":0}"#)
                .unwrap();
        assert_eq!(config.default_privacy_level, PrivacyLevel::Encrypted);
        assert_eq!(config.default_delay_minutes, 5);
        assert_eq!(config.effective_concurrency(), 1);
    }

    #[test]
    fn test_builders() {
        let config = MessagingConfig::new()
            .with_default_delay(0)
            .with_max_group_members(3)
            .with_fanout_concurrency(2)
            .with_default_privacy_level(PrivacyLevel::Encrypted);
        assert_eq!(config.default_delay_minutes, 0);
        assert_eq!(config.max_group_members, 3);
        assert_eq!(config.fanout_concurrency, 2);
        assert_eq!(config.default_privacy_level, PrivacyLevel::Encrypted);
    }
}
