//! Error types for envelope operations.
//!
//! Every public operation either returns a fully formed value or one of the
//! variants below. Nothing here is retried internally; retry and backoff belong
//! to whichever transport publishes the resulting events.

use std::fmt;

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NostrkitErrorCode {
    /// Malformed pubkey, tag or missing required field
    InvalidInput = 1000,
    /// Cipher or key-derivation failure
    CryptoOperation = 2000,
    /// Structurally required protocol element absent or wrong
    ProtocolViolation = 3000,
    /// Unrecognized privacy level string
    UnknownPrivacyLevel = 4000,
    /// Serialization error
    Serialization = 5000,
}

/// Error type for envelope, group and dispatcher operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NostrkitError {
    /// Caller supplied data that cannot be used.
    InvalidInput {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A cipher or key-derivation step failed.
    ///
    /// The message never contains key material.
    CryptoOperation(String),

    /// An event is missing a structurally required element (for example a
    /// gift wrap without a `p` tag) or fails its id check.
    ProtocolViolation(String),

    /// The privacy level string is not one of the known levels.
    UnknownPrivacyLevel(String),

    /// Serialization/deserialization error.
    Serialization(String),
}

impl NostrkitError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> NostrkitErrorCode {
        match self {
            Self::InvalidInput { .. } => NostrkitErrorCode::InvalidInput,
            Self::CryptoOperation(_) => NostrkitErrorCode::CryptoOperation,
            Self::ProtocolViolation(_) => NostrkitErrorCode::ProtocolViolation,
            Self::UnknownPrivacyLevel(_) => NostrkitErrorCode::UnknownPrivacyLevel,
            Self::Serialization(_) => NostrkitErrorCode::Serialization,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Always false: this layer performs pure computations, so repeating a
    /// failed call with the same inputs fails the same way.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Create an invalid input error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a crypto operation error.
    pub fn crypto(reason: impl Into<String>) -> Self {
        Self::CryptoOperation(reason.into())
    }

    /// Create a protocol violation error.
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::ProtocolViolation(reason.into())
    }
}

impl fmt::Display for NostrkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::CryptoOperation(msg) => write!(f, "crypto operation failed: {}", msg),
            Self::ProtocolViolation(msg) => write!(f, "protocol violation: {}", msg),
            Self::UnknownPrivacyLevel(level) => write!(f, "unknown privacy level: {}", level),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for NostrkitError {}

impl From<serde_json::Error> for NostrkitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = NostrkitError::UnknownPrivacyLevel("bogus".into());
        assert_eq!(err.code(), NostrkitErrorCode::UnknownPrivacyLevel);
        assert_eq!(err.code() as i32, 4000);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = NostrkitError::invalid_input("recipient_pubkey", "expected 64 hex characters");
        assert_eq!(
            err.to_string(),
            "invalid recipient_pubkey: expected 64 hex characters"
        );

        let err = NostrkitError::protocol("gift wrap has no p tag");
        assert!(err.message().contains("protocol violation"));
    }

    #[test]
    fn test_serde_error_maps_to_serialization() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: NostrkitError = parse.unwrap_err().into();
        assert_eq!(err.code(), NostrkitErrorCode::Serialization);
    }
}
