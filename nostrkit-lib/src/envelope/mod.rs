//! Encryption envelopes.
//!
//! - [`pairwise`]: shared-secret encryption between two identities.
//! - [`gift_wrap`]: seal plus ephemeral outer wrapper hiding the sender.

pub mod gift_wrap;
pub mod pairwise;

pub use gift_wrap::{
    requested_delivery_time, unwrap, wrap, SealMetadata, UnwrappedMessage, WrapOptions,
    WrappedEnvelope,
};
