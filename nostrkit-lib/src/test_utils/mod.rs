//! Test utilities for Nostrkit.
//!
//! - Deterministic identities derived from seed strings
//! - A dispatcher wired to a frozen clock
//! - Assertion helpers for events and envelopes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nostrkit_lib::test_utils::{test_dispatcher, TestIdentities, TEST_NOW};
//!
//! let ids = TestIdentities::new();
//! let sent = test_dispatcher()
//!     .encrypt_message("hi", ids.bob.public_key(), &ids.alice, "giftwrapped", &Default::default())
//!     .await?;
//! assert_gift_wrap_hides_sender(&sent.event, ids.alice.public_key());
//! ```

mod assertions;
mod fixtures;

pub use crate::clock::FixedClock;

pub use fixtures::{
    sample_channel_id, test_dispatcher, test_dispatcher_with, test_keys, TestIdentities, TEST_NOW,
};

pub use assertions::{
    assert_error_code, assert_gift_wrap_addressed_to, assert_gift_wrap_hides_sender,
    assert_valid_event,
};
