//! Assertion helpers for events and envelopes.

use crate::errors::NostrkitErrorCode;
use crate::protocol::{Kind, ProtocolEvent};
use crate::Result;

/// Assert that an event's id matches its canonical serialization.
///
/// # Panics
/// Panics if the id does not verify.
pub fn assert_valid_event(event: &ProtocolEvent) {
    if let Err(e) = event.verify_id() {
        panic!("event {} failed verification: {}", event.id, e);
    }
    assert!(event.sig.is_empty(), "events from this layer are unsigned");
}

/// Assert that `event` is a gift wrap whose `p` tag names `recipient`.
pub fn assert_gift_wrap_addressed_to(event: &ProtocolEvent, recipient: &str) {
    assert_eq!(event.kind, Kind::GiftWrap, "expected a gift wrap");
    assert_eq!(
        event.first_tag_value("p"),
        Some(recipient),
        "gift wrap addressed to the wrong recipient"
    );
}

/// Assert that nothing visible on a gift wrap names the real sender.
pub fn assert_gift_wrap_hides_sender(event: &ProtocolEvent, sender: &str) {
    assert_eq!(event.kind, Kind::GiftWrap, "expected a gift wrap");
    assert_ne!(event.pubkey, sender, "gift wrap authored by the real sender");
    assert!(
        !event.tags.iter().flat_map(|t| t.as_slice()).any(|v| v == sender),
        "sender pubkey leaked into gift wrap tags"
    );
    assert!(
        !event.content.contains(sender),
        "sender pubkey leaked into gift wrap content"
    );
}

/// Assert that `result` failed with `code`.
///
/// # Panics
/// Panics if the result is Ok or carries a different code.
pub fn assert_error_code<T: std::fmt::Debug>(result: &Result<T>, code: NostrkitErrorCode) {
    match result {
        Ok(value) => panic!("expected error {:?}, got Ok({:?})", code, value),
        Err(e) => assert_eq!(e.code(), code, "unexpected error: {}", e),
    }
}
