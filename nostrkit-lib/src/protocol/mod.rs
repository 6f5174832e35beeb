//! Wire-level building blocks: kinds, tags and canonical events.

mod event;
mod kind;
pub mod tags;

pub use event::{build_event, compute_event_id, ProtocolEvent};
pub use kind::Kind;
pub use tags::Tag;

/// Check that `value` is 64 lowercase-or-uppercase hex characters.
///
/// Event ids and x-only public keys share this shape.
pub fn is_hex32(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
