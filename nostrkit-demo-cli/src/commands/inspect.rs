//! Inspect command - report on an event or envelope

use anyhow::{Context, Result};
use nostrkit_lib::envelope::requested_delivery_time;
use nostrkit_lib::{EncryptedMessage, Kind, ProtocolEvent};

use crate::ui;

pub async fn run(input: &str) -> Result<()> {
    let raw = super::read_input(input)?;
    let event = parse_event(&raw)?;

    ui::header("Event");
    ui::key_value("Id", &event.id);
    ui::key_value("Kind", &format!("{} ({:?})", event.kind, event.kind));
    ui::key_value("Author", &event.pubkey);
    ui::key_value("Created", &ui::timestamp(event.created_at));
    ui::key_value("Tags", &event.tags.len().to_string());

    if event.kind == Kind::GiftWrap {
        if let Some(recipient) = event.first_tag_value("p") {
            ui::key_value("Recipient", recipient);
        }
        if let Some(at) = requested_delivery_time(&event) {
            ui::key_value("Publish After", &ui::timestamp(at));
        }
    }

    match event.verify_id() {
        Ok(()) => ui::success("Id matches canonical serialization"),
        Err(err) => ui::warning(&err.to_string()),
    }

    Ok(())
}

/// Accept a bare event or an envelope wrapping one.
fn parse_event(raw: &str) -> Result<ProtocolEvent> {
    if let Ok(event) = ProtocolEvent::from_json(raw) {
        return Ok(event);
    }
    let envelope: EncryptedMessage =
        serde_json::from_str(raw).context("Input is neither an event nor an envelope")?;
    Ok(envelope.event)
}
