//! Open command - decrypt an envelope

use anyhow::{Context, Result};
use nostrkit_lib::{EncryptedMessage, MessageDispatcher};
use std::path::Path;

use crate::identity::IdentityStore;
use crate::ui;

pub async fn run(
    storage_dir: &Path,
    identity: &str,
    sender: Option<&str>,
    input: &str,
) -> Result<()> {
    let keys = IdentityStore::new(storage_dir).load(identity)?;
    let raw = super::read_input(input)?;
    let envelope: EncryptedMessage =
        serde_json::from_str(&raw).context("Input is not an envelope produced by 'send'")?;

    let opened = MessageDispatcher::default()
        .decrypt_message(&envelope, keys.secret_key(), sender)
        .context("Failed to open envelope")?;

    ui::header("Message");
    ui::key_value("From", &opened.sender);
    ui::key_value("Sent", &ui::timestamp(opened.timestamp));
    ui::key_value("Gift Wrapped", &opened.metadata.gift_wrapped.to_string());
    if let Some(group) = &opened.group_message {
        let channel = nostrkit_lib::group::channel_of(group).unwrap_or("unknown");
        ui::key_value("Group Channel", channel);
        if let Some(priority) = group.first_tag_value("priority") {
            ui::key_value("Priority", priority);
        }
    }
    ui::separator();
    println!("{}", opened.message);

    Ok(())
}
