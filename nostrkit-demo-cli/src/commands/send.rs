//! Send command - encrypt a message for one recipient

use anyhow::{Context, Result};
use nostrkit_lib::{MessageDispatcher, MessageOptions, MessagingConfig};
use std::path::Path;

use crate::identity::IdentityStore;
use crate::ui;

pub struct SendArgs<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub level: Option<&'a str>,
    pub delay: Option<u32>,
    pub output: Option<&'a Path>,
    pub message: &'a str,
}

pub async fn run(storage_dir: &Path, config: &MessagingConfig, args: SendArgs<'_>) -> Result<()> {
    let sender = IdentityStore::new(storage_dir).load(args.from)?;
    let level = super::level_label(args.level, config);

    let mut options = MessageOptions::default();
    if let Some(delay) = args.delay {
        options = options.with_delay(delay);
    }

    let dispatcher = MessageDispatcher::new(config.clone());
    let sent = dispatcher
        .encrypt_message(args.message, args.to, &sender, &level, &options)
        .await
        .context("Failed to encrypt message")?;
    tracing::info!(id = %sent.event.id, level = %sent.metadata.privacy_level, "envelope built");

    if super::emit_json(&sent, args.output)? {
        ui::success("Envelope written");
        ui::key_value("Event Id", &sent.event.id);
        ui::key_value("Kind", &sent.event.kind.to_string());
        ui::key_value("Publish After", &ui::timestamp(sent.metadata.delivery_time));
    }

    Ok(())
}
