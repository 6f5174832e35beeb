//! Group commands - fan a message out to channel members

use anyhow::{Context, Result};
use nostrkit_lib::group::GroupMessageOptions;
use nostrkit_lib::{GroupMessageData, MessageDispatcher, MessageOptions, MessagingConfig};
use std::path::Path;

use crate::identity::IdentityStore;
use crate::ui;

pub struct GroupSendArgs<'a> {
    pub from: &'a str,
    pub channel: &'a str,
    pub members: Vec<String>,
    pub level: Option<&'a str>,
    pub delay: Option<u32>,
    pub approval: bool,
    pub output: Option<&'a Path>,
    pub message: &'a str,
}

pub async fn send(
    storage_dir: &Path,
    config: &MessagingConfig,
    args: GroupSendArgs<'_>,
) -> Result<()> {
    let sender = IdentityStore::new(storage_dir).load(args.from)?;
    let level = super::level_label(args.level, config);

    let data = GroupMessageData {
        channel_id: args.channel.to_string(),
        content: args.message.to_string(),
        members: args.members,
        options: GroupMessageOptions {
            requires_approval: args.approval,
            ..GroupMessageOptions::default()
        },
    };
    let mut options = MessageOptions::default();
    if let Some(delay) = args.delay {
        options = options.with_delay(delay);
    }

    let spinner = ui::spinner(&format!("Sealing for {} members...", data.members.len()));
    let result = MessageDispatcher::new(config.clone())
        .send_group_message(&data, &sender, &level, &options)
        .await;
    spinner.finish_and_clear();
    let delivery = result.context("Failed to send group message")?;

    for failure in &delivery.failures {
        tracing::warn!(recipient = %failure.recipient, "{}", failure.error);
    }

    super::emit_json(&delivery, args.output)?;

    ui::separator();
    ui::success(&format!(
        "{} of {} envelopes built",
        delivery.deliveries.len(),
        delivery.metadata.member_count
    ));
    ui::key_value("Group Message", &delivery.group_message.id);
    ui::key_value("Privacy Level", delivery.metadata.privacy_level.as_str());
    ui::key_value("Delayed", &delivery.metadata.delayed.to_string());
    for failure in &delivery.failures {
        ui::warning(&format!("{}: {}", failure.recipient, failure.error));
    }

    Ok(())
}
