//! Group fan-out and group-message detection.

use nostrkit_lib::group::{self, MessagePriority};
use nostrkit_lib::prelude::*;
use nostrkit_lib::test_utils::{
    assert_error_code, assert_gift_wrap_addressed_to, assert_valid_event, sample_channel_id,
    test_dispatcher, test_dispatcher_with, test_keys, TestIdentities, TEST_NOW,
};

fn message_to(members: Vec<String>) -> GroupMessageData {
    GroupMessageData {
        channel_id: sample_channel_id(),
        content: "dinner at 7".into(),
        members,
        options: GroupMessageOptions::default(),
    }
}

#[tokio::test]
async fn test_fanout_produces_one_wrap_per_member() {
    let ids = TestIdentities::new();
    let members: Vec<String> = (0..5)
        .map(|i| test_keys(&format!("member-{i}")).public_key().to_string())
        .collect();

    let delivery = test_dispatcher()
        .send_group_message(&message_to(members.clone()), &ids.alice, "giftwrapped", &MessageOptions::default())
        .await
        .unwrap();

    assert!(delivery.is_complete());
    assert_eq!(delivery.metadata.member_count, 5);
    assert!(delivery.metadata.delayed);
    assert_eq!(delivery.metadata.privacy_level, PrivacyLevel::GiftWrapped);

    let wraps: Vec<&ProtocolEvent> = delivery.gift_wrapped_messages().collect();
    assert_eq!(wraps.len(), 5);
    for (wrap, member) in wraps.iter().zip(&members) {
        assert_valid_event(wrap);
        assert_gift_wrap_addressed_to(wrap, member);
    }

    let mut outer_keys: Vec<&str> = wraps.iter().map(|w| w.pubkey.as_str()).collect();
    outer_keys.sort_unstable();
    outer_keys.dedup();
    assert_eq!(outer_keys.len(), 5, "each wrap needs its own ephemeral key");

    let mut contents: Vec<&str> = wraps.iter().map(|w| w.content.as_str()).collect();
    contents.sort_unstable();
    contents.dedup();
    assert_eq!(contents.len(), 5, "each wrap needs its own ciphertext");
}

#[tokio::test]
async fn test_duplicate_members_get_one_envelope() {
    let ids = TestIdentities::new();
    let bob = ids.bob.public_key().to_string();
    let carol = ids.carol.public_key().to_string();

    let delivery = test_dispatcher()
        .send_group_message(
            &message_to(vec![bob.clone(), carol.clone(), bob.clone()]),
            &ids.alice,
            "giftwrapped",
            &MessageOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(delivery.metadata.member_count, 2);
    let recipients: Vec<&str> = delivery.deliveries.iter().map(|d| d.recipient.as_str()).collect();
    assert_eq!(recipients, vec![bob.as_str(), carol.as_str()]);
    assert_eq!(delivery.group_message.tag_values("p").count(), 2);
}

#[tokio::test]
async fn test_member_in_upper_case_is_not_a_second_member() {
    let ids = TestIdentities::new();
    let bob = ids.bob.public_key().to_string();

    let delivery = test_dispatcher()
        .send_group_message(
            &message_to(vec![bob.clone(), bob.to_uppercase()]),
            &ids.alice,
            "giftwrapped",
            &MessageOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(delivery.metadata.member_count, 1);
    assert_eq!(delivery.deliveries.len(), 1);
    assert_eq!(delivery.group_message.tag_values("p").collect::<Vec<_>>(), vec![bob.as_str()]);
}

#[tokio::test]
async fn test_unknown_level_builds_nothing() {
    let ids = TestIdentities::new();
    let result = test_dispatcher()
        .send_group_message(&message_to(ids.members()), &ids.alice, "bogus", &MessageOptions::default())
        .await;
    assert_error_code(&result, NostrkitErrorCode::UnknownPrivacyLevel);
}

#[tokio::test]
async fn test_one_bad_member_does_not_sink_the_rest() {
    let ids = TestIdentities::new();
    // Well-formed hex but not an x coordinate on the curve.
    let off_curve = "ff".repeat(32);
    let members = vec![
        ids.bob.public_key().to_string(),
        off_curve.clone(),
        ids.carol.public_key().to_string(),
    ];

    let delivery = test_dispatcher()
        .send_group_message(&message_to(members), &ids.alice, "giftwrapped", &MessageOptions::default())
        .await
        .unwrap();

    assert_eq!(delivery.deliveries.len(), 2);
    assert_eq!(delivery.failures.len(), 1);
    assert_eq!(delivery.failures[0].recipient, off_curve);
    assert!(!delivery.is_complete());
}

#[tokio::test]
async fn test_members_recover_the_group_message() {
    let ids = TestIdentities::new();
    let dispatcher = test_dispatcher();
    let mut data = message_to(ids.members());
    data.options.priority = MessagePriority::High;
    data.options.requires_approval = true;

    let delivery = dispatcher
        .send_group_message(&data, &ids.alice, "giftwrapped", &MessageOptions::default())
        .await
        .unwrap();
    assert!(delivery.metadata.requires_approval);

    for (delivery, member) in delivery.deliveries.iter().zip([&ids.bob, &ids.carol]) {
        assert!(delivery.message.metadata.requires_approval);
        let opened = dispatcher
            .decrypt_message(&delivery.message, member.secret_key(), None)
            .unwrap();
        assert!(opened.metadata.is_group_message);
        assert_eq!(opened.message, "dinner at 7");
        assert_eq!(opened.sender, ids.alice.public_key());

        let group_message = opened.group_message.unwrap();
        assert_eq!(group_message.kind, Kind::ChannelMessage);
        assert_eq!(group::channel_of(&group_message), Some(sample_channel_id().as_str()));
        assert_eq!(group_message.first_tag_value("priority"), Some("high"));
    }
}

#[tokio::test]
async fn test_encrypted_fanout_is_not_delayed() {
    let ids = TestIdentities::new();
    let dispatcher = test_dispatcher();

    let delivery = dispatcher
        .send_group_message(&message_to(ids.members()), &ids.alice, "encrypted", &MessageOptions::default())
        .await
        .unwrap();

    assert!(!delivery.metadata.delayed);
    assert_eq!(delivery.gift_wrapped_messages().count(), 0);
    for d in &delivery.deliveries {
        assert_eq!(d.message.event.kind, Kind::EncryptedDirectMessage);
        assert_eq!(d.message.metadata.delivery_time, TEST_NOW);
    }

    let opened = dispatcher
        .decrypt_message(&delivery.deliveries[0].message, ids.bob.secret_key(), None)
        .unwrap();
    assert!(opened.metadata.is_group_message);
}

#[tokio::test]
async fn test_serial_fanout_matches_concurrent() {
    let ids = TestIdentities::new();
    let serial = test_dispatcher_with(MessagingConfig::default().with_fanout_concurrency(1));

    let delivery = serial
        .send_group_message(&message_to(ids.members()), &ids.alice, "giftwrapped", &MessageOptions::default().with_delay(0))
        .await
        .unwrap();

    assert_eq!(delivery.deliveries.len(), 2);
    assert!(!delivery.metadata.delayed);
    assert!(delivery
        .deliveries
        .iter()
        .all(|d| d.message.metadata.delivery_time == TEST_NOW));
}
