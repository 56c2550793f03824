//! Tests for entity model decoding and snowflake helpers.

use herald_core::{
    ChannelId, ChannelKind, Entity, EntityKind, Guild, GuildId, Member, RoleId, User, UserId,
    is_valid_snowflake, snowflake_from_identifier,
};
use serde_json::json;

#[test]
fn test_guild_decodes_arrays_into_keyed_maps() {
    let payload = json!({
        "id": "81384788765712384",
        "name": "Herald HQ",
        "member_count": 999,
        "roles": [
            { "id": "1", "name": "@everyone" },
            { "id": "2", "name": "Moderator", "position": 3 }
        ],
        "channels": [
            { "id": "10", "type": 0, "name": "general" },
            { "id": "11", "type": 2, "name": "Lounge" }
        ],
        "members": [
            { "user": { "id": "500", "username": "ada" }, "nick": "Ada", "roles": [] }
        ]
    });

    let guild: Guild = serde_json::from_value(payload).expect("valid guild payload");

    assert_eq!(guild.id, GuildId(81384788765712384));
    assert_eq!(guild.roles.len(), 2);
    assert_eq!(guild.roles[&RoleId(2)].position, 3);
    assert_eq!(guild.channels[&ChannelId(11)].kind, ChannelKind::GuildVoice);
    assert_eq!(guild.members[&UserId(500)].nick.as_deref(), Some("Ada"));
    assert!(guild.threads.is_empty());
}

#[test]
fn test_snowflakes_accept_integers_and_strings() {
    let from_int: GuildId = serde_json::from_value(json!(42)).expect("integer snowflake");
    let from_str: GuildId = serde_json::from_value(json!("42")).expect("string snowflake");
    assert_eq!(from_int, from_str);

    let invalid = serde_json::from_value::<GuildId>(json!("forty-two"));
    assert!(invalid.is_err());
}

#[test]
fn test_channel_kind_round_trips_unknown_discriminants() {
    assert_eq!(ChannelKind::from(11), ChannelKind::PublicThread);
    assert_eq!(ChannelKind::from(15), ChannelKind::Unknown(15));
    assert_eq!(u8::from(ChannelKind::Unknown(15)), 15);
    assert!(ChannelKind::PrivateThread.is_thread());
    assert!(!ChannelKind::GuildText.is_thread());
    assert_eq!(
        ChannelKind::Unknown(15).to_string(),
        "unknown channel type (ID 15)"
    );
}

#[test]
fn test_user_tag_omits_zero_discriminator() {
    let user: User = serde_json::from_value(json!({ "id": "7", "username": "ada" }))
        .expect("valid user payload");
    assert_eq!(user.discriminator, "0");
    assert_eq!(user.tag(), "ada");

    let legacy = User::new(UserId(8), "grace").with_discriminator("1906");
    assert_eq!(legacy.tag(), "grace#1906");
}

#[test]
fn test_member_without_guild_decodes() {
    let member: Member = serde_json::from_value(json!({ "id": "5", "roles": ["1", "2"] }))
        .expect("valid member payload");
    assert_eq!(member.guild_id, None);
    assert_eq!(member.roles, vec![RoleId(1), RoleId(2)]);
}

#[test]
fn test_member_takes_its_id_from_the_embedded_user() {
    let member: Member = serde_json::from_value(json!({
        "guild_id": "1",
        "user": { "id": "5", "username": "ada" },
        "roles": [],
        "joined_at": "2024-01-01T00:00:00+00:00"
    }))
    .expect("gateway member payload");

    assert_eq!(member.id, UserId(5));
    assert_eq!(member.guild_id, Some(GuildId(1)));
    assert_eq!(member.user.map(|user| user.username).as_deref(), Some("ada"));
}

#[test]
fn test_member_without_any_id_is_rejected() {
    let result = serde_json::from_value::<Member>(json!({ "nick": "ghost", "roles": [] }));
    let err = result.expect_err("no identity to key the member by");
    assert!(err.to_string().contains("user.id"));
}

#[test]
fn test_entity_is_tagged_by_kind() {
    let entity: Entity = serde_json::from_value(json!({
        "kind": "voice_state",
        "data": { "user_id": "5", "guild_id": "1" }
    }))
    .expect("valid entity payload");

    assert_eq!(entity.kind(), EntityKind::VoiceState);
    match entity {
        Entity::VoiceState(state) => assert!(!state.is_connected()),
        other => panic!("unexpected entity: {other:?}"),
    }
}

#[test]
fn test_snowflake_helpers() {
    assert!(is_valid_snowflake("1071782537564803163"));
    assert!(!is_valid_snowflake("123"));
    assert!(!is_valid_snowflake("99999999999999999999"));

    assert_eq!(
        snowflake_from_identifier("1071782537564803163"),
        Some(1071782537564803163)
    );
    assert_eq!(
        snowflake_from_identifier("<@902895279236333590>"),
        Some(902895279236333590)
    );
    assert_eq!(
        snowflake_from_identifier("ada (ID 902895279236333590)"),
        Some(902895279236333590)
    );
    assert_eq!(snowflake_from_identifier("ada"), None);
}
