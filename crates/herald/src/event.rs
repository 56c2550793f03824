//! Decoded gateway events.

use herald_core::{Channel, Guild, GuildId, Member, Message, Role, User, VoiceState};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

/// A gateway event, decoded from Discord's `{"t": ..., "d": ...}` envelope.
///
/// Only the events that carry cacheable entities or change a guild's
/// availability are modelled.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, strum::IntoStaticStr, strum::VariantNames,
)]
#[serde(tag = "t", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    /// A guild became available, either on connect or on joining it.
    GuildCreate(Guild),
    /// A guild's settings changed.
    GuildUpdate(Guild),
    /// A guild became unavailable or the bot left it.
    GuildDelete(UnavailableGuild),
    /// A channel was created.
    ChannelCreate(Channel),
    /// A channel was updated.
    ChannelUpdate(Channel),
    /// A thread was created or the bot was added to one.
    ThreadCreate(Channel),
    /// A thread was updated.
    ThreadUpdate(Channel),
    /// A user joined a guild.
    GuildMemberAdd(Member),
    /// A member's guild profile changed.
    GuildMemberUpdate(Member),
    /// A role was created.
    GuildRoleCreate(RoleEvent),
    /// A role was updated.
    GuildRoleUpdate(RoleEvent),
    /// A message was posted.
    MessageCreate(Message),
    /// A message was edited.
    MessageUpdate(Message),
    /// A user joined, left or moved between voice channels.
    VoiceStateUpdate(VoiceState),
    /// The bot's own user changed.
    UserUpdate(User),
}

impl GatewayEvent {
    /// Gateway name of the event, such as `GUILD_CREATE`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Whether gateway events named `name` are modelled.
    pub fn is_modelled(name: &str) -> bool {
        Self::VARIANTS.contains(&name)
    }
}

/// A raw gateway frame: the event name and its still-encoded payload.
///
/// Gateway streams carry many events Herald has no use for (`READY`,
/// `TYPING_START`, `PRESENCE_UPDATE`, ...) as well as non-dispatch frames
/// without a name. Decoding the envelope first lets callers skip those and
/// reject only malformed payloads of modelled events.
///
/// # Examples
///
/// ```
/// use herald::Dispatch;
///
/// let typing: Dispatch =
///     serde_json::from_str(r#"{"op": 0, "t": "TYPING_START", "d": {}}"#).unwrap();
/// assert!(typing.decode().unwrap().is_none());
///
/// let guild: Dispatch =
///     serde_json::from_str(r#"{"t": "GUILD_CREATE", "d": {"id": "1"}}"#).unwrap();
/// assert_eq!(guild.decode().unwrap().map(|event| event.name()), Some("GUILD_CREATE"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dispatch {
    /// Event name, absent on non-dispatch frames
    #[serde(default)]
    pub t: Option<String>,
    /// Event payload
    #[serde(default)]
    pub d: serde_json::Value,
}

impl Dispatch {
    /// Event name, or `"<none>"` for frames without one.
    pub fn name(&self) -> &str {
        self.t.as_deref().unwrap_or("<none>")
    }

    /// Decode the payload of a modelled event. Unmodelled events and frames
    /// without a name decode to `None`.
    ///
    /// # Errors
    ///
    /// Fails when the event is modelled but its payload does not match.
    pub fn decode(self) -> serde_json::Result<Option<GatewayEvent>> {
        match self.t {
            Some(name) if GatewayEvent::is_modelled(&name) => {
                serde_json::from_value(serde_json::json!({ "t": name, "d": self.d })).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// Payload of `GUILD_DELETE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableGuild {
    /// Guild ID
    pub id: GuildId,
    /// `true` during an outage; absent when the bot was removed
    #[serde(default)]
    pub unavailable: bool,
}

/// Payload of `GUILD_ROLE_CREATE` and `GUILD_ROLE_UPDATE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEvent {
    /// Guild the role belongs to
    pub guild_id: GuildId,
    /// The role
    pub role: Role,
}

impl RoleEvent {
    /// The role with its owning guild filled in.
    pub fn into_role(self) -> Role {
        let mut role = self.role;
        role.guild_id = Some(self.guild_id);
        role
    }
}

