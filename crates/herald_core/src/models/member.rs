//! Guild member models.

use crate::{GuildId, Keyed, RoleId, User, UserId};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// A user's membership in a guild.
///
/// Members are keyed by the ID of their user. Snapshots without a guild ID
/// cannot be placed and are dropped by the cache.
///
/// Discord sends members without a top-level `id`; it is taken from the
/// embedded user when absent.
///
/// # Examples
///
/// ```
/// use herald_core::{Member, UserId};
///
/// let member: Member = serde_json::from_str(
///     r#"{"user": {"id": "5", "username": "ada"}, "roles": []}"#,
/// ).unwrap();
/// assert_eq!(member.id, UserId(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[serde(try_from = "MemberPayload")]
#[setters(prefix = "with_", strip_option, into)]
pub struct Member {
    /// ID of the member's user
    #[setters(skip)]
    pub id: UserId,
    /// Guild the membership belongs to
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Embedded user object, when the payload carried one
    #[serde(default)]
    pub user: Option<User>,
    /// Guild-specific nickname
    #[serde(default)]
    pub nick: Option<String>,
    /// Roles assigned to the member
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

impl Member {
    /// Create a member with only its identity set.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            guild_id: None,
            user: None,
            nick: None,
            roles: Vec::new(),
        }
    }
}

/// Member as it arrives on the wire.
#[derive(Deserialize)]
struct MemberPayload {
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    guild_id: Option<GuildId>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    nick: Option<String>,
    #[serde(default)]
    roles: Vec<RoleId>,
}

impl TryFrom<MemberPayload> for Member {
    type Error = String;

    fn try_from(payload: MemberPayload) -> Result<Self, Self::Error> {
        let id = payload
            .id
            .or_else(|| payload.user.as_ref().map(|user| user.id))
            .ok_or_else(|| "member has neither `id` nor `user.id`".to_string())?;

        Ok(Self {
            id,
            guild_id: payload.guild_id,
            user: payload.user,
            nick: payload.nick,
            roles: payload.roles,
        })
    }
}

impl Keyed for Member {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }
}
