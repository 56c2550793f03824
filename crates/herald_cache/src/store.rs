//! Canonical entity maps and per-guild views.
//!
//! Channels, roles and members live in exactly one canonical map each. A
//! cached guild holds only the *identifiers* of the channels, roles and
//! members that belong to it; [`EntityStore::guild`] resolves them against the
//! canonical maps. Every write goes through a merge method here, which updates
//! the canonical map and the owning guild's index in the same step.

use herald_core::{
    Attachment, AttachmentId, Channel, ChannelId, Emoji, EmojiId, Guild, GuildId, Member, Message,
    MessageId, Role, RoleId, User, UserId, VoiceState,
};
use std::collections::{HashMap, HashSet};

/// Guild-owned state plus indices into the canonical maps.
#[derive(Debug, Clone)]
struct GuildRecord {
    id: GuildId,
    name: Option<String>,
    owner_id: Option<UserId>,
    member_count: u64,
    unavailable: bool,
    emojis: HashMap<EmojiId, Emoji>,
    voice_states: HashMap<UserId, VoiceState>,
    threads: HashMap<ChannelId, Channel>,
    channel_ids: HashSet<ChannelId>,
    role_ids: HashSet<RoleId>,
    member_ids: HashSet<UserId>,
}

impl GuildRecord {
    fn new(id: GuildId) -> Self {
        Self {
            id,
            name: None,
            owner_id: None,
            member_count: 0,
            unavailable: false,
            emojis: HashMap::new(),
            voice_states: HashMap::new(),
            threads: HashMap::new(),
            channel_ids: HashSet::new(),
            role_ids: HashSet::new(),
            member_ids: HashSet::new(),
        }
    }
}

/// Outcome of merging a member snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberMerge {
    /// The snapshot carried no guild ID and was dropped.
    Dropped,
    /// Stored in the per-guild member map.
    Stored {
        /// Whether the owning guild was cached and its view updated.
        mirrored: bool,
    },
}

/// Outcome of merging a voice state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceMerge {
    /// The owning guild is not cached (or unknown); nothing was written.
    GuildNotCached,
    /// The user is connected; the state was stored.
    Connected,
    /// The user left voice; any stored state was removed.
    Disconnected,
}

/// Sizes of the canonical maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, derive_more::Display)]
#[display(
    "{} guilds, {} channels, {} users, {} members, {} roles, {} messages ({} edited), {} attachments ({} fetching)",
    guilds,
    channels,
    users,
    members,
    roles,
    messages,
    previous_messages,
    attachments,
    pending_fetches
)]
pub struct CacheStats {
    /// Cached guilds
    pub guilds: usize,
    /// Canonical channels
    pub channels: usize,
    /// Canonical users
    pub users: usize,
    /// Members across all guilds
    pub members: usize,
    /// Canonical roles
    pub roles: usize,
    /// Latest message snapshots
    pub messages: usize,
    /// Retained previous message snapshots
    pub previous_messages: usize,
    /// Enriched attachments
    pub attachments: usize,
    /// Attachments currently being fetched
    pub pending_fetches: usize,
}

/// The canonical entity maps.
///
/// Only the merge methods mutate the store; everything public is read-only.
#[derive(Debug, Default)]
pub struct EntityStore {
    guilds: HashMap<GuildId, GuildRecord>,
    users: HashMap<UserId, User>,
    members: HashMap<GuildId, HashMap<UserId, Member>>,
    channels: HashMap<ChannelId, Channel>,
    latest_messages: HashMap<MessageId, Message>,
    previous_messages: HashMap<MessageId, Message>,
    attachments: HashMap<AttachmentId, Attachment>,
    roles: HashMap<RoleId, Role>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Merges
    // ------------------------------------------------------------------

    /// Merge a guild snapshot.
    ///
    /// Sub-collections are unioned with what is already cached, the snapshot
    /// winning on key collisions. The member counter is left untouched.
    pub(crate) fn merge_guild(&mut self, guild: &Guild) {
        let record = self
            .guilds
            .entry(guild.id)
            .or_insert_with(|| GuildRecord::new(guild.id));

        record.name = guild.name.clone();
        record.owner_id = guild.owner_id;
        record.unavailable = guild.unavailable;
        record
            .emojis
            .extend(guild.emojis.iter().map(|(id, emoji)| (*id, emoji.clone())));
        for thread in guild.threads.values() {
            let mut thread = thread.clone();
            thread.guild_id.get_or_insert(guild.id);
            record.threads.insert(thread.id, thread);
        }
        for state in guild.voice_states.values() {
            let mut state = state.clone();
            state.guild_id = Some(guild.id);
            if state.is_connected() {
                record.voice_states.insert(state.user_id, state);
            } else {
                record.voice_states.remove(&state.user_id);
            }
        }

        for role in guild.roles.values() {
            let mut role = role.clone();
            role.guild_id = Some(guild.id);
            self.merge_role(role);
        }
        for member in guild.members.values() {
            let mut member = member.clone();
            member.guild_id = Some(guild.id);
            self.merge_member(member);
        }
        for channel in guild.channels.values() {
            let mut channel = channel.clone();
            channel.guild_id.get_or_insert(guild.id);
            self.merge_channel(channel);
        }
    }

    /// Replace a channel. Returns whether a cached guild's view now holds it.
    pub(crate) fn merge_channel(&mut self, channel: Channel) -> bool {
        let id = channel.id;
        let guild_id = channel.guild_id;

        if let Some(previous) = self.channels.insert(id, channel)
            && let Some(previous_guild) = previous.guild_id
            && Some(previous_guild) != guild_id
            && let Some(record) = self.guilds.get_mut(&previous_guild)
        {
            record.channel_ids.remove(&id);
        }

        match guild_id.and_then(|guild_id| self.guilds.get_mut(&guild_id)) {
            Some(record) => {
                record.channel_ids.insert(id);
                true
            }
            None => false,
        }
    }

    /// Replace a user.
    pub(crate) fn merge_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Upsert a member into its guild's member map.
    pub(crate) fn merge_member(&mut self, member: Member) -> MemberMerge {
        let Some(guild_id) = member.guild_id else {
            return MemberMerge::Dropped;
        };
        let id = member.id;

        self.members.entry(guild_id).or_default().insert(id, member);

        let mirrored = match self.guilds.get_mut(&guild_id) {
            Some(record) => {
                record.member_ids.insert(id);
                true
            }
            None => false,
        };
        MemberMerge::Stored { mirrored }
    }

    /// Store a message snapshot, demoting the current one to `previous`.
    ///
    /// Returns whether an earlier snapshot was demoted.
    pub(crate) fn merge_message(&mut self, message: Message) -> bool {
        match self.latest_messages.insert(message.id, message) {
            Some(previous) => {
                self.previous_messages.insert(previous.id, previous);
                true
            }
            None => false,
        }
    }

    /// Replace a role. Returns whether a cached guild's view now holds it.
    pub(crate) fn merge_role(&mut self, role: Role) -> bool {
        let id = role.id;
        let guild_id = role.guild_id;

        if let Some(previous) = self.roles.insert(id, role)
            && let Some(previous_guild) = previous.guild_id
            && Some(previous_guild) != guild_id
            && let Some(record) = self.guilds.get_mut(&previous_guild)
        {
            record.role_ids.remove(&id);
        }

        match guild_id.and_then(|guild_id| self.guilds.get_mut(&guild_id)) {
            Some(record) => {
                record.role_ids.insert(id);
                true
            }
            None => false,
        }
    }

    /// Upsert or remove a voice state in its guild.
    pub(crate) fn merge_voice_state(&mut self, state: VoiceState) -> VoiceMerge {
        let Some(record) = state
            .guild_id
            .and_then(|guild_id| self.guilds.get_mut(&guild_id))
        else {
            return VoiceMerge::GuildNotCached;
        };

        if state.is_connected() {
            record.voice_states.insert(state.user_id, state);
            VoiceMerge::Connected
        } else {
            record.voice_states.remove(&state.user_id);
            VoiceMerge::Disconnected
        }
    }

    /// Store an enriched attachment. Existing entries are never overwritten.
    ///
    /// Returns whether the attachment was inserted.
    pub(crate) fn insert_attachment(&mut self, attachment: Attachment) -> bool {
        match self.attachments.entry(attachment.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(attachment);
                true
            }
        }
    }

    /// Set a cached guild's member counter. Returns `false` if it is not cached.
    pub(crate) fn set_member_count(&mut self, guild_id: GuildId, count: u64) -> bool {
        match self.guilds.get_mut(&guild_id) {
            Some(record) => {
                record.member_count = count;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Check if a guild is cached.
    pub fn has_guild(&self, id: GuildId) -> bool {
        self.guilds.contains_key(&id)
    }

    /// Assemble the view of a cached guild.
    pub fn guild(&self, id: GuildId) -> Option<Guild> {
        let record = self.guilds.get(&id)?;

        let mut guild = Guild::new(record.id);
        guild.name = record.name.clone();
        guild.owner_id = record.owner_id;
        guild.member_count = record.member_count;
        guild.unavailable = record.unavailable;
        guild.emojis = record.emojis.clone();
        guild.voice_states = record.voice_states.clone();
        guild.threads = record.threads.clone();
        guild.channels = self
            .guild_channels(id)
            .map(|channel| (channel.id, channel.clone()))
            .collect();
        guild.roles = self
            .guild_roles(id)
            .map(|role| (role.id, role.clone()))
            .collect();
        guild.members = self
            .guild_members(id)
            .map(|member| (member.id, member.clone()))
            .collect();
        Some(guild)
    }

    /// Name of a cached guild.
    pub fn guild_name(&self, id: GuildId) -> Option<Option<&str>> {
        self.guilds.get(&id).map(|record| record.name.as_deref())
    }

    /// Channels in a cached guild's view. Empty if the guild is not cached.
    pub fn guild_channels(&self, id: GuildId) -> impl Iterator<Item = &Channel> {
        self.guilds
            .get(&id)
            .into_iter()
            .flat_map(|record| record.channel_ids.iter())
            .filter_map(|channel_id| self.channels.get(channel_id))
    }

    /// Roles in a cached guild's view. Empty if the guild is not cached.
    pub fn guild_roles(&self, id: GuildId) -> impl Iterator<Item = &Role> {
        self.guilds
            .get(&id)
            .into_iter()
            .flat_map(|record| record.role_ids.iter())
            .filter_map(|role_id| self.roles.get(role_id))
    }

    /// Members in a cached guild's view. Empty if the guild is not cached.
    pub fn guild_members(&self, id: GuildId) -> impl Iterator<Item = &Member> {
        let members = self.members.get(&id);
        self.guilds
            .get(&id)
            .into_iter()
            .flat_map(|record| record.member_ids.iter())
            .filter_map(move |user_id| members.and_then(|members| members.get(user_id)))
    }

    /// Voice state of a user in a cached guild.
    pub fn voice_state(&self, guild_id: GuildId, user_id: UserId) -> Option<&VoiceState> {
        self.guilds.get(&guild_id)?.voice_states.get(&user_id)
    }

    /// Canonical channel.
    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(&id)
    }

    /// Canonical user.
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Member of a guild, whether or not the guild itself is cached.
    pub fn member(&self, guild_id: GuildId, user_id: UserId) -> Option<&Member> {
        self.members.get(&guild_id)?.get(&user_id)
    }

    /// Per-guild member map, whether or not the guild itself is cached.
    pub fn members(&self, guild_id: GuildId) -> Option<&HashMap<UserId, Member>> {
        self.members.get(&guild_id)
    }

    /// Latest snapshot of a message.
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.latest_messages.get(&id)
    }

    /// Snapshot immediately prior to the latest one.
    pub fn previous_message(&self, id: MessageId) -> Option<&Message> {
        self.previous_messages.get(&id)
    }

    /// Enriched attachment.
    pub fn attachment(&self, id: AttachmentId) -> Option<&Attachment> {
        self.attachments.get(&id)
    }

    /// Check if an attachment has been stored.
    pub fn has_attachment(&self, id: AttachmentId) -> bool {
        self.attachments.contains_key(&id)
    }

    /// Canonical role.
    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.get(&id)
    }

    /// IDs of every cached guild.
    pub fn guild_ids(&self) -> impl Iterator<Item = GuildId> + '_ {
        self.guilds.keys().copied()
    }

    /// Sizes of the canonical maps. `pending_fetches` is left at zero.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            guilds: self.guilds.len(),
            channels: self.channels.len(),
            users: self.users.len(),
            members: self.members.values().map(HashMap::len).sum(),
            roles: self.roles.len(),
            messages: self.latest_messages.len(),
            previous_messages: self.previous_messages.len(),
            attachments: self.attachments.len(),
            pending_fetches: 0,
        }
    }
}
