use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The author role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message submitted to the completion model.
///
/// Turns are immutable once built; ordering within a request is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The classified purpose of a message posted inside a bot-owned thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Plan,
    Implement,
    Health,
    Default,
}

/// Where an inbound message was posted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelKind {
    /// A top-level text channel in a guild.
    GuildText,
    /// A thread, along with the account that owns it (if the platform told us).
    Thread { owner_id: Option<String> },
    /// Anything else (voice, forum, announcement, DMs, ...).
    #[default]
    Other,
}

impl ChannelKind {
    pub fn is_thread(&self) -> bool {
        matches!(self, ChannelKind::Thread { .. })
    }

    /// Whether this is a thread owned by the given account.
    pub fn is_thread_owned_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && matches!(self, ChannelKind::Thread { owner_id: Some(owner) } if owner == user_id)
    }
}

/// A platform-neutral view of an inbound "message created" event.
///
/// Missing platform fields degrade to empty strings rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatMessage {
    /// The message id.
    pub id: String,
    /// The channel (or thread) the message was posted in.
    pub channel_id: String,
    /// The guild the channel belongs to, if any.
    pub guild_id: Option<String>,
    /// The author's account id.
    pub author_id: String,
    /// A human-readable author tag, used for logging only.
    pub author_tag: String,
    /// Whether the author is a bot account.
    pub author_is_bot: bool,
    /// The raw message text.
    pub content: String,
    /// Account ids mentioned by the message.
    pub mentions: Vec<String>,
    /// The kind of channel the message was posted in.
    pub channel: ChannelKind,
    /// The thread already started from this message, if any.
    pub attached_thread_id: Option<String>,
}

impl ChatMessage {
    pub fn mentions_user(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.mentions.iter().any(|m| m == user_id)
    }
}

/// A message fetched from a thread's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub id: String,
    pub author_is_bot: bool,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
