//! Chat service integration for Discord.
//!
//! This module provides the Discord implementation of `GenericChatClient`:
//! - Receiving "message created" events over the gateway
//! - Replying, starting threads, and posting into threads
//! - Retrieving recent thread history
//!
//! Discord-specific types stop at this module's boundary; inbound events are
//! converted into platform-neutral `ChatMessage`s before they reach the router.

use crate::{
    base::{
        config::Config,
        types::{ChannelKind, ChatMessage, Res, ThreadMessage, Void},
    },
    interaction,
    service::llm::LlmClient,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    AutoArchiveDuration, Channel, ChannelId, ChannelType, Context, CreateMessage, CreateThread, EventHandler, GatewayIntents, GetMessages, GuildChannel, GuildId, Http, Message,
    MessageFlags, MessageId, Ready,
};
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

// Extra methods on `ChatClient` applied by the discord implementation.

impl ChatClient {
    /// Creates a new Discord chat client.
    pub async fn discord(config: &Config, llm: LlmClient) -> Res<Self> {
        let client = DiscordChatClient::new(config, llm).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<DiscordChatClient> for ChatClient {
    fn from(client: DiscordChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// Gateway event handler; holds everything the router needs.
struct DiscordHandler {
    config: Config,
    llm: LlmClient,
    chat: ChatClient,
}

/// Discord client implementation.
#[derive(Clone)]
struct DiscordChatClient {
    pub config: Config,
    pub bot_user_id: String,
    pub http: Arc<Http>,
    pub llm: LlmClient,
}

impl DiscordChatClient {
    /// Create a new Discord chat client.
    #[instrument(name = "DiscordChatClient::new", skip_all)]
    pub async fn new(config: &Config, llm: LlmClient) -> Res<Self> {
        let http = Arc::new(Http::new(&config.discord_token));

        // Get the bot's user ID.

        let bot_user = http.get_current_user().await?;
        let bot_user_id = bot_user.id.to_string();

        info!("Discord bot user ID: {}", bot_user_id);

        Ok(Self {
            config: config.clone(),
            bot_user_id,
            http,
            llm,
        })
    }
}

#[async_trait]
impl GenericChatClient for DiscordChatClient {
    fn bot_user_id(&self) -> String {
        self.bot_user_id.clone()
    }

    async fn start(&self) -> Void {
        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

        let handler = DiscordHandler {
            config: self.config.clone(),
            llm: self.llm.clone(),
            chat: ChatClient::from(self.clone()),
        };

        let mut client = serenity::Client::builder(&self.config.discord_token, intents).event_handler(handler).await?;

        info!("Connecting to the Discord gateway ...");

        client.start().await?;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn reply_to_message(&self, channel_id: &str, message_id: &str, text: &str) -> Void {
        let channel = ChannelId::new(parse_id(channel_id)?);
        let message = MessageId::new(parse_id(message_id)?);

        let builder = CreateMessage::new().content(text).reference_message((channel, message));

        channel.send_message(&self.http, builder).await.map_err(|e| anyhow::anyhow!("Failed to reply to message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_thread(&self, channel_id: &str, message_id: &str, name: &str, auto_archive_minutes: u16) -> Res<String> {
        let channel = ChannelId::new(parse_id(channel_id)?);
        let message = MessageId::new(parse_id(message_id)?);

        let builder = CreateThread::new(name).auto_archive_duration(archive_duration(auto_archive_minutes));

        let thread = channel
            .create_thread_from_message(&self.http, message, builder)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create thread: {}", e))?;

        Ok(thread.id.to_string())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: &str, text: &str) -> Void {
        let channel = ChannelId::new(parse_id(channel_id)?);

        channel.say(&self.http, text).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_thread_messages(&self, thread_id: &str, limit: u8) -> Res<Vec<ThreadMessage>> {
        let thread = ChannelId::new(parse_id(thread_id)?);

        let messages = thread
            .messages(&self.http, GetMessages::new().limit(limit))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch thread messages: {}", e))?;

        Ok(messages
            .into_iter()
            .map(|m| ThreadMessage {
                created_at: snowflake_time(m.id.get()),
                id: m.id.to_string(),
                author_is_bot: m.author.bot,
                content: m.content,
            })
            .collect())
    }
}

// Gateway callbacks.

#[serenity::async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Bot logged in as {}", ready.user.tag());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        debug!("Received message event ...");

        // Our own messages come back through the gateway too; skip them before any lookups.
        if msg.author.bot {
            return;
        }

        let channel = resolve_channel_kind(&ctx, &msg).await;
        let event = to_chat_message(&msg, channel);

        interaction::chat_event::handle_chat_event(event, self.config.clone(), self.llm.clone(), self.chat.clone());
    }
}

/// Work out whether the message was posted in a text channel, a thread, or elsewhere.
///
/// The gateway cache is consulted first; only channels it does not know cost a REST call.
async fn resolve_channel_kind(ctx: &Context, msg: &Message) -> ChannelKind {
    // Direct messages are never routed, so there is nothing to look up.
    let Some(guild_id) = msg.guild_id else {
        return ChannelKind::Other;
    };

    if let Some(kind) = cached_channel_kind(ctx, guild_id, msg.channel_id) {
        return kind;
    }

    match msg.channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(channel)) => channel_kind(&channel),
        Ok(_) => ChannelKind::Other,
        Err(e) => {
            warn!("Failed to resolve channel {}: {}", msg.channel_id, e);
            ChannelKind::Other
        }
    }
}

/// Look the channel (or active thread) up in the guild cache.
fn cached_channel_kind(ctx: &Context, guild_id: GuildId, channel_id: ChannelId) -> Option<ChannelKind> {
    let guild = ctx.cache.guild(guild_id)?;

    guild
        .channels
        .get(&channel_id)
        .or_else(|| guild.threads.iter().find(|thread| thread.id == channel_id))
        .map(channel_kind)
}

fn channel_kind(channel: &GuildChannel) -> ChannelKind {
    match channel.kind {
        ChannelType::Text => ChannelKind::GuildText,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread => ChannelKind::Thread {
            owner_id: channel.owner_id.map(|id| id.to_string()),
        },
        _ => ChannelKind::Other,
    }
}

/// Convert a gateway message into the router's platform-neutral event.
fn to_chat_message(msg: &Message, channel: ChannelKind) -> ChatMessage {
    // A thread started from a message shares the message's ID.
    let has_thread = msg.flags.is_some_and(|flags| flags.contains(MessageFlags::HAS_THREAD));
    let attached_thread_id = msg
        .thread
        .as_ref()
        .map(|thread| thread.id.to_string())
        .or_else(|| has_thread.then(|| msg.id.to_string()));

    ChatMessage {
        id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        guild_id: msg.guild_id.map(|id| id.to_string()),
        author_id: msg.author.id.to_string(),
        author_tag: msg.author.tag(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
        mentions: msg.mentions.iter().map(|user| user.id.to_string()).collect(),
        channel,
        attached_thread_id,
    }
}

// Helpers.

/// Parse a snowflake ID; Discord IDs are never zero.
fn parse_id(id: &str) -> Res<u64> {
    match id.parse::<u64>() {
        Ok(0) | Err(_) => Err(anyhow::anyhow!("Invalid Discord ID: `{}`", id)),
        Ok(value) => Ok(value),
    }
}

/// Creation time encoded in a snowflake ID.
fn snowflake_time(id: u64) -> DateTime<Utc> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(millis as i64).unwrap_or_default()
}

/// Map minutes onto the durations Discord accepts; anything else becomes one day.
fn archive_duration(minutes: u16) -> AutoArchiveDuration {
    match minutes {
        60 => AutoArchiveDuration::OneHour,
        4320 => AutoArchiveDuration::ThreeDays,
        10080 => AutoArchiveDuration::OneWeek,
        _ => AutoArchiveDuration::OneDay,
    }
}

// Tests.
