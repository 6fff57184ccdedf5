//! Rebuilds a thread's conversation from the platform's message log.
//!
//! Nothing is cached: every call re-fetches, so the model always sees what the
//! platform currently holds.

use crate::{
    base::types::{ChatMessage, ConversationTurn, Res, ThreadMessage},
    service::chat::ChatClient,
};
use tracing::{debug, instrument};

/// Assemble the conversation for the thread the event was posted in.
///
/// Returns an empty conversation when the event is not inside a thread.
#[instrument(skip_all)]
pub async fn assemble(event: &ChatMessage, chat: &ChatClient, limit: u8) -> Res<Vec<ConversationTurn>> {
    if !event.channel.is_thread() {
        return Ok(Vec::new());
    }

    let messages = chat.get_thread_messages(&event.channel_id, limit).await?;
    debug!("Fetched {} thread messages", messages.len());

    Ok(to_turns(messages))
}

/// Order fetched messages oldest first and tag each with its role.
///
/// Bot-authored messages become `assistant` turns; everything else is `user`.
/// Content is kept verbatim, empty messages included.
pub fn to_turns(mut messages: Vec<ThreadMessage>) -> Vec<ConversationTurn> {
    // Snowflakes break ties between messages created in the same millisecond.
    messages.sort_by_key(|message| (message.created_at, message.id.parse::<u64>().unwrap_or_default()));

    messages
        .into_iter()
        .map(|message| {
            if message.author_is_bot {
                ConversationTurn::assistant(message.content)
            } else {
                ConversationTurn::user(message.content)
            }
        })
        .collect()
}
