//! Routing for inbound "message created" events.
//!
//! Every event is classified on its own, from freshly fetched data, into one of
//! four routes. Each route produces at most one observable platform action.

use tracing::Instrument;

use crate::{
    base::{
        prompts::{self, COMPLETION_ERROR_REPLY, HEALTH_CHECK_PROMPT, HEALTH_ERROR_REPLY, HEALTH_REPLY_PREFIX, IMPLEMENT_REPLY, ONBOARDING_MESSAGE},
        types::ChannelKind,
    },
    interaction::{context, intent::classify, thread_name::name_for},
    prelude::*,
    service::{chat::ChatClient, llm::LlmClient},
};

/// How the router treats an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Bot-authored, or outside a guild.
    Ignore,
    /// Posted inside a thread the bot owns.
    ThreadContinuation,
    /// Mentions the bot in a top-level text channel.
    MentionTrigger,
    /// Anything else.
    NoMatch,
}

/// Decide which route an event takes.
pub fn route(event: &ChatMessage, bot_user_id: &str) -> Route {
    if event.author_is_bot || event.guild_id.is_none() {
        return Route::Ignore;
    }

    if event.channel.is_thread_owned_by(bot_user_id) {
        return Route::ThreadContinuation;
    }

    if event.mentions_user(bot_user_id) && event.channel == ChannelKind::GuildText {
        return Route::MentionTrigger;
    }

    Route::NoMatch
}

/// Handle an event in the background.
///
/// Spawns a task so the gateway can keep delivering events; errors are logged, not propagated.
#[instrument(skip_all)]
pub fn handle_chat_event(event: ChatMessage, config: Config, llm: LlmClient, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_chat_event(&event, &config, &llm, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Route and handle a single event, returning the route that was taken.
#[instrument(skip_all, fields(message_id = %event.id, author_id = %event.author_id))]
pub async fn process_chat_event(event: &ChatMessage, config: &Config, llm: &LlmClient, chat: &ChatClient) -> Res<Route> {
    let route = route(event, &chat.bot_user_id());

    match route {
        Route::Ignore | Route::NoMatch => {}
        Route::ThreadContinuation => handle_thread_message(event, config, llm, chat).await?,
        Route::MentionTrigger => handle_mention(event, config, chat).await?,
    }

    Ok(route)
}

/// Reply inside a bot-owned thread according to the message's intent.
#[instrument(skip_all)]
async fn handle_thread_message(event: &ChatMessage, config: &Config, llm: &LlmClient, chat: &ChatClient) -> Void {
    info!("Thread message from {} ({}): {}", event.author_tag, event.id, event.content);

    let intent = classify(&event.content);

    let reply = match intent {
        Intent::Health => health_reply(llm).await,
        Intent::Implement => IMPLEMENT_REPLY.to_string(),
        Intent::Plan | Intent::Default => match planning_reply(event, intent, config, llm, chat).await {
            Ok(reply) => {
                info!("Groq reply generated");
                reply
            }
            Err(err) => {
                error!("Groq error: {}", err);
                COMPLETION_ERROR_REPLY.to_string()
            }
        },
    };

    chat.reply_to_message(&event.channel_id, &event.id, &reply).await
}

/// Ping the model with a fixed single-turn prompt; never touches thread history.
async fn health_reply(llm: &LlmClient) -> String {
    match llm.complete(&[ConversationTurn::system(HEALTH_CHECK_PROMPT)]).await {
        Ok(reply) => format!("{HEALTH_REPLY_PREFIX}{reply}"),
        Err(err) => {
            error!("Groq health error: {}", err);
            HEALTH_ERROR_REPLY.to_string()
        }
    }
}

/// Send the intent's system directive followed by the thread history.
async fn planning_reply(event: &ChatMessage, intent: Intent, config: &Config, llm: &LlmClient, chat: &ChatClient) -> Res<String> {
    let history = context::assemble(event, chat, config.thread_history_limit).await?;

    let mut turns = Vec::with_capacity(history.len() + 1);
    turns.push(ConversationTurn::system(prompts::system_directive_for(config, intent)));
    turns.extend(history);

    Ok(llm.complete(&turns).await?)
}

/// Open (or reuse) a thread for a mention and post the onboarding message.
#[instrument(skip_all)]
async fn handle_mention(event: &ChatMessage, config: &Config, chat: &ChatClient) -> Void {
    let thread_id = match &event.attached_thread_id {
        Some(thread_id) => {
            info!("Reusing existing thread {}", thread_id);
            thread_id.clone()
        }
        None => {
            let name = name_for(&event.content);
            info!("Opening thread `{}`", name);
            chat.create_thread(&event.channel_id, &event.id, &name, config.thread_archive_minutes).await?
        }
    };

    chat.send_message(&thread_id, ONBOARDING_MESSAGE).await
}
