#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coding_agent_bot::{
    base::{
        config::{Config, ConfigInner},
        prompts::{COMPLETION_ERROR_REPLY, DEFAULT_SYSTEM_DIRECTIVE, HEALTH_ERROR_REPLY, IMPLEMENT_REPLY, ONBOARDING_MESSAGE, PLAN_SYSTEM_DIRECTIVE},
        types::{ChannelKind, ChatMessage, ConversationTurn, Res, ThreadMessage, Void},
    },
    interaction::chat_event::{Route, process_chat_event},
    service::{
        chat::{ChatClient, GenericChatClient},
        llm::{CompletionError, CompletionResult, GenericLlmClient, LlmClient},
    },
};
use mockall::mock;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> String;
        async fn start(&self) -> Void;
        async fn reply_to_message(&self, channel_id: &str, message_id: &str, text: &str) -> Void;
        async fn create_thread(&self, channel_id: &str, message_id: &str, name: &str, auto_archive_minutes: u16) -> Res<String>;
        async fn send_message(&self, channel_id: &str, text: &str) -> Void;
        async fn get_thread_messages(&self, thread_id: &str, limit: u8) -> Res<Vec<ThreadMessage>>;
    }
}

// Mock LLM client for testing.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn complete(&self, turns: &[ConversationTurn]) -> CompletionResult;
    }
}

// Helpers.

const BOT_USER_ID: &str = "900000000000000001";
const USER_ID: &str = "300000000000000003";
const GUILD_ID: &str = "200000000000000002";
const CHANNEL_ID: &str = "100000000000000001";
const MESSAGE_ID: &str = "110000000000000001";

fn test_config() -> Config {
    Config::from(ConfigInner {
        discord_token: "discord-test".to_string(),
        groq_api_key: "gsk_test".to_string(),
        ..Default::default()
    })
}

/// A chat mock that knows its own ID; every other call must be expected explicitly.
fn get_mock_chat() -> MockChat {
    let mut mock = MockChat::new();
    mock.expect_bot_user_id().return_const(BOT_USER_ID.to_string());
    mock
}

fn into_clients(chat: MockChat, llm: MockLlm) -> (ChatClient, LlmClient) {
    (ChatClient::new(Arc::new(chat)), LlmClient::new(Arc::new(llm)))
}

fn message(content: &str, channel: ChannelKind) -> ChatMessage {
    ChatMessage {
        id: MESSAGE_ID.to_string(),
        channel_id: CHANNEL_ID.to_string(),
        guild_id: Some(GUILD_ID.to_string()),
        author_id: USER_ID.to_string(),
        author_tag: "planner#0001".to_string(),
        author_is_bot: false,
        content: content.to_string(),
        mentions: Vec::new(),
        channel,
        attached_thread_id: None,
    }
}

fn bot_thread() -> ChannelKind {
    ChannelKind::Thread {
        owner_id: Some(BOT_USER_ID.to_string()),
    }
}

fn thread_message(secs: i64, author_is_bot: bool, content: &str) -> ThreadMessage {
    ThreadMessage {
        id: secs.to_string(),
        author_is_bot,
        content: content.to_string(),
        created_at: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
    }
}

fn expect_reply(chat: &mut MockChat, expected: &'static str) {
    chat.expect_reply_to_message()
        .withf(move |channel_id, message_id, text| channel_id == CHANNEL_ID && message_id == MESSAGE_ID && text == expected)
        .times(1)
        .returning(|_, _, _| Ok(()));
}

// Ignore route.

#[tokio::test]
async fn bot_author_is_always_a_no_op() {
    let chat = get_mock_chat();
    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let mut event = message("health", bot_thread());
    event.author_is_bot = true;
    event.mentions = vec![BOT_USER_ID.to_string()];

    let route = process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    assert_eq!(route, Route::Ignore);
}

#[tokio::test]
async fn message_without_guild_is_a_no_op() {
    let chat = get_mock_chat();
    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let mut event = message("<@900000000000000001> hi", ChannelKind::GuildText);
    event.guild_id = None;
    event.mentions = vec![BOT_USER_ID.to_string()];

    let route = process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    assert_eq!(route, Route::Ignore);
}

#[tokio::test]
async fn unrelated_messages_are_a_no_op() {
    let chat = get_mock_chat();
    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let config = test_config();

    let plain = message("just chatting", ChannelKind::GuildText);
    assert_eq!(process_chat_event(&plain, &config, &llm, &chat).await.unwrap(), Route::NoMatch);

    let foreign_thread = message(
        "plan",
        ChannelKind::Thread {
            owner_id: Some(USER_ID.to_string()),
        },
    );
    assert_eq!(process_chat_event(&foreign_thread, &config, &llm, &chat).await.unwrap(), Route::NoMatch);
}

// Mention route.

#[tokio::test]
async fn mention_opens_a_named_thread_and_onboards() {
    let mut chat = get_mock_chat();
    chat.expect_create_thread()
        .withf(|channel_id, message_id, name, minutes| {
            channel_id == CHANNEL_ID && message_id == MESSAGE_ID && name == "amaan's-coding-agent-please-plan-the-thing" && *minutes == 1440
        })
        .times(1)
        .returning(|_, _, _, _| Ok("555".to_string()));
    chat.expect_send_message()
        .withf(|channel_id, text| channel_id == "555" && text == ONBOARDING_MESSAGE)
        .times(1)
        .returning(|_, _| Ok(()));

    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let mut event = message("<@900000000000000001> please plan the thing", ChannelKind::GuildText);
    event.mentions = vec![BOT_USER_ID.to_string()];

    let route = process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    assert_eq!(route, Route::MentionTrigger);
}

#[tokio::test]
async fn mention_reuses_an_attached_thread() {
    let mut chat = get_mock_chat();
    chat.expect_create_thread().never();
    chat.expect_send_message()
        .withf(|channel_id, text| channel_id == "777" && text == ONBOARDING_MESSAGE)
        .times(1)
        .returning(|_, _| Ok(()));

    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let mut event = message("<@900000000000000001> again", ChannelKind::GuildText);
    event.mentions = vec![BOT_USER_ID.to_string()];
    event.attached_thread_id = Some("777".to_string());

    let route = process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    assert_eq!(route, Route::MentionTrigger);
}

#[tokio::test]
async fn mention_outside_a_text_channel_does_nothing() {
    let chat = get_mock_chat();
    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let mut event = message("<@900000000000000001> hi", ChannelKind::Other);
    event.mentions = vec![BOT_USER_ID.to_string()];

    let route = process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    assert_eq!(route, Route::NoMatch);
}

#[tokio::test]
async fn thread_creation_failure_is_reported() {
    let mut chat = get_mock_chat();
    chat.expect_create_thread().times(1).returning(|_, _, _, _| Err(anyhow::anyhow!("missing permissions")));
    chat.expect_send_message().never();

    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let mut event = message("<@900000000000000001> hi", ChannelKind::GuildText);
    event.mentions = vec![BOT_USER_ID.to_string()];

    let result = process_chat_event(&event, &test_config(), &llm, &chat).await;

    assert!(result.is_err());
}

// Thread continuation route.

#[tokio::test]
async fn health_sends_a_single_system_turn_and_relays_the_reply() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages().never();
    expect_reply(&mut chat, "Groq: OK");

    let mut llm = MockLlm::new();
    llm.expect_complete()
        .withf(|turns| turns.len() == 1 && turns[0] == ConversationTurn::system("Reply with only: OK"))
        .times(1)
        .returning(|_| Ok("OK".to_string()));

    let (chat, llm) = into_clients(chat, llm);

    let event = message("health", bot_thread());
    let route = process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    assert_eq!(route, Route::ThreadContinuation);
}

#[tokio::test]
async fn health_failure_replies_with_the_connectivity_hint() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages().never();
    expect_reply(&mut chat, HEALTH_ERROR_REPLY);

    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(|_| Err(CompletionError::Timeout));

    let (chat, llm) = into_clients(chat, llm);

    let event = message("  STATUS ", bot_thread());
    process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();
}

#[tokio::test]
async fn implement_replies_without_calling_the_model() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages().never();
    expect_reply(&mut chat, IMPLEMENT_REPLY);

    let mut llm = MockLlm::new();
    llm.expect_complete().never();

    let (chat, llm) = into_clients(chat, llm);

    let event = message("go", bot_thread());
    process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();
}

#[tokio::test]
async fn plan_sends_the_plan_directive_and_chronological_history() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages()
        .withf(|thread_id, limit| thread_id == CHANNEL_ID && *limit == 20)
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                thread_message(300, false, "plan"),
                thread_message(100, false, "<@900000000000000001> build a url shortener"),
                thread_message(200, true, ONBOARDING_MESSAGE),
            ])
        });
    expect_reply(&mut chat, "1. Pick a storage backend.");

    let seen: Arc<Mutex<Vec<ConversationTurn>>> = Arc::default();
    let recorder = seen.clone();

    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(move |turns| {
        recorder.lock().unwrap().extend_from_slice(turns);
        Ok("1. Pick a storage backend.".to_string())
    });

    let (chat, llm) = into_clients(chat, llm);

    let event = message("plan", bot_thread());
    process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ConversationTurn::system(PLAN_SYSTEM_DIRECTIVE),
            ConversationTurn::user("<@900000000000000001> build a url shortener"),
            ConversationTurn::assistant(ONBOARDING_MESSAGE),
            ConversationTurn::user("plan"),
        ]
    );
}

#[tokio::test]
async fn other_messages_use_the_default_directive() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages()
        .times(1)
        .returning(|_, _| Ok(vec![thread_message(100, false, "it should run on a raspberry pi")]));
    expect_reply(&mut chat, "Noted.");

    let mut llm = MockLlm::new();
    llm.expect_complete()
        .withf(|turns| turns.len() == 2 && turns[0] == ConversationTurn::system(DEFAULT_SYSTEM_DIRECTIVE))
        .times(1)
        .returning(|_| Ok("Noted.".to_string()));

    let (chat, llm) = into_clients(chat, llm);

    let event = message("it should run on a raspberry pi", bot_thread());
    process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();
}

#[tokio::test]
async fn completion_failure_replies_with_a_safe_message() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages().times(1).returning(|_, _| Ok(Vec::new()));
    expect_reply(&mut chat, COMPLETION_ERROR_REPLY);

    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(|_| {
        Err(CompletionError::RemoteError {
            status: 429,
            body: "rate limited".to_string(),
        })
    });

    let (chat, llm) = into_clients(chat, llm);

    let event = message("make a plan please", bot_thread());
    process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();
}

#[tokio::test]
async fn history_fetch_failure_replies_with_a_safe_message() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages().times(1).returning(|_, _| Err(anyhow::anyhow!("Missing Access")));
    expect_reply(&mut chat, COMPLETION_ERROR_REPLY);

    let mut llm = MockLlm::new();
    llm.expect_complete().never();

    let (chat, llm) = into_clients(chat, llm);

    let event = message("what about auth?", bot_thread());
    process_chat_event(&event, &test_config(), &llm, &chat).await.unwrap();
}

#[tokio::test]
async fn history_limit_comes_from_config() {
    let mut chat = get_mock_chat();
    chat.expect_get_thread_messages()
        .withf(|_, limit| *limit == 5)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    expect_reply(&mut chat, "ok");

    let mut llm = MockLlm::new();
    llm.expect_complete().times(1).returning(|_| Ok("ok".to_string()));

    let (chat, llm) = into_clients(chat, llm);

    let config = Config::from(ConfigInner {
        discord_token: "discord-test".to_string(),
        groq_api_key: "gsk_test".to_string(),
        thread_history_limit: 5,
        ..Default::default()
    });

    let event = message("hello", bot_thread());
    process_chat_event(&event, &config, &llm, &chat).await.unwrap();
}

#[tokio::test]
async fn reply_failure_is_propagated() {
    let mut chat = get_mock_chat();
    chat.expect_reply_to_message().times(1).returning(|_, _, _| Err(anyhow::anyhow!("Unknown Channel")));

    let llm = MockLlm::new();
    let (chat, llm) = into_clients(chat, llm);

    let event = message("implement", bot_thread());
    let result = process_chat_event(&event, &test_config(), &llm, &chat).await;

    assert!(result.is_err());
}
