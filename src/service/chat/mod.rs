pub mod discord;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, ThreadMessage, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Discord. Implementing this trait allows different chat services to be used
/// with the bot, and lets tests substitute a mock transport.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to detect mentions and thread ownership.
    fn bot_user_id(&self) -> String;

    /// Start the chat client listener.
    ///
    /// This connects to the platform, subscribes to new messages, and runs
    /// until the connection is closed.
    async fn start(&self) -> Void;

    /// Reply to a specific message in the channel (or thread) it was posted in.
    async fn reply_to_message(&self, channel_id: &str, message_id: &str, text: &str) -> Void;

    /// Start a thread from a message and return the new thread's ID.
    async fn create_thread(&self, channel_id: &str, message_id: &str, name: &str, auto_archive_minutes: u16) -> Res<String>;

    /// Post a plain message into a channel or thread.
    async fn send_message(&self, channel_id: &str, text: &str) -> Void;

    /// Fetch up to `limit` of the most recent messages in a thread.
    ///
    /// The order of the returned messages is unspecified.
    async fn get_thread_messages(&self, thread_id: &str, limit: u8) -> Res<Vec<ThreadMessage>>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
