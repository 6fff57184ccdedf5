//! Event handling and user interactions for the coding-agent bot.
//!
//! This module provides functionality for handling chat events:
//! - Routing inbound messages (ignore, thread continuation, mention trigger)
//! - Classifying thread messages into intents
//! - Rebuilding thread history as model turns
//! - Naming the threads the bot opens

pub mod chat_event;
pub mod context;
pub mod intent;
pub mod thread_name;
