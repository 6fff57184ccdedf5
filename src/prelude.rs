pub use crate::base::{
    config::Config,
    types::{ChatMessage, ConversationTurn, Err, Intent, Res, Void},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
