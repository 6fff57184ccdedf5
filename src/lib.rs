//! Library root for `coding-agent-bot`.
//!
//! The coding-agent bot is a Discord planning assistant designed to:
//! - Open a dedicated thread whenever it is @-mentioned in a text channel
//! - Relay the thread's conversation to a Groq-hosted model
//! - Switch system prompts with simple keywords (`plan`, `implement`, `health`)
//!
//! The bot keeps no state of its own: every reply is built from the thread
//! history the platform currently holds. The architecture is built around
//! extensible traits that allow for different implementations of each service.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with LLM and chat clients
/// - Starts the gateway listener for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting coding-agent-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("A rustls crypto provider was already installed."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
