//! System directives and fixed user-facing replies.

use crate::base::{config::Config, types::Intent};

/// System directive used when the user asks for a plan.
pub const PLAN_SYSTEM_DIRECTIVE: &str = "You are a concise software code planning assistant. Ask clarifying questions until a good plan has been drafted to pass onto a coding agent.";

/// System directive used for every other thread message.
pub const DEFAULT_SYSTEM_DIRECTIVE: &str =
    "You are a concise software code planning assistant. Summarize the request, list constraints, and ask focused clarification question if something critical is missing.";

/// Single-turn prompt sent for a health check.
pub const HEALTH_CHECK_PROMPT: &str = "Reply with only: OK";

/// Prefix for health-check replies.
pub const HEALTH_REPLY_PREFIX: &str = "Groq: ";

/// Reply when the health check fails.
pub const HEALTH_ERROR_REPLY: &str = "Groq: error reaching the API. Check GROQ_API_KEY and connectivity.";

/// Reply for the `implement` intent.
pub const IMPLEMENT_REPLY: &str = "Execution is not wired yet. I can draft a plan now; say `plan`.";

/// Reply when the planning model cannot be reached.
pub const COMPLETION_ERROR_REPLY: &str = "I hit an issue reaching the planning model. Please try again in a moment or say `health`.";

/// First message posted into a freshly opened (or reused) thread.
pub const ONBOARDING_MESSAGE: &str = "Got it. Use this thread to refine requirements. Say `plan` when ready or `health` to check Groq.";

/// Get the system directive for a conversational intent, using the config override if provided.
///
/// Only `Plan` has its own directive; every other intent falls back to the default one.
pub fn system_directive_for(config: &Config, intent: Intent) -> &str {
    match intent {
        Intent::Plan => &config.plan_system_directive,
        _ => &config.default_system_directive,
    }
}
