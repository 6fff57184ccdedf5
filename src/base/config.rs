//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{Res, Void};

/// Default Groq model to use.
fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

/// Default Groq chat completions endpoint.
fn default_groq_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

/// Default sampling temperature for the planning model.
fn default_groq_temperature() -> f32 {
    0.4
}

/// Default max output tokens for the planning model.
fn default_groq_max_tokens() -> u32 {
    500
}

/// Default hard timeout, in seconds, for one completion call.
fn default_groq_timeout_secs() -> u64 {
    15
}

/// Default number of thread messages replayed to the model.
fn default_thread_history_limit() -> u8 {
    20
}

/// Default thread auto-archive duration (one day).
fn default_thread_archive_minutes() -> u16 {
    1440
}

/// Default system directive for the `plan` intent.
fn default_plan_system_directive() -> String {
    prompts::PLAN_SYSTEM_DIRECTIVE.to_string()
}

/// Default system directive for ordinary thread messages.
fn default_default_system_directive() -> String {
    prompts::DEFAULT_SYSTEM_DIRECTIVE.to_string()
}

/// Auto-archive durations the platform accepts, in minutes.
const ALLOWED_ARCHIVE_MINUTES: [u16; 4] = [60, 1440, 4320, 10080];

/// Configuration for the coding-agent bot.
///
/// Read once at startup and shared read-only; cloning only bumps a reference count.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

/// The deserialized configuration values.
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Discord bot token (`DISCORD_TOKEN`).
    #[serde(default)]
    pub discord_token: String,
    /// Groq API key (`GROQ_API_KEY`).
    #[serde(default)]
    pub groq_api_key: String,
    /// Groq model to use (`GROQ_MODEL`).
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    /// Chat completions endpoint (`GROQ_ENDPOINT`).
    #[serde(default = "default_groq_endpoint")]
    pub groq_endpoint: String,
    /// Sampling temperature (`GROQ_TEMPERATURE`), between 0 and 2.
    #[serde(default = "default_groq_temperature")]
    pub groq_temperature: f32,
    /// Max output tokens (`GROQ_MAX_TOKENS`).
    #[serde(default = "default_groq_max_tokens")]
    pub groq_max_tokens: u32,
    /// Hard timeout for a completion call, in seconds (`GROQ_TIMEOUT_SECS`).
    #[serde(default = "default_groq_timeout_secs")]
    pub groq_timeout_secs: u64,
    /// How many recent thread messages are replayed to the model (`THREAD_HISTORY_LIMIT`).
    #[serde(default = "default_thread_history_limit")]
    pub thread_history_limit: u8,
    /// Auto-archive duration for new threads, in minutes (`THREAD_ARCHIVE_MINUTES`).
    #[serde(default = "default_thread_archive_minutes")]
    pub thread_archive_minutes: u16,
    /// Optional override for the `plan` system directive (`PLAN_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_plan_system_directive")]
    pub plan_system_directive: String,
    /// Optional override for the default system directive (`DEFAULT_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_default_system_directive")]
    pub default_system_directive: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            groq_api_key: String::new(),
            groq_model: default_groq_model(),
            groq_endpoint: default_groq_endpoint(),
            groq_temperature: default_groq_temperature(),
            groq_max_tokens: default_groq_max_tokens(),
            groq_timeout_secs: default_groq_timeout_secs(),
            thread_history_limit: default_thread_history_limit(),
            thread_archive_minutes: default_thread_archive_minutes(),
            plan_system_directive: default_plan_system_directive(),
            default_system_directive: default_default_system_directive(),
        }
    }
}

impl ConfigInner {
    /// Check every field and report all violations at once.
    pub fn validate(&self) -> Void {
        let mut issues = Vec::new();

        if self.discord_token.trim().is_empty() {
            issues.push("DISCORD_TOKEN must be set");
        }

        if self.groq_api_key.trim().is_empty() {
            issues.push("GROQ_API_KEY must be set");
        }

        if self.groq_model.trim().is_empty() {
            issues.push("GROQ_MODEL must not be empty");
        }

        if self.groq_endpoint.trim().is_empty() {
            issues.push("GROQ_ENDPOINT must not be empty");
        }

        if !(0.0..=2.0).contains(&self.groq_temperature) {
            issues.push("GROQ_TEMPERATURE must be between 0 and 2");
        }

        if self.groq_max_tokens < 1 {
            issues.push("GROQ_MAX_TOKENS must be at least 1");
        }

        if self.groq_timeout_secs < 1 {
            issues.push("GROQ_TIMEOUT_SECS must be at least 1");
        }

        if !(1..=100).contains(&self.thread_history_limit) {
            issues.push("THREAD_HISTORY_LIMIT must be between 1 and 100");
        }

        if !ALLOWED_ARCHIVE_MINUTES.contains(&self.thread_archive_minutes) {
            issues.push("THREAD_ARCHIVE_MINUTES must be one of 60, 1440, 4320, 10080");
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Invalid environment configuration: {}", issues.join(", ")))
        }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        Self::load_with_env(explicit_path, config::Environment::default())
    }

    /// Load from the file (if any), then layer the given environment source on top.
    fn load_with_env(explicit_path: Option<&std::path::Path>, env: config::Environment) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // Environment variables win over the file.
        cfg = cfg.add_source(env);

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;
        inner.validate()?;

        Ok(Config::from(inner))
    }
}

// Tests.
