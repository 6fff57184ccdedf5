//! Core components, types, and utilities for the coding-agent bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System directives and fixed replies.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
