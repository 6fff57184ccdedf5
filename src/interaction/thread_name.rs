//! Thread titles derived from the message that opened them.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix for every thread the bot opens.
pub const THREAD_NAME_PREFIX: &str = "amaan's-coding-agent-";

/// Platform ceiling on thread name length, in characters.
pub const MAX_THREAD_NAME_CHARS: usize = 100;

/// Maximum number of words kept from the source message.
const MAX_WORDS: usize = 6;

/// Word used when nothing is left after stripping mentions.
const FALLBACK_WORD: &str = "request";

/// Mention tokens: `<@123>`, `<@!123>`, or a bare `@user123` that starts a word.
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@!?\d+>|\B@!?\w*\d+\b").expect("mention pattern is valid"));

/// Derive a bounded-length thread name from the triggering message.
///
/// Mentions are removed, whitespace is collapsed, the first six words are
/// joined with `-`, and the branded result is cut to 100 characters.
pub fn name_for(text: &str) -> String {
    let cleaned = MENTION.replace_all(text, " ");
    let words: Vec<&str> = cleaned.split_whitespace().take(MAX_WORDS).collect();

    let base = if words.is_empty() { FALLBACK_WORD.to_string() } else { words.join("-") };

    format!("{THREAD_NAME_PREFIX}{base}").chars().take(MAX_THREAD_NAME_CHARS).collect()
}
