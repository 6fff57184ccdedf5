//! Keyword-based intent classification for thread messages.

use crate::base::types::Intent;

/// A single textual trigger, evaluated against the normalized message.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// The whole message equals the phrase.
    Equals(&'static str),
    /// The phrase appears anywhere in the message.
    Contains(&'static str),
}

impl Trigger {
    fn matches(&self, normalized: &str) -> bool {
        match self {
            Trigger::Equals(phrase) => normalized == *phrase,
            Trigger::Contains(phrase) => normalized.contains(phrase),
        }
    }
}

/// Classification rules in priority order; the first rule with a matching trigger wins.
const RULES: &[(Intent, &[Trigger])] = &[
    (
        Intent::Health,
        &[Trigger::Equals("health"), Trigger::Equals("groq"), Trigger::Equals("check"), Trigger::Equals("status")],
    ),
    (
        Intent::Implement,
        &[Trigger::Equals("implement"), Trigger::Equals("go"), Trigger::Contains("start implementing")],
    ),
    (Intent::Plan, &[Trigger::Equals("plan"), Trigger::Contains("make a plan")]),
];

/// Classify a thread message.
///
/// Matching is case-insensitive and runs on the trimmed message; anything that
/// hits no rule is `Intent::Default`.
pub fn classify(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();

    RULES
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|trigger| trigger.matches(&normalized)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Default)
}
