//! # Fact Explanation
//!
//! Explains a `causes` fact by checking that it is stored.

use super::types::{Confidence, Explanation};
use medibot_core::KnowledgeSession;

/// Split `causes X Y` or `(causes X Y)` into `(X, Y)`.
#[must_use]
pub fn parse_causes(fact: &str) -> Option<(&str, &str)> {
    let trimmed = fact.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(trimmed);

    let mut parts = inner.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("causes"), Some(cause), Some(symptom), None) => Some((cause, symptom)),
        _ => None,
    }
}

/// Explain `fact` against the facts stored in `session`.
#[must_use]
pub fn explain(session: &KnowledgeSession, fact: &str) -> Explanation {
    if let Some((cause, symptom)) = parse_causes(fact) {
        let source = format!("(causes {} {})", cause, symptom);
        if session.contains(&source) {
            return Explanation {
                fact: fact.to_string(),
                explanation: format!(
                    "I know {} causes {} because it is defined in the medical knowledge base.",
                    cause, symptom
                ),
                source,
                confidence: Confidence::High,
            };
        }
    }

    Explanation {
        fact: fact.to_string(),
        explanation: "Explanation not available.".to_string(),
        source: "Unknown".to_string(),
        confidence: Confidence::Low,
    }
}
