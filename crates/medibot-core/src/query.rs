//! # Query Module
//!
//! Structured query text accepted by the knowledge session.
//!
//! - A query must look like a function call: `(head args...)`
//! - A leading `!` evaluation marker is accepted and dropped
//! - No semantic validation: unknown heads simply find nothing

use crate::KnowledgeError;
use std::fmt;

/// A query string that passed the shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
}

impl Query {
    /// Validate the shape of `raw` as a call expression.
    pub fn parse(raw: &str) -> Result<Self, KnowledgeError> {
        let trimmed = raw.trim();
        let text = trimmed.strip_prefix('!').unwrap_or(trimmed).trim_start();

        let Some(inner) = text
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return Err(KnowledgeError::InvalidQuery(raw.to_string()));
        };

        let head = inner
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .next()
            .unwrap_or_default();
        if head.is_empty() || head.starts_with('$') || head.starts_with('"') {
            return Err(KnowledgeError::InvalidQuery(raw.to_string()));
        }

        Ok(Self {
            text: text.to_string(),
        })
    }

    /// The query without the evaluation marker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The called function name.
    #[must_use]
    pub fn head(&self) -> &str {
        self.text[1..]
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .next()
            .unwrap_or_default()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// =============================================================================
// TESTS
// =============================================================================
