//! # Assistant Response Types
//!
//! Serializable results of the assistant operations, printed by the CLI
//! as text or as JSON (`--json-mode`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reply to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    /// The query taken from the translator output, if one was found.
    pub query: Option<String>,
    pub facts_used: String,
    pub answer: String,
}

/// Outcome of adding a fact at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnResponse {
    pub status: String,
    pub fact: String,
}

impl LearnResponse {
    #[must_use]
    pub fn learned(&self) -> bool {
        self.status == "Learned"
    }
}

/// A fact proposed from free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: Option<String>,
    pub message: String,
}

/// How well a fact is supported by the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Explanation of a `causes` fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub fact: String,
    pub explanation: String,
    pub source: String,
    pub confidence: Confidence,
}
