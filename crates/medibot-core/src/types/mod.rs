//! # Core Type Definitions
//!
//! This module contains the shared types of the MediBot knowledge layer:
//! - Source units (`Expression`, `ParseWarning`)
//! - Load outcomes (`LoadReport`, `ExpressionError`)
//! - Query outcomes (`RawResult`, `QueryOutcome`)
//! - Error types (`KnowledgeError`)
//!
//! ## Guarantees
//!
//! - An `Expression` always has balanced parentheses
//! - A `QueryOutcome` always carries at least one fact string

use crate::primitives::{ERROR_PREFIX, NO_RESULT_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// EXPRESSION
// =============================================================================

/// One top-level fact or rule, exactly as it appeared in the source.
///
/// Produced by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Expression(String);

impl Expression {
    /// Wrap an already balanced expression.
    ///
    /// Only the parser and the loader's runtime path construct these.
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Get the expression as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the expression in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Expressions are never empty; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First `max_chars` characters, with `...` appended when cut.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.0, max_chars)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when it was longer.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

// =============================================================================
// PARSE WARNING
// =============================================================================

/// Structural warning raised when the source ends inside an expression.
///
/// Everything scanned before `offset` was emitted normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Byte offset of the unterminated `(` in the comment-stripped buffer.
    pub offset: usize,
    /// 1-based line of the original source containing that `(`.
    pub line: usize,
    /// The start of the truncated expression.
    pub preview: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unbalanced parentheses in expression starting at offset {} (line {}): {}",
            self.offset, self.line, self.preview
        )
    }
}

// =============================================================================
// LOAD REPORT
// =============================================================================

/// A single expression that the fact store refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionError {
    pub expression: String,
    pub reason: String,
}

/// Outcome of loading one knowledge source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Expressions registered with the store, in source order.
    pub loaded: Vec<Expression>,
    /// How many of `loaded` were already present in the store.
    pub duplicates: usize,
    /// Expressions rejected by the store.
    pub errors: Vec<ExpressionError>,
    /// Set when the source was truncated inside an expression.
    pub warning: Option<ParseWarning>,
}

impl LoadReport {
    /// Number of successfully loaded expressions.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// True when every scanned expression was accepted and nothing was truncated.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warning.is_none()
    }
}

// =============================================================================
// RAW RESULT
// =============================================================================

/// One result produced by evaluating a query against the fact store.
///
/// Engines that can classify their output return `Value`, `Term` or
/// `Collection`. Engines that only expose text return `Text`, which the
/// normalizer inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawResult {
    /// A plain value such as a symbol or string.
    Value(String),
    /// A structured term, rendered as text. Carries no new information.
    Term(String),
    /// A group of results, flattened in order.
    Collection(Vec<RawResult>),
    /// Unclassified rendering from an untyped engine.
    Text(String),
}

// =============================================================================
// QUERY OUTCOME
// =============================================================================

/// Normalized answer to one structured query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The query as submitted.
    pub query: String,
    /// Flat fact list. Never empty.
    pub facts: Vec<String>,
    /// False when the query could not be parsed or evaluated.
    pub success: bool,
    /// False when `facts` holds only a placeholder or an error item.
    pub found: bool,
}

impl QueryOutcome {
    /// Outcome carrying extracted facts, or the placeholder when there are none.
    #[must_use]
    pub fn from_facts(query: impl Into<String>, facts: Vec<String>) -> Self {
        let query = query.into();
        if facts.is_empty() {
            return Self::not_found(query);
        }
        Self {
            query,
            facts,
            success: true,
            found: true,
        }
    }

    /// Outcome for a query that evaluated to nothing.
    #[must_use]
    pub fn not_found(query: impl Into<String>) -> Self {
        let query = query.into();
        let placeholder = format!("{} {}", NO_RESULT_PREFIX, query);
        Self {
            query,
            facts: vec![placeholder],
            success: true,
            found: false,
        }
    }

    /// Outcome for a query that failed; the error is carried as text.
    #[must_use]
    pub fn error(query: impl Into<String>, error: &KnowledgeError) -> Self {
        Self {
            query: query.into(),
            facts: vec![format!("{} {}", ERROR_PREFIX, error)],
            success: false,
            found: false,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the MediBot knowledge layer.
///
/// - Source errors are fatal to initialization
/// - Syntax errors are isolated to one expression
/// - Query errors are degraded to text by the session, never propagated
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// The knowledge source file does not exist.
    #[error("Knowledge file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The knowledge source exceeds the size limit.
    #[error("Knowledge file is {size} bytes, limit is {limit} bytes")]
    SourceTooLarge { size: u64, limit: u64 },

    /// An I/O error occurred while reading a source.
    #[error("I/O error: {0}")]
    Io(String),

    /// An expression does not fit the store's atom grammar.
    #[error("Syntax error in {expression}: {reason}")]
    Syntax { expression: String, reason: String },

    /// A query is not shaped like a function call.
    #[error("Invalid query {0}: expected a call like (getCauses ChestPain)")]
    InvalidQuery(String),

    /// Evaluation failed for a reason other than resource limits.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Evaluation ran out of steps.
    #[error("Evaluation exceeded {0} steps")]
    BudgetExceeded(usize),

    /// Rule applications nested too deeply.
    #[error("Evaluation exceeded nesting depth {0}")]
    DepthExceeded(usize),

    /// A rule body or template grew past the term size or nesting limit.
    #[error("Evaluation built a term larger than {0} nodes or too deeply nested")]
    TermTooLarge(usize),

    /// Evaluation was still running at its deadline.
    #[error("Evaluation stopped at its deadline")]
    DeadlinePassed,

    /// Evaluation did not finish in time.
    #[error("Query timed out after {0} ms")]
    Timeout(u64),
}

impl KnowledgeError {
    /// Build a syntax error for `expression`.
    pub fn syntax(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Syntax {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_long_text() {
        let expr = Expression::new("(causes HeartAttack ChestPain)");
        assert_eq!(expr.preview(7), "(causes...");
        assert_eq!(expr.preview(100), "(causes HeartAttack ChestPain)");
    }

    #[test]
    fn outcome_without_facts_is_placeholder() {
        let outcome = QueryOutcome::from_facts("(getCauses Nothing)", Vec::new());
        assert!(outcome.success);
        assert!(!outcome.found);
        assert_eq!(outcome.facts, vec!["No result for (getCauses Nothing)"]);
    }

    #[test]
    fn error_outcome_carries_description() {
        let err = KnowledgeError::InvalidQuery("getCauses".to_string());
        let outcome = QueryOutcome::error("getCauses", &err);
        assert!(!outcome.success);
        assert_eq!(outcome.facts.len(), 1);
        assert!(outcome.facts[0].starts_with("Error: Invalid query getCauses"));
    }

    #[test]
    fn load_report_clean_when_no_errors() {
        let mut report = LoadReport::default();
        assert!(report.is_clean());
        report.warning = Some(ParseWarning {
            offset: 3,
            line: 1,
            preview: "(a".to_string(),
        });
        assert!(!report.is_clean());
    }
}
