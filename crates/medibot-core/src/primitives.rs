//! # Innate Primitives
//!
//! Hardcoded runtime constants for the MediBot knowledge layer.
//!
//! The knowledge store starts empty but with fixed logic.
//! These primitives are compiled into the binary and are immutable at runtime.
//!
//! ## Primitives
//!
//! 1. **Scanning Primitive**: how source text is cut into expressions.
//! 2. **Evaluation Primitive**: how far a single query may run.
//! 3. **Normalization Primitive**: how empty or failed results are rendered.

/// Line comment marker. Everything from it to the end of the line is dropped.
pub const COMMENT_MARKER: char = ';';

/// Number of characters of a truncated expression shown in a structural warning.
pub const WARNING_PREVIEW_LENGTH: usize = 50;

/// Number of characters of an expression shown in load logs.
pub const LOG_PREVIEW_LENGTH: usize = 60;

/// Default location of the knowledge base, relative to the working directory.
pub const DEFAULT_KNOWLEDGE_FILE: &str = "metta_kb/medical.metta";

// =============================================================================
// EVALUATION LIMITS
// =============================================================================

/// Maximum number of evaluation steps for one query.
///
/// - All queries must be computationally bounded.
/// - This prevents runaway evaluation on self-referential rules.
pub const MAX_EVAL_STEPS: usize = 100_000;

/// Maximum nesting of rule applications for one query.
pub const MAX_EVAL_DEPTH: usize = 64;

/// Maximum number of atom nodes in one instantiated rule body or template.
pub const MAX_TERM_SIZE: usize = 10_000;

/// Maximum parenthesis nesting of a single atom.
///
/// Applies to parsed expressions and to terms built during evaluation.
pub const MAX_NESTING_DEPTH: usize = 256;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a knowledge source file (16 MB).
///
/// Files larger than this are rejected before they are read.
pub const MAX_SOURCE_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum length of a single expression (64 KB).
///
/// Longer expressions are rejected by the loader, one at a time.
pub const MAX_EXPRESSION_LENGTH: usize = 65536;

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Prefix of the placeholder item returned when a query yields nothing.
pub const NO_RESULT_PREFIX: &str = "No result for";

/// Prefix of the item returned when a query fails.
pub const ERROR_PREFIX: &str = "Error:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_marker_is_semicolon() {
        assert_eq!(COMMENT_MARKER, ';');
    }

    #[test]
    fn expression_limit_fits_in_source_limit() {
        assert!((MAX_EXPRESSION_LENGTH as u64) < MAX_SOURCE_SIZE);
    }

    #[test]
    fn nesting_limit_is_below_term_limit() {
        assert!(MAX_NESTING_DEPTH < MAX_TERM_SIZE);
    }
}
