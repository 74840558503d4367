//! # medibot-core
//!
//! The knowledge layer for MediBot - THE LOGIC.
//!
//! This crate turns a MeTTa-style knowledge file into a queryable fact store
//! and turns structured queries into flat, displayable fact lists.
//!
//! ## Pipeline
//!
//! ```text
//! source text ─► parser ─► Expression* ─► loader ─► Space
//! query text  ─► session ─► Space::evaluate ─► RawResult* ─► normalizer ─► facts
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous, no network dependencies
//! - Every evaluation is bounded (`primitives::MAX_EVAL_STEPS`, `MAX_EVAL_DEPTH`)
//! - One bad expression never aborts a load
//! - A query never fails from the caller's point of view
//!
//! ## Example
//!
//! ```
//! use medibot_core::KnowledgeSession;
//!
//! let mut session = KnowledgeSession::new();
//! session.load_source("(causes Flu Fever) (= (getCauses $s) (match &self (causes $c $s) $c))");
//! assert_eq!(session.query("(getCauses Fever)").facts, vec!["Flu"]);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod atom;
pub mod interpreter;
pub mod loader;
pub mod normalizer;
pub mod parser;
pub mod primitives;
pub mod query;
pub mod session;
pub mod space;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Expression, ExpressionError, KnowledgeError, LoadReport, ParseWarning, QueryOutcome,
    RawResult,
};

// =============================================================================
// RE-EXPORTS: Knowledge Layer
// =============================================================================

pub use atom::Atom;
pub use interpreter::EvalLimits;
pub use loader::{Loader, Registration};
pub use normalizer::normalize;
pub use parser::{ExpressionScanner, ParseOutcome, first_expression, parse_expressions};
pub use query::Query;
pub use session::KnowledgeSession;
pub use space::{ReasoningEngine, Space};
