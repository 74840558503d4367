//! # Session Module
//!
//! The knowledge session: one fact store with a defined lifecycle.
//!
//! A session is created once at startup, populated from a knowledge file,
//! extended at runtime through `add_fact`, and dropped at shutdown. It is the
//! only owner of its engine; callers that share it across tasks must
//! serialize writes (the app wraps it in a `RwLock`).
//!
//! Queries never fail from the caller's point of view: every outcome is a
//! non-empty fact list, possibly holding a placeholder or an error item.

use crate::loader::{Loader, Registration};
use crate::normalizer::normalize;
use crate::query::Query;
use crate::space::{ReasoningEngine, Space};
use crate::{Expression, KnowledgeError, LoadReport, QueryOutcome};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// A fact store plus the record of what was loaded into it.
#[derive(Debug, Default)]
pub struct KnowledgeSession<E: ReasoningEngine = Space> {
    engine: E,
    /// Loaded expressions in load order, duplicates excluded.
    expressions: Vec<Expression>,
    /// Canonical renderings of loaded atoms, for `contains`.
    known: BTreeSet<String>,
}

impl KnowledgeSession<Space> {
    /// Create an empty session backed by the in-process `Space`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(Space::new())
    }

    /// Create a session and load the knowledge file at `path`.
    ///
    /// Fails only if the file cannot be read; rejected expressions are
    /// listed in the returned report.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, LoadReport), KnowledgeError> {
        let mut session = Self::new();
        let report = session.load_file(path)?;
        Ok((session, report))
    }
}

impl<E: ReasoningEngine> KnowledgeSession<E> {
    /// Create an empty session around an existing engine.
    #[must_use]
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            expressions: Vec::new(),
            known: BTreeSet::new(),
        }
    }

    /// Get a reference to the engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Expressions loaded so far, in load order.
    #[must_use]
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Number of distinct facts and rules loaded.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.expressions.len()
    }

    // =========================================================================
    // INGESTION
    // =========================================================================

    /// Load knowledge from source text.
    pub fn load_source(&mut self, source: &str) -> LoadReport {
        let report = Loader::load_str(&mut self.engine, source);
        for expression in &report.loaded {
            self.record(expression);
        }
        report
    }

    /// Load knowledge from a file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, KnowledgeError> {
        let report = Loader::load_file(&mut self.engine, path)?;
        for expression in &report.loaded {
            self.record(expression);
        }
        Ok(report)
    }

    /// Add a single fact at runtime.
    pub fn add_fact(&mut self, text: &str) -> Result<Expression, KnowledgeError> {
        let (expression, registration) = Loader::add_fact(&mut self.engine, text)?;
        if registration == Registration::Added {
            self.record(&expression);
        }
        Ok(expression)
    }

    /// Check whether exactly this fact has been loaded.
    #[must_use]
    pub fn contains(&self, fact: &str) -> bool {
        self.engine
            .parse_atom(fact.trim())
            .is_ok_and(|atom| self.known.contains(&atom.to_string()))
    }

    fn record(&mut self, expression: &Expression) {
        // Re-parsing cannot fail: the loader just accepted this text.
        if let Ok(atom) = self.engine.parse_atom(expression.as_str())
            && self.known.insert(atom.to_string())
        {
            self.expressions.push(expression.clone());
        }
    }

    // =========================================================================
    // QUERY
    // =========================================================================

    /// Evaluate a structured query and normalize the result.
    ///
    /// Never fails: malformed queries and evaluation errors come back as a
    /// single `Error: ...` item with `success == false`.
    pub fn query(&self, text: &str) -> QueryOutcome {
        self.run_query(text, None)
    }

    /// `query`, abandoning evaluation once `deadline` has passed.
    ///
    /// A query still running at the deadline comes back as an error item.
    pub fn query_until(&self, text: &str, deadline: Instant) -> QueryOutcome {
        self.run_query(text, Some(deadline))
    }

    fn run_query(&self, text: &str, deadline: Option<Instant>) -> QueryOutcome {
        let outcome = match Query::parse(text) {
            Ok(query) => {
                let results = self.engine.parse_atom(query.as_str()).and_then(|atom| {
                    match deadline {
                        Some(deadline) => self.engine.evaluate_until(&atom, deadline),
                        None => self.engine.evaluate(&atom),
                    }
                });
                normalize(query.as_str(), results)
            }
            Err(e) => QueryOutcome::error(text.trim(), &e),
        };

        if !outcome.success {
            tracing::warn!(query = %outcome.query, "Query error: {}", outcome.facts.join("; "));
        }
        outcome
    }
}

// =============================================================================
// TESTS
// =============================================================================
