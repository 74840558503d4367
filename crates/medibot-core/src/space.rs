//! # Space Module
//!
//! The fact store abstraction and its in-process implementation.
//!
//! `ReasoningEngine` is the three-operation contract the rest of the core
//! relies on: parse one expression, add an atom, evaluate a query. Any engine
//! offering it can back a `KnowledgeSession`.
//!
//! `Space` is the bundled engine: an insertion-ordered, deduplicated atom
//! store evaluated by the `interpreter` module.

use crate::atom::Atom;
use crate::interpreter::{EvalLimits, Interpreter};
use crate::{KnowledgeError, RawResult};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

// =============================================================================
// REASONING ENGINE TRAIT
// =============================================================================

/// Contract between the knowledge layer and a reasoning engine.
pub trait ReasoningEngine {
    /// The engine's internal form of an expression.
    type Atom: Clone + fmt::Display;

    /// Parse one expression into the engine's atom form.
    fn parse_atom(&self, text: &str) -> Result<Self::Atom, KnowledgeError>;

    /// Add an atom to the queryable space.
    ///
    /// Returns `false` if the engine already held an identical atom.
    fn add_atom(&mut self, atom: Self::Atom) -> Result<bool, KnowledgeError>;

    /// Evaluate a query against the space.
    fn evaluate(&self, query: &Self::Atom) -> Result<Vec<RawResult>, KnowledgeError>;

    /// Evaluate a query, giving up once `deadline` has passed.
    ///
    /// Engines that cannot be interrupted run to completion.
    fn evaluate_until(
        &self,
        query: &Self::Atom,
        _deadline: Instant,
    ) -> Result<Vec<RawResult>, KnowledgeError> {
        self.evaluate(query)
    }

    /// Number of atoms held.
    fn atom_count(&self) -> usize;
}

// =============================================================================
// SPACE
// =============================================================================

/// In-memory atom store with a bounded pattern-matching evaluator.
#[derive(Debug, Clone, Default)]
pub struct Space {
    /// Atoms in insertion order; match results follow this order.
    atoms: Vec<Atom>,
    /// Structural index used for deduplication.
    index: BTreeSet<Atom>,
    limits: EvalLimits,
}

impl Space {
    /// Create an empty space with default evaluation limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty space with custom evaluation limits.
    #[must_use]
    pub fn with_limits(limits: EvalLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Atoms in insertion order.
    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Check whether an identical atom is stored.
    #[must_use]
    pub fn contains(&self, atom: &Atom) -> bool {
        self.index.contains(atom)
    }

    /// Evaluate `query` under `limits`.
    fn run(&self, query: &Atom, limits: EvalLimits) -> Result<Vec<RawResult>, KnowledgeError> {
        let mut interpreter = Interpreter::new(&self.atoms, limits);

        // A top-level `(collapse expr)` groups every result of `expr`.
        if let Some([head, inner]) = query.children()
            && *head == Atom::sym("collapse")
        {
            let results = interpreter.evaluate(inner)?;
            return Ok(vec![RawResult::Collection(
                results.iter().map(Self::classify).collect(),
            )]);
        }

        let results = interpreter.evaluate(query)?;
        Ok(results.iter().map(Self::classify).collect())
    }

    /// Classify an evaluated atom for the normalizer.
    fn classify(atom: &Atom) -> RawResult {
        match atom {
            Atom::Symbol(name) => RawResult::Value(name.clone()),
            Atom::Str(text) => RawResult::Value(text.clone()),
            Atom::Variable(_) | Atom::Expression(_) => RawResult::Term(atom.to_string()),
        }
    }
}

impl ReasoningEngine for Space {
    type Atom = Atom;

    fn parse_atom(&self, text: &str) -> Result<Atom, KnowledgeError> {
        let atom = Atom::parse(text)?;
        if atom.children().is_none() {
            return Err(KnowledgeError::syntax(
                text,
                "top-level atom must be a parenthesized expression",
            ));
        }
        Ok(atom)
    }

    fn add_atom(&mut self, atom: Atom) -> Result<bool, KnowledgeError> {
        if self.index.contains(&atom) {
            return Ok(false);
        }
        self.index.insert(atom.clone());
        self.atoms.push(atom);
        Ok(true)
    }

    fn evaluate(&self, query: &Atom) -> Result<Vec<RawResult>, KnowledgeError> {
        self.run(query, self.limits)
    }

    fn evaluate_until(&self, query: &Atom, deadline: Instant) -> Result<Vec<RawResult>, KnowledgeError> {
        let limits = EvalLimits {
            deadline: Some(deadline),
            ..self.limits
        };
        self.run(query, limits)
    }

    fn atom_count(&self) -> usize {
        self.atoms.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn space_with(facts: &[&str]) -> Space {
        let mut space = Space::new();
        for fact in facts {
            let atom = space.parse_atom(fact).expect("parse");
            space.add_atom(atom).expect("add");
        }
        space
    }

    fn eval(space: &Space, query: &str) -> Vec<RawResult> {
        let atom = space.parse_atom(query).expect("parse query");
        space.evaluate(&atom).expect("evaluate")
    }

    #[test]
    fn rejects_bare_symbol() {
        let space = Space::new();
        assert!(space.parse_atom("HeartAttack").is_err());
    }

    #[test]
    fn duplicate_add_is_noop() {
        let mut space = Space::new();
        let atom = space.parse_atom("(causes A B)").expect("parse");
        assert!(space.add_atom(atom.clone()).expect("add"));
        assert!(!space.add_atom(atom).expect("add again"));
        assert_eq!(space.atom_count(), 1);
    }

    #[test]
    fn rule_query_returns_values() {
        let space = space_with(&[
            "(causes HeartAttack ChestPain)",
            "(causes Anxiety ChestPain)",
            "(= (getCauses $s) (match &self (causes $c $s) $c))",
        ]);
        assert_eq!(
            eval(&space, "(getCauses ChestPain)"),
            vec![
                RawResult::Value("HeartAttack".to_string()),
                RawResult::Value("Anxiety".to_string()),
            ]
        );
    }

    #[test]
    fn collapse_groups_results() {
        let space = space_with(&[
            "(symptom Flu Fever)",
            "(symptom Flu Cough)",
            "(= (getSymptoms $c) (match &self (symptom $c $s) $s))",
        ]);
        assert_eq!(
            eval(&space, "(collapse (getSymptoms Flu))"),
            vec![RawResult::Collection(vec![
                RawResult::Value("Fever".to_string()),
                RawResult::Value("Cough".to_string()),
            ])]
        );
    }

    #[test]
    fn unknown_call_is_echoed_as_term() {
        let space = space_with(&["(causes A B)"]);
        assert_eq!(
            eval(&space, "(getCauses Nothing)"),
            vec![RawResult::Term("(getCauses Nothing)".to_string())]
        );
    }

    #[test]
    fn string_values_lose_quotes() {
        let space = space_with(&[
            "(treatment Flu \"rest and fluids\")",
            "(= (getTreatment $c) (match &self (treatment $c $t) $t))",
        ]);
        assert_eq!(
            eval(&space, "(getTreatment Flu)"),
            vec![RawResult::Value("rest and fluids".to_string())]
        );
    }
}
