//! # Interpreter Module
//!
//! Bounded evaluation of queries against a `Space`.
//!
//! Supported forms:
//! - `(= head body)` rules: a query matching `head` evaluates to `body`
//! - `(match &self pattern template)`: one `template` per matching atom
//! - `(collapse expr)`: all results of `expr` as one expression
//! - variable patterns with no rule: matched directly against stored facts
//!
//! Anything else evaluates to itself. Every query runs under `EvalLimits`:
//! steps, rule nesting, the size of every term built from a rule body, and
//! an optional wall-clock deadline.

use crate::atom::{Atom, Bindings, match_fresh};
use crate::primitives::{MAX_EVAL_DEPTH, MAX_EVAL_STEPS, MAX_NESTING_DEPTH, MAX_TERM_SIZE};
use crate::KnowledgeError;
use std::time::Instant;

/// Steps between two reads of the clock when a deadline is set.
const CLOCK_CHECK_INTERVAL: usize = 256;

/// Resource limits for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum evaluation steps (atoms visited, facts scanned and term
    /// nodes built).
    pub max_steps: usize,
    /// Maximum nesting of rule applications.
    pub max_depth: usize,
    /// Maximum nodes in one instantiated rule body or template.
    pub max_term_size: usize,
    /// Evaluation stops with an error once this instant has passed.
    pub deadline: Option<Instant>,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_steps: MAX_EVAL_STEPS,
            max_depth: MAX_EVAL_DEPTH,
            max_term_size: MAX_TERM_SIZE,
            deadline: None,
        }
    }
}

/// Single-use evaluator over a slice of atoms.
pub(crate) struct Interpreter<'a> {
    atoms: &'a [Atom],
    limits: EvalLimits,
    steps: usize,
    next_clock_check: usize,
    renames: usize,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(atoms: &'a [Atom], limits: EvalLimits) -> Self {
        Self {
            atoms,
            limits,
            steps: 0,
            next_clock_check: 0,
            renames: 0,
        }
    }

    /// Evaluate `query` to zero or more atoms.
    pub(crate) fn evaluate(&mut self, query: &Atom) -> Result<Vec<Atom>, KnowledgeError> {
        self.eval(query, 0)
    }

    fn tick(&mut self) -> Result<(), KnowledgeError> {
        self.charge(1)
    }

    fn charge(&mut self, cost: usize) -> Result<(), KnowledgeError> {
        self.steps = self.steps.saturating_add(cost);
        if self.steps > self.limits.max_steps {
            return Err(KnowledgeError::BudgetExceeded(self.limits.max_steps));
        }
        if let Some(deadline) = self.limits.deadline
            && self.steps >= self.next_clock_check
        {
            self.next_clock_check = self.steps + CLOCK_CHECK_INTERVAL;
            if Instant::now() >= deadline {
                return Err(KnowledgeError::DeadlinePassed);
            }
        }
        Ok(())
    }

    /// Substitute `bindings` into `template`, charging one step per node built.
    fn instantiate(&mut self, template: &Atom, bindings: &Bindings) -> Result<Atom, KnowledgeError> {
        let (term, size) = template
            .instantiate_bounded(bindings, self.limits.max_term_size, MAX_NESTING_DEPTH)
            .ok_or(KnowledgeError::TermTooLarge(self.limits.max_term_size))?;
        self.charge(size)?;
        Ok(term)
    }

    fn eval(&mut self, atom: &Atom, depth: usize) -> Result<Vec<Atom>, KnowledgeError> {
        self.tick()?;
        if depth > self.limits.max_depth {
            return Err(KnowledgeError::DepthExceeded(self.limits.max_depth));
        }

        let Some(children) = atom.children() else {
            return Ok(vec![atom.clone()]);
        };

        match atom.head_symbol() {
            Some("match") => return self.eval_match(children, depth),
            Some("collapse") if children.len() == 2 => {
                let inner = self.eval(&children[1], depth + 1)?;
                return Ok(vec![Atom::Expression(inner)]);
            }
            _ => {}
        }

        let atoms = self.atoms;
        let mut applied = false;
        let mut results = Vec::new();

        for rule in atoms {
            let Some([eq, head, body]) = rule.children() else {
                continue;
            };
            if !matches!(eq, Atom::Symbol(s) if s == "=") {
                continue;
            }
            self.tick()?;

            let (head, body) = self.freshen(head, body);
            if let Some(bindings) = match_fresh(&head, atom) {
                applied = true;
                let body = self.instantiate(&body, &bindings)?;
                results.extend(self.eval(&body, depth + 1)?);
            }
        }

        if applied {
            return Ok(results);
        }

        if !atom.is_ground() {
            return self.lookup(atom);
        }

        // No rule and nothing to bind: the call stays unevaluated.
        Ok(vec![atom.clone()])
    }

    fn eval_match(&mut self, children: &[Atom], depth: usize) -> Result<Vec<Atom>, KnowledgeError> {
        let [_, space, pattern, template] = children else {
            return Err(KnowledgeError::Evaluation(
                "match expects (match &self pattern template)".to_string(),
            ));
        };
        if !matches!(space, Atom::Symbol(s) if s == "&self") {
            return Err(KnowledgeError::Evaluation(format!(
                "unknown space {}, only &self is available",
                space
            )));
        }

        let atoms = self.atoms;
        let mut results = Vec::new();
        for fact in atoms {
            self.tick()?;
            if let Some(bindings) = match_fresh(pattern, fact) {
                let term = self.instantiate(template, &bindings)?;
                results.extend(self.eval(&term, depth + 1)?);
            }
        }
        Ok(results)
    }

    /// Match a query with variables directly against stored facts.
    ///
    /// A single-variable pattern yields each binding; otherwise each matched fact.
    fn lookup(&mut self, pattern: &Atom) -> Result<Vec<Atom>, KnowledgeError> {
        let variables = pattern.variables();
        let atoms = self.atoms;
        let mut results = Vec::new();

        for fact in atoms {
            self.tick()?;
            if fact.head_symbol() == Some("=") {
                continue;
            }
            if let Some(bindings) = match_fresh(pattern, fact) {
                match variables.as_slice() {
                    [only] => results.extend(bindings.get(only).cloned()),
                    _ => results.push(fact.clone()),
                }
            }
        }
        Ok(results)
    }

    /// Rename a rule's variables so they cannot capture the caller's.
    fn freshen(&mut self, head: &Atom, body: &Atom) -> (Atom, Atom) {
        self.renames += 1;
        let mut renaming = Bindings::new();
        for name in head.variables().into_iter().chain(body.variables()) {
            // The space makes the name unparseable, so it cannot clash.
            let fresh = Atom::var(format!("{} {}", name, self.renames));
            renaming.entry(name).or_insert(fresh);
        }
        (head.instantiate(&renaming), body.instantiate(&renaming))
    }
}

// =============================================================================
// TESTS
// =============================================================================
