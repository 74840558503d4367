//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the knowledge layer is INVALID.
//!
//! ## Tiers
//! - T0: Source Integrity (scanning)
//! - T1: Isolated Loading
//! - T2: Query Round-Trip
//! - T3: Result Normalization

use medibot_core::{
    Expression, KnowledgeError, KnowledgeSession, RawResult, ReasoningEngine, Space, normalize,
    parse_expressions,
};
use std::path::PathBuf;

/// Path of the knowledge base shipped with the repository.
fn shipped_knowledge_base() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../metta_kb/medical.metta")
}

fn texts(expressions: &[Expression]) -> Vec<&str> {
    expressions.iter().map(Expression::as_str).collect()
}

// =============================================================================
// TIER T0: SOURCE INTEGRITY
// =============================================================================

mod t0_source_integrity {
    use super::*;

    /// T0.1: Balanced input yields exactly its top-level expressions, in order.
    #[test]
    fn balanced_input_round_trips() {
        let outcome = parse_expressions("(a 1)\n(b (c 2))\n\n(d)");
        assert_eq!(texts(&outcome.expressions), vec!["(a 1)", "(b (c 2))", "(d)"]);
        assert!(outcome.warning.is_none());
    }

    /// T0.2: Comments never reach the store.
    #[test]
    fn comment_stripping_is_transparent() {
        let with_comment = parse_expressions("(causes A B) ; comment here");
        let without = parse_expressions("(causes A B)");
        assert_eq!(with_comment, without);
    }

    /// T0.3: A truncated tail is reported, earlier expressions survive.
    #[test]
    fn truncated_tail_is_reported() {
        let outcome = parse_expressions("(causes Flu Fever)\n(causes HeartAttack ChestPain");
        assert_eq!(texts(&outcome.expressions), vec!["(causes Flu Fever)"]);
        let warning = outcome.warning.expect("structural warning");
        assert_eq!(warning.line, 2);
    }

    /// T0.4: The shipped knowledge base scans cleanly.
    #[test]
    fn shipped_knowledge_base_scans_cleanly() {
        let source = std::fs::read_to_string(shipped_knowledge_base()).expect("read kb");
        let outcome = parse_expressions(&source);
        assert!(outcome.warning.is_none());
        assert!(outcome.expressions.len() > 50);
    }
}

// =============================================================================
// TIER T1: ISOLATED LOADING
// =============================================================================

mod t1_isolated_loading {
    use super::*;

    /// T1.1: One bad expression does not stop the rest.
    #[test]
    fn bad_expression_is_isolated() {
        let mut session = KnowledgeSession::new();
        let report = session.load_source("(causes A B)\n(oops \"unterminated)\n(causes C D)");

        assert_eq!(report.loaded_count(), 2);
        assert_eq!(report.errors.len(), 1);
        assert!(session.contains("(causes A B)"));
        assert!(session.contains("(causes C D)"));
    }

    /// T1.2: Loading the same expression twice is harmless.
    #[test]
    fn double_load_is_idempotent() {
        let mut session = KnowledgeSession::new();
        session.load_source("(causes Flu Fever)");
        let report = session.load_source("(causes Flu Fever)");

        assert!(report.errors.is_empty());
        assert_eq!(session.fact_count(), 1);
        assert_eq!(session.query("(causes $c Fever)").facts, vec!["Flu"]);
    }

    /// T1.3: A missing file is fatal to initialization.
    #[test]
    fn missing_file_is_fatal() {
        let result = KnowledgeSession::open("does/not/exist.metta");
        assert!(matches!(result, Err(KnowledgeError::SourceNotFound(_))));
    }

    /// T1.4: The shipped knowledge base loads without rejected expressions.
    #[test]
    fn shipped_knowledge_base_loads() {
        let (session, report) = KnowledgeSession::open(shipped_knowledge_base()).expect("open");
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(session.fact_count(), report.loaded_count() - report.duplicates);
    }

    /// T1.5: The store only grows.
    #[test]
    fn store_never_shrinks() {
        let mut session = KnowledgeSession::new();
        session.load_source("(a 1) (a 2)");
        let before = session.engine().atom_count();

        let _ = session.add_fact("(broken");
        let _ = session.add_fact("(a 3)");
        assert!(session.engine().atom_count() >= before);
    }
}

// =============================================================================
// TIER T2: QUERY ROUND-TRIP
// =============================================================================

mod t2_query_round_trip {
    use super::*;

    fn medical() -> KnowledgeSession {
        KnowledgeSession::open(shipped_knowledge_base())
            .expect("open")
            .0
    }

    /// T2.1: A loaded fact is retrievable by its predicate and arguments.
    #[test]
    fn loaded_fact_is_retrievable() {
        let mut session = KnowledgeSession::new();
        session.add_fact("(causes LongCovid ChestPain)").expect("add");

        let outcome = session.query("(causes $condition ChestPain)");
        assert!(outcome.found);
        assert_eq!(outcome.facts, vec!["LongCovid"]);
    }

    /// T2.2: Rule-based queries over the shipped knowledge base.
    #[test]
    fn get_causes_chest_pain() {
        let outcome = medical().query("(getCauses ChestPain)");
        assert_eq!(
            outcome.facts,
            vec!["HeartAttack", "Angina", "Anxiety", "Pneumonia"]
        );
    }

    #[test]
    fn get_treatment_malaria() {
        assert_eq!(medical().query("(getTreatment Malaria)").facts, vec!["Antimalarials"]);
    }

    #[test]
    fn explain_cause_returns_mechanism() {
        let outcome = medical().query("(explain-cause HeartAttack ChestPain)");
        assert!(outcome.found);
        assert_eq!(
            outcome.facts,
            vec!["a blocked coronary artery starves the heart muscle of oxygen"]
        );
    }

    /// T2.3: Learned facts join rule results.
    #[test]
    fn learned_fact_joins_rule_results() {
        let mut session = medical();
        session.add_fact("(causes LongCovid ChestPain)").expect("add");
        let facts = session.query("(getCauses ChestPain)").facts;
        assert_eq!(facts.last().map(String::as_str), Some("LongCovid"));
    }

    /// T2.4: Unknown symptom yields the placeholder, not an empty list.
    #[test]
    fn unknown_symptom_placeholder() {
        let outcome = medical().query("(getCauses UnknownSymptom)");
        assert_eq!(outcome.facts, vec!["No result for (getCauses UnknownSymptom)"]);
    }

    /// T2.5: Malformed queries return normally with one error item.
    #[test]
    fn malformed_queries_degrade() {
        let session = medical();
        for raw in ["getCauses ChestPain", "(getCauses ChestPain", "(getCauses $)", ""] {
            let outcome = session.query(raw);
            assert!(!outcome.success, "{:?}", raw);
            assert_eq!(outcome.facts.len(), 1);
            assert!(outcome.facts[0].starts_with("Error:"));
        }
    }

    /// T2.6: Runaway rules are bounded.
    #[test]
    fn runaway_rule_is_bounded() {
        let mut session = KnowledgeSession::new();
        session.add_fact("(= (forever $x) (forever (again $x)))").expect("add");
        let outcome = session.query("(forever A)");
        assert!(!outcome.success);
        assert!(outcome.facts[0].contains("depth"));
    }
}

// =============================================================================
// TIER T3: RESULT NORMALIZATION
// =============================================================================

mod t3_normalization {
    use super::*;

    /// T3.1: List-like text renderings are unwrapped.
    #[test]
    fn bracket_list_unwraps() {
        let outcome = normalize("(getCauses ChestPain)", Ok(vec![RawResult::Text("[A, B, C]".into())]));
        assert_eq!(outcome.facts, vec!["A", "B", "C"]);
    }

    /// T3.2: No result item is ever wrapped in brackets or parentheses.
    #[test]
    fn items_are_never_wrapped() {
        let mut session = KnowledgeSession::new();
        session.load_source("(causes A B) (causes C B) (pair X Y)");
        for query in ["(causes $c B)", "(collapse (causes $c B))", "(pair $a $b)"] {
            for fact in session.query(query).facts {
                assert!(!fact.starts_with('[') && !fact.starts_with('('), "{}", fact);
            }
        }
    }

    /// T3.3: Collapse produces the same facts in the same order.
    #[test]
    fn collapse_matches_plain_results() {
        let mut session = KnowledgeSession::new();
        session.load_source("(symptom Flu Fever) (symptom Flu Cough)");
        assert_eq!(
            session.query("(collapse (symptom Flu $s))").facts,
            session.query("(symptom Flu $s)").facts
        );
    }

    /// T3.4: The normalizer works with any engine output, including an empty one.
    #[test]
    fn empty_engine_output_is_placeholder() {
        let space = Space::new();
        let atom = space.parse_atom("(getCauses X)").expect("parse");
        let results = space.evaluate(&atom).expect("evaluate");
        let outcome = normalize("(getCauses X)", Ok(results));
        assert_eq!(outcome.facts, vec!["No result for (getCauses X)"]);
    }
}
