//! # Normalizer Module
//!
//! Flattens raw query results into displayable fact strings.
//!
//! - Values are kept, trimmed
//! - Terms and echoes of the query carry nothing new and are dropped
//! - Collections are flattened in order
//! - Untyped text is sniffed: `[A, B, C]` becomes `A`, `B`, `C`
//!
//! The caller turns an empty list into the placeholder; see `QueryOutcome`.

use crate::{KnowledgeError, QueryOutcome, RawResult};

/// Normalize the result of evaluating `query`.
///
/// Never returns an empty fact list and never fails: evaluation errors
/// become a single error item.
#[must_use]
pub fn normalize(query: &str, results: Result<Vec<RawResult>, KnowledgeError>) -> QueryOutcome {
    match results {
        Ok(results) => QueryOutcome::from_facts(query, flatten(query, &results)),
        Err(e) => QueryOutcome::error(query, &e),
    }
}

/// Apply the per-result policy to every result, preserving order.
#[must_use]
pub fn flatten(query: &str, results: &[RawResult]) -> Vec<String> {
    let mut facts = Vec::new();
    for result in results {
        push_result(query, result, &mut facts);
    }
    facts
}

fn push_result(query: &str, result: &RawResult, facts: &mut Vec<String>) {
    match result {
        RawResult::Value(value) => push_value(query, value, facts),
        RawResult::Term(_) => {}
        RawResult::Collection(items) => {
            for item in items {
                push_result(query, item, facts);
            }
        }
        RawResult::Text(text) => {
            if looks_like_list(text) {
                facts.extend(list_items(text));
            } else if !text.trim_start().starts_with('(') {
                push_value(query, text, facts);
            }
        }
    }
}

fn push_value(query: &str, value: &str, facts: &mut Vec<String>) {
    let value = value.trim();
    if value.is_empty() || value == query.trim() {
        return;
    }
    facts.push(value.to_string());
}

/// A bracketed list rendering such as `[A, B, C]`.
///
/// Any text opening with `[` counts, including `[A]` and a cut-off `[A, B`,
/// so a result item never keeps a bracket.
fn looks_like_list(text: &str) -> bool {
    text.trim_start().starts_with('[')
}

/// Every maximal run of word characters inside a list rendering.
fn list_items(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|run| !run.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawResult {
        RawResult::Text(s.to_string())
    }

    #[test]
    fn list_text_is_unwrapped() {
        let facts = flatten("(getCauses ChestPain)", &[text("[A, B, C]")]);
        assert_eq!(facts, vec!["A", "B", "C"]);
    }

    #[test]
    fn single_item_list_loses_brackets() {
        let facts = flatten("(getCauses ChestPain)", &[text("[HeartAttack]")]);
        assert_eq!(facts, vec!["HeartAttack"]);
    }

    #[test]
    fn unterminated_list_loses_bracket() {
        let facts = flatten("(q)", &[text("[x"), text("[Fever, Cough")]);
        assert_eq!(facts, vec!["x", "Fever", "Cough"]);
    }

    #[test]
    fn empty_list_yields_nothing() {
        assert!(flatten("(q)", &[text("[]")]).is_empty());
    }

    #[test]
    fn plain_text_is_kept_trimmed() {
        let facts = flatten("(getTreatment Flu)", &[text("  Rest  ")]);
        assert_eq!(facts, vec!["Rest"]);
    }

    #[test]
    fn echoed_query_and_terms_are_dropped() {
        let query = "(getCauses Unknown)";
        let facts = flatten(
            query,
            &[
                text(query),
                text("(causes A B)"),
                RawResult::Term("(x y)".to_string()),
            ],
        );
        assert!(facts.is_empty());
    }

    #[test]
    fn collection_flattens_in_order_without_dedup() {
        let facts = flatten(
            "(q)",
            &[RawResult::Collection(vec![
                RawResult::Value("Fever".to_string()),
                RawResult::Term("(t)".to_string()),
                RawResult::Value("Fever".to_string()),
                RawResult::Collection(vec![RawResult::Value("Cough".to_string())]),
            ])],
        );
        assert_eq!(facts, vec!["Fever", "Fever", "Cough"]);
    }

    #[test]
    fn empty_result_becomes_placeholder() {
        let outcome = normalize("(getCauses UnknownSymptom)", Ok(Vec::new()));
        assert_eq!(outcome.facts, vec!["No result for (getCauses UnknownSymptom)"]);
        assert!(outcome.success);
        assert!(!outcome.found);
    }

    #[test]
    fn error_becomes_single_item() {
        let outcome = normalize("(q)", Err(KnowledgeError::BudgetExceeded(10)));
        assert_eq!(outcome.facts, vec!["Error: Evaluation exceeded 10 steps"]);
        assert!(!outcome.success);
    }
}
