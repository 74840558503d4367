//! # Parser Module
//!
//! Source scanning for MeTTa-style knowledge files.
//!
//! - Strip `;` line comments
//! - Flatten lines so expressions may wrap freely
//! - Emit balanced top-level `( ... )` groups in source order
//! - Skip stray top-level tokens; stop with a warning on truncation
//!
//! The scanner only counts parentheses. It knows nothing about atoms,
//! strings or variables; that is the fact store's job.

use crate::primitives::{COMMENT_MARKER, WARNING_PREVIEW_LENGTH};
use crate::types::{Expression, ParseWarning, preview};

/// Everything the scanner produced for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Complete expressions, in source order.
    pub expressions: Vec<Expression>,
    /// Set when the source ended inside an expression.
    pub warning: Option<ParseWarning>,
}

/// Remove line comments and join the remaining text with single spaces.
///
/// Returns the flat buffer and the buffer offset at which each source line starts.
fn flatten(source: &str) -> (String, Vec<usize>) {
    let mut buffer = String::with_capacity(source.len());
    let mut line_starts = Vec::new();

    for (index, line) in source.lines().enumerate() {
        if index > 0 {
            buffer.push(' ');
        }
        line_starts.push(buffer.len());
        let code = line
            .find(COMMENT_MARKER)
            .map_or(line, |cut| &line[..cut])
            .trim_end();
        buffer.push_str(code);
    }

    (buffer, line_starts)
}

/// Lazy scanner over the top-level expressions of a source.
///
/// The scanner is restartable: `restart()` rewinds it, and clones scan
/// independently.
#[derive(Debug, Clone)]
pub struct ExpressionScanner {
    buffer: String,
    line_starts: Vec<usize>,
    cursor: usize,
    warning: Option<ParseWarning>,
}

impl ExpressionScanner {
    /// Prepare a scanner for `source`. No scanning happens until iteration.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let (buffer, line_starts) = flatten(source);
        Self {
            buffer,
            line_starts,
            cursor: 0,
            warning: None,
        }
    }

    /// Rewind to the start of the source and clear any warning.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.warning = None;
    }

    /// The structural warning, once the scan has hit a truncated expression.
    #[must_use]
    pub fn warning(&self) -> Option<&ParseWarning> {
        self.warning.as_ref()
    }

    /// The comment-stripped, single-line buffer being scanned.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Map a buffer offset back to its 1-based source line.
    fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index.max(1),
        }
    }

    /// Find the byte offset of the `)` closing the `(` at `start`.
    fn matching_close(&self, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, byte) in self.buffer.bytes().enumerate().skip(start) {
            match byte {
                b'(' => depth += 1,
                b')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(offset);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl Iterator for ExpressionScanner {
    type Item = Expression;

    fn next(&mut self) -> Option<Expression> {
        let bytes = self.buffer.as_bytes();

        while self.cursor < bytes.len() {
            let byte = bytes[self.cursor];

            if byte.is_ascii_whitespace() {
                self.cursor += 1;
                continue;
            }

            if byte != b'(' {
                // Not a legal top-level token; skip it.
                self.cursor += 1;
                continue;
            }

            let start = self.cursor;
            match self.matching_close(start) {
                Some(end) => {
                    self.cursor = end + 1;
                    return Some(Expression::new(&self.buffer[start..=end]));
                }
                None => {
                    self.warning = Some(ParseWarning {
                        offset: start,
                        line: self.line_of(start),
                        preview: preview(&self.buffer[start..], WARNING_PREVIEW_LENGTH),
                    });
                    self.cursor = bytes.len();
                    return None;
                }
            }
        }

        None
    }
}

/// Scan `source` to completion.
#[must_use]
pub fn parse_expressions(source: &str) -> ParseOutcome {
    let mut scanner = ExpressionScanner::new(source);
    let expressions: Vec<Expression> = scanner.by_ref().collect();
    ParseOutcome {
        expressions,
        warning: scanner.warning,
    }
}

/// First complete expression in `text`, if any.
///
/// Used to pull a query or a fact out of free-form model output.
#[must_use]
pub fn first_expression(text: &str) -> Option<Expression> {
    ExpressionScanner::new(text).next()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(outcome: &ParseOutcome) -> Vec<&str> {
        outcome.expressions.iter().map(Expression::as_str).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        let outcome = parse_expressions("");
        assert!(outcome.expressions.is_empty());
        assert!(outcome.warning.is_none());
    }

    #[test]
    fn expressions_in_source_order() {
        let outcome = parse_expressions("(causes A B)\n(symptom Flu Fever)");
        assert_eq!(texts(&outcome), vec!["(causes A B)", "(symptom Flu Fever)"]);
    }

    #[test]
    fn comment_is_stripped() {
        let outcome = parse_expressions("(causes A B) ; comment here");
        assert_eq!(texts(&outcome), vec!["(causes A B)"]);
    }

    #[test]
    fn comment_marker_ends_line_even_inside_string() {
        let outcome = parse_expressions("(note A \"x;y\")");
        // The `;` cuts the line, leaving an unterminated expression.
        assert!(outcome.expressions.is_empty());
        assert!(outcome.warning.is_some());
    }

    #[test]
    fn expression_may_span_lines() {
        let source = "(= (getCauses $s)\n   (match &self (causes $c $s) $c))";
        let outcome = parse_expressions(source);
        assert_eq!(
            texts(&outcome),
            vec!["(= (getCauses $s) (match &self (causes $c $s) $c))"]
        );
    }

    #[test]
    fn nested_depth_is_supported() {
        let outcome = parse_expressions("(a (b (c (d (e)))))");
        assert_eq!(texts(&outcome), vec!["(a (b (c (d (e)))))"]);
    }

    #[test]
    fn stray_tokens_are_skipped() {
        let outcome = parse_expressions("junk (causes A B) ) more (x)");
        assert_eq!(texts(&outcome), vec!["(causes A B)", "(x)"]);
        assert!(outcome.warning.is_none());
    }

    #[test]
    fn unbalanced_tail_is_reported() {
        let source = "(causes Flu Fever)\n(causes HeartAttack ChestPain";
        let outcome = parse_expressions(source);
        assert_eq!(texts(&outcome), vec!["(causes Flu Fever)"]);

        let warning = outcome.warning.expect("warning");
        assert_eq!(warning.offset, 19);
        assert_eq!(warning.line, 2);
        assert_eq!(warning.preview, "(causes HeartAttack ChestPain");
    }

    #[test]
    fn scan_stops_at_truncation() {
        let outcome = parse_expressions("(a (b) (c)");
        assert!(outcome.expressions.is_empty());
        assert_eq!(outcome.warning.map(|w| w.offset), Some(0));
    }

    #[test]
    fn scanner_is_lazy_and_restartable() {
        let mut scanner = ExpressionScanner::new("(a) (b) (c)");
        assert_eq!(scanner.next().map(|e| e.to_string()), Some("(a)".to_string()));

        let rest: Vec<String> = scanner.clone().map(|e| e.to_string()).collect();
        assert_eq!(rest, vec!["(b)", "(c)"]);

        scanner.restart();
        assert_eq!(scanner.count(), 3);
    }

    #[test]
    fn first_expression_ignores_surrounding_prose() {
        let text = "Sure! The query is: (getCauses ChestPain) hope this helps";
        assert_eq!(
            first_expression(text).map(|e| e.to_string()),
            Some("(getCauses ChestPain)".to_string())
        );
        assert!(first_expression("no parentheses here").is_none());
    }

    #[test]
    fn trailing_whitespace_before_comment_is_trimmed() {
        let scanner = ExpressionScanner::new("(a)   ; c\n(b)");
        assert_eq!(scanner.buffer(), "(a) (b)");
    }
}
