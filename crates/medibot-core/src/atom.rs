//! # Atom Module
//!
//! The in-process fact store's internal representation of expressions.
//!
//! An atom is one of:
//! - a symbol: `HeartAttack`, `causes`, `&self`, `=`
//! - a variable: `$symptom`
//! - a string literal: `"rest and fluids"`
//! - an expression: `(causes HeartAttack ChestPain)`
//!
//! The atom grammar is stricter than the source scanner: it rejects stray
//! parentheses, unterminated strings and nameless variables. Nesting is
//! capped at `MAX_NESTING_DEPTH`, which keeps every recursive walk over an
//! atom (display, matching, drop) within a thread's stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::KnowledgeError;
use crate::primitives::MAX_NESTING_DEPTH;

/// Variable bindings produced by pattern matching, keyed by variable name.
pub type Bindings = BTreeMap<String, Atom>;

/// A node of the atom tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Atom {
    Symbol(String),
    Variable(String),
    Str(String),
    Expression(Vec<Atom>),
}

impl Atom {
    /// Symbol helper.
    #[must_use]
    pub fn sym(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Variable helper (name without the `$`).
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Expression helper.
    #[must_use]
    pub fn expr(children: Vec<Atom>) -> Self {
        Self::Expression(children)
    }

    /// Parse exactly one atom from `text`.
    pub fn parse(text: &str) -> Result<Self, KnowledgeError> {
        let tokens = tokenize(text).map_err(|reason| KnowledgeError::syntax(text, reason))?;
        let mut cursor = 0;
        let atom = read_atom(&tokens, &mut cursor).map_err(|r| KnowledgeError::syntax(text, r))?;
        if cursor != tokens.len() {
            return Err(KnowledgeError::syntax(
                text,
                "expected a single expression, found trailing input",
            ));
        }
        Ok(atom)
    }

    /// Children of an expression, or `None` for leaves.
    #[must_use]
    pub fn children(&self) -> Option<&[Atom]> {
        match self {
            Self::Expression(children) => Some(children),
            _ => None,
        }
    }

    /// Name of the symbol at the head of an expression.
    #[must_use]
    pub fn head_symbol(&self) -> Option<&str> {
        match self.children()?.first()? {
            Self::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// True if the atom contains no variables.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Variable(_) => false,
            Self::Expression(children) => children.iter().all(Self::is_ground),
            Self::Symbol(_) | Self::Str(_) => true,
        }
    }

    /// Distinct variable names in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Self::Variable(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Self::Expression(children) => {
                for child in children {
                    child.collect_variables(names);
                }
            }
            Self::Symbol(_) | Self::Str(_) => {}
        }
    }

    /// Node count and nesting depth. A leaf has depth 0.
    #[must_use]
    pub fn extent(&self) -> (usize, usize) {
        match self {
            Self::Expression(children) => {
                children.iter().fold((1, 1), |(size, depth), child| {
                    let (child_size, child_depth) = child.extent();
                    (size + child_size, depth.max(child_depth + 1))
                })
            }
            Self::Symbol(_) | Self::Variable(_) | Self::Str(_) => (1, 0),
        }
    }

    /// Replace bound variables with their values.
    #[must_use]
    pub fn instantiate(&self, bindings: &Bindings) -> Self {
        match self {
            Self::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Expression(children) => {
                Self::Expression(children.iter().map(|c| c.instantiate(bindings)).collect())
            }
            Self::Symbol(_) | Self::Str(_) => self.clone(),
        }
    }

    /// `instantiate`, giving up once the result would exceed `max_size`
    /// nodes or `max_depth` levels of nesting.
    ///
    /// Returns the new atom and its node count.
    #[must_use]
    pub fn instantiate_bounded(
        &self,
        bindings: &Bindings,
        max_size: usize,
        max_depth: usize,
    ) -> Option<(Self, usize)> {
        let mut budget = max_size;
        let atom = self.build(bindings, 0, max_depth, &mut budget)?;
        Some((atom, max_size - budget))
    }

    fn build(
        &self,
        bindings: &Bindings,
        level: usize,
        max_depth: usize,
        budget: &mut usize,
    ) -> Option<Self> {
        if let Self::Variable(name) = self
            && let Some(value) = bindings.get(name)
        {
            let (size, depth) = value.extent();
            if level + depth > max_depth {
                return None;
            }
            *budget = budget.checked_sub(size)?;
            return Some(value.clone());
        }

        *budget = budget.checked_sub(1)?;
        match self {
            Self::Expression(children) => {
                if level >= max_depth {
                    return None;
                }
                children
                    .iter()
                    .map(|c| c.build(bindings, level + 1, max_depth, budget))
                    .collect::<Option<Vec<_>>>()
                    .map(Self::Expression)
            }
            Self::Symbol(_) | Self::Variable(_) | Self::Str(_) => Some(self.clone()),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(name) => f.write_str(name),
            Self::Variable(name) => write!(f, "${}", name),
            Self::Str(text) => write!(f, "{:?}", text),
            Self::Expression(children) => {
                f.write_str("(")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

// =============================================================================
// PATTERN MATCHING
// =============================================================================

/// Match `pattern` against `target`, extending `bindings`.
///
/// Variables occur only on the pattern side. A variable already bound must
/// match its previous value structurally. On failure `bindings` may hold
/// partial entries; callers match against a fresh clone.
pub fn match_atom(pattern: &Atom, target: &Atom, bindings: &mut Bindings) -> bool {
    match (pattern, target) {
        (Atom::Variable(name), _) => match bindings.get(name) {
            Some(bound) => bound == target,
            None => {
                bindings.insert(name.clone(), target.clone());
                true
            }
        },
        (Atom::Expression(left), Atom::Expression(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(p, t)| match_atom(p, t, bindings))
        }
        _ => pattern == target,
    }
}

/// Match into fresh bindings.
#[must_use]
pub fn match_fresh(pattern: &Atom, target: &Atom) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    match_atom(pattern, target, &mut bindings).then_some(bindings)
}

// =============================================================================
// TOKENIZER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
    Str(String),
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut depth = 0usize;

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(format!(
                        "nesting deeper than {} levels",
                        MAX_NESTING_DEPTH
                    ));
                }
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                depth = depth.saturating_sub(1);
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => literal.push('\n'),
                            Some('t') => literal.push('\t'),
                            Some(other) => literal.push(other),
                            None => break,
                        },
                        other => literal.push(other),
                    }
                }
                if !closed {
                    return Err("unterminated string literal".to_string());
                }
                tokens.push(Token::Str(literal));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

fn read_atom(tokens: &[Token], cursor: &mut usize) -> Result<Atom, String> {
    let token = tokens
        .get(*cursor)
        .ok_or_else(|| "empty input".to_string())?;
    *cursor += 1;

    match token {
        Token::Close => Err("unexpected ')'".to_string()),
        Token::Str(text) => Ok(Atom::Str(text.clone())),
        Token::Word(word) => match word.strip_prefix('$') {
            Some("") => Err("variable without a name".to_string()),
            Some(name) => Ok(Atom::Variable(name.to_string())),
            None => Ok(Atom::Symbol(word.clone())),
        },
        Token::Open => {
            let mut children = Vec::new();
            loop {
                match tokens.get(*cursor) {
                    None => return Err("missing ')'".to_string()),
                    Some(Token::Close) => {
                        *cursor += 1;
                        break;
                    }
                    Some(_) => children.push(read_atom(tokens, cursor)?),
                }
            }
            if children.is_empty() {
                return Err("empty expression".to_string());
            }
            Ok(Atom::Expression(children))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Atom {
        Atom::parse(text).expect("parse")
    }

    #[test]
    fn parses_nested_expression() {
        let atom = parse("(= (getCauses $s) (match &self (causes $c $s) $c))");
        assert_eq!(atom.head_symbol(), Some("="));
        assert_eq!(atom.variables(), vec!["s", "c"]);
        assert!(!atom.is_ground());
    }

    #[test]
    fn display_is_canonical() {
        let atom = parse("(  treatment   Flu \"rest and fluids\" )");
        assert_eq!(atom.to_string(), "(treatment Flu \"rest and fluids\")");
    }

    #[test]
    fn rejects_malformed_input() {
        for text in ["", "(a b", "a)", "(a) (b)", "(a \"open)", "(a $)", "()"] {
            assert!(
                matches!(Atom::parse(text), Err(KnowledgeError::Syntax { .. })),
                "accepted {:?}",
                text
            );
        }
    }

    #[test]
    fn matching_binds_variables() {
        let pattern = parse("(causes $c ChestPain)");
        let fact = parse("(causes HeartAttack ChestPain)");
        let bindings = match_fresh(&pattern, &fact).expect("match");
        assert_eq!(bindings.get("c"), Some(&Atom::sym("HeartAttack")));
    }

    #[test]
    fn repeated_variable_must_agree() {
        let pattern = parse("(same $x $x)");
        assert!(match_fresh(&pattern, &parse("(same A A)")).is_some());
        assert!(match_fresh(&pattern, &parse("(same A B)")).is_none());
    }

    #[test]
    fn arity_mismatch_does_not_match() {
        let pattern = parse("(causes $c)");
        assert!(match_fresh(&pattern, &parse("(causes A B)")).is_none());
    }

    #[test]
    fn nesting_limit_is_a_syntax_error() {
        let at_limit = format!(
            "{}a{}",
            "(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );
        assert_eq!(parse(&at_limit).extent(), (MAX_NESTING_DEPTH + 1, MAX_NESTING_DEPTH));

        let too_deep = format!("{}a{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            Atom::parse(&too_deep),
            Err(KnowledgeError::Syntax { ref reason, .. }) if reason.contains("nesting")
        ));
    }

    #[test]
    fn extent_counts_nodes_and_depth() {
        assert_eq!(parse("(a (b c) d)").extent(), (6, 2));
        assert_eq!(Atom::sym("x").extent(), (1, 0));
    }

    #[test]
    fn bounded_instantiation_respects_size() {
        let template = parse("(pair $a $a)");
        let mut bindings = Bindings::new();
        bindings.insert("a".to_string(), parse("(x y z)"));

        let (atom, size) = template
            .instantiate_bounded(&bindings, 100, MAX_NESTING_DEPTH)
            .expect("fits");
        assert_eq!(atom.to_string(), "(pair (x y z) (x y z))");
        assert_eq!(size, 10);
        assert!(template.instantiate_bounded(&bindings, 9, MAX_NESTING_DEPTH).is_none());
    }

    #[test]
    fn bounded_instantiation_respects_depth() {
        let template = parse("(wrap $a)");
        let mut bindings = Bindings::new();
        bindings.insert("a".to_string(), parse("((deep))"));
        assert!(template.instantiate_bounded(&bindings, 100, 3).is_some());
        assert!(template.instantiate_bounded(&bindings, 100, 2).is_none());
    }

    #[test]
    fn instantiate_replaces_bound_only() {
        let template = parse("(pair $a $b)");
        let mut bindings = Bindings::new();
        bindings.insert("a".to_string(), Atom::sym("X"));
        assert_eq!(template.instantiate(&bindings).to_string(), "(pair X $b)");
    }
}
