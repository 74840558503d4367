//! # Loader Module
//!
//! Knowledge ingestion protocol for the MediBot fact store.
//!
//! - Scan the source into balanced expressions
//! - Register each expression independently
//! - Report, never abort on, a rejected expression
//! - A missing or oversized source file is fatal

use crate::parser::ExpressionScanner;
use crate::primitives::{LOG_PREVIEW_LENGTH, MAX_EXPRESSION_LENGTH, MAX_SOURCE_SIZE};
use crate::space::ReasoningEngine;
use crate::types::preview;
use crate::{Expression, ExpressionError, KnowledgeError, LoadReport};
use std::path::Path;

/// Whether an accepted expression was new to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    AlreadyPresent,
}

/// The Loader moves expressions from source text into a reasoning engine.
pub struct Loader;

impl Loader {
    /// Register one scanned expression with `engine`.
    pub fn register<E: ReasoningEngine>(
        engine: &mut E,
        expression: &Expression,
    ) -> Result<Registration, KnowledgeError> {
        if expression.len() > MAX_EXPRESSION_LENGTH {
            return Err(KnowledgeError::syntax(
                expression.preview(LOG_PREVIEW_LENGTH),
                format!(
                    "expression length {} exceeds maximum {} bytes",
                    expression.len(),
                    MAX_EXPRESSION_LENGTH
                ),
            ));
        }

        let atom = engine.parse_atom(expression.as_str())?;
        if engine.add_atom(atom)? {
            Ok(Registration::Added)
        } else {
            Ok(Registration::AlreadyPresent)
        }
    }

    /// Load every expression of `source` into `engine`.
    ///
    /// Rejected expressions are logged and listed in the report; loading
    /// continues with the next one.
    pub fn load_str<E: ReasoningEngine>(engine: &mut E, source: &str) -> LoadReport {
        let mut scanner = ExpressionScanner::new(source);
        let mut report = LoadReport::default();

        for expression in scanner.by_ref() {
            match Self::register(engine, &expression) {
                Ok(registration) => {
                    tracing::debug!("Loaded: {}", expression.preview(LOG_PREVIEW_LENGTH));
                    if registration == Registration::AlreadyPresent {
                        report.duplicates += 1;
                    }
                    report.loaded.push(expression);
                }
                Err(e) => {
                    tracing::warn!(
                        expression = %expression.preview(LOG_PREVIEW_LENGTH),
                        error = %e,
                        "Error parsing expression"
                    );
                    report.errors.push(ExpressionError {
                        expression: expression.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(warning) = scanner.warning() {
            tracing::warn!("{}", warning);
            report.warning = Some(warning.clone());
        }

        tracing::info!(
            loaded = report.loaded_count(),
            failed = report.errors.len(),
            "Loaded {} expressions",
            report.loaded_count()
        );
        report
    }

    /// Load a knowledge file into `engine`.
    ///
    /// Fails if the file is missing, unreadable or larger than `MAX_SOURCE_SIZE`.
    pub fn load_file<E: ReasoningEngine>(
        engine: &mut E,
        path: impl AsRef<Path>,
    ) -> Result<LoadReport, KnowledgeError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(KnowledgeError::SourceNotFound(path.to_path_buf()));
        }

        let size = std::fs::metadata(path)
            .map_err(|e| KnowledgeError::Io(format!("{}: {}", path.display(), e)))?
            .len();
        if size > MAX_SOURCE_SIZE {
            return Err(KnowledgeError::SourceTooLarge {
                size,
                limit: MAX_SOURCE_SIZE,
            });
        }

        let source = std::fs::read_to_string(path)
            .map_err(|e| KnowledgeError::Io(format!("{}: {}", path.display(), e)))?;

        tracing::info!("Loading knowledge from {}", path.display());
        Ok(Self::load_str(engine, &source))
    }

    /// Ingest a single expression supplied at runtime.
    ///
    /// The text must hold exactly one balanced expression.
    pub fn add_fact<E: ReasoningEngine>(
        engine: &mut E,
        text: &str,
    ) -> Result<(Expression, Registration), KnowledgeError> {
        let text = text.trim();
        let mut scanner = ExpressionScanner::new(text);
        let expression = match scanner.next() {
            Some(expression) if expression.len() == text.len() => expression,
            _ => {
                return Err(KnowledgeError::syntax(
                    preview(text, LOG_PREVIEW_LENGTH),
                    "expected exactly one balanced expression",
                ));
            }
        };

        let registration = Self::register(engine, &expression)?;
        tracing::info!("Learned: {}", expression.preview(LOG_PREVIEW_LENGTH));
        Ok((expression, registration))
    }
}

// =============================================================================
// TESTS
// =============================================================================
