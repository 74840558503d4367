//! # Application Errors
//!
//! Errors surfaced by the MediBot binary. Query-path failures never appear
//! here; the knowledge session degrades them to text.

use crate::assistant::ClientError;
use medibot_core::KnowledgeError;
use thiserror::Error;

/// Errors that abort a CLI command.
#[derive(Debug, Error)]
pub enum AppError {
    /// The knowledge layer failed to initialize.
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// The configuration file or an override is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request was missing required input.
    #[error("{0}")]
    InvalidInput(String),

    /// The language model could not be reached.
    #[error("Language model error: {0}")]
    LanguageModel(#[from] ClientError),

    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
