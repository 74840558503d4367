//! # Configuration
//!
//! Settings for the MediBot binary.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `medibot.toml` in the working directory)
//! 3. Environment variables
//! 4. CLI flags (`--knowledge`)
//!
//! ## Environment Variables
//!
//! - `MEDIBOT_KNOWLEDGE`: knowledge file path
//! - `MEDIBOT_QUERY_TIMEOUT_MS`: per-query timeout
//! - `MEDIBOT_LLM_URL`: OpenAI-compatible API base URL
//! - `MEDIBOT_LLM_MODEL`: model name
//! - `GROQ_API_KEY` or `MEDIBOT_API_KEY`: bearer token for the model API

use crate::AppError;
use medibot_core::primitives::DEFAULT_KNOWLEDGE_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "medibot.toml";

/// Number of history turns included in an answer prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

// =============================================================================
// SETTINGS
// =============================================================================

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Knowledge base loaded at startup.
    pub knowledge_file: PathBuf,
    /// Upper bound on a single query's evaluation time.
    pub query_timeout_ms: u64,
    /// Most recent history turns included in an answer prompt.
    pub history_window: usize,
    /// Language-model settings.
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            knowledge_file: PathBuf::from(DEFAULT_KNOWLEDGE_FILE),
            query_timeout_ms: 2000,
            history_window: DEFAULT_HISTORY_WINDOW,
            llm: LlmSettings::default(),
        }
    }
}

/// Language-model adapter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub answer_max_tokens: u32,
    pub translate_max_tokens: u32,
    pub suggest_max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            temperature: 0.3,
            api_key: None,
            answer_max_tokens: 256,
            translate_max_tokens: 64,
            suggest_max_tokens: 64,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load settings from `path`, or from `medibot.toml` if present, or defaults.
    ///
    /// An explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.is_file() {
            if required {
                return Err(AppError::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        tracing::debug!("Read configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MEDIBOT_KNOWLEDGE") {
            self.knowledge_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup("MEDIBOT_QUERY_TIMEOUT_MS") {
            self.query_timeout_ms = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("MEDIBOT_QUERY_TIMEOUT_MS is not a number: {}", raw))
            })?;
        }
        if let Some(url) = lookup("MEDIBOT_LLM_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("MEDIBOT_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = lookup("MEDIBOT_API_KEY").or_else(|| lookup("GROQ_API_KEY")) {
            self.llm.api_key = Some(key).filter(|k| !k.is_empty());
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), AppError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }
}

// =============================================================================
// TESTS
// =============================================================================
