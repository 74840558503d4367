//! # Assistant
//!
//! Conversation glue between the user, the language model and the knowledge
//! session.
//!
//! ## Ask Flow
//!
//! ```text
//! question ─► translator prompt ─► LanguageModel ─► first expression
//!          ─► KnowledgeSession::query ─► facts_used (+ escalation)
//!          ─► answer prompt (recent history) ─► LanguageModel ─► answer
//! ```
//!
//! The session is shared behind a `RwLock`: `learn` is the only writer.
//! Queries run on the blocking pool under a timeout.

mod client;
mod conversation;
pub mod explain;
pub mod prompts;
pub mod safety;
mod types;

pub use client::{ChatClient, ClientError, LanguageModel, SYSTEM_MESSAGE};
pub use conversation::{Conversation, Role, Turn};
pub use types::{Answer, Confidence, Explanation, LearnResponse, Suggestion};

use crate::AppError;
use crate::config::{DEFAULT_HISTORY_WINDOW, Settings};
use medibot_core::{KnowledgeError, KnowledgeSession, QueryOutcome, first_expression};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Knowledge session shared between tasks.
pub type SharedKnowledge = Arc<RwLock<KnowledgeSession>>;

pub const EMPTY_QUESTION: &str = "Please ask a question.";
pub const NOT_UNDERSTOOD: &str =
    "I didn't understand your question. Try asking about causes, symptoms, or treatments of a condition.";
pub const NO_VALID_QUERY: &str = "No valid query generated.";
pub const NOT_FOUND: &str = "Not found in knowledge base.";
pub const SUGGESTION_PROMPT: &str = "Would you like to add this to the knowledge base?";
pub const SUGGESTION_FAILED: &str = "Could not extract a valid MeTTa fact. Try rephrasing.";
pub const NO_INPUT: &str = "No input provided.";
pub const NO_FACT: &str = "No fact provided";

// =============================================================================
// OPTIONS
// =============================================================================

/// Tunables of the assistant, taken from `Settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantOptions {
    pub history_window: usize,
    pub query_timeout: Duration,
    pub answer_max_tokens: u32,
    pub translate_max_tokens: u32,
    pub suggest_max_tokens: u32,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            query_timeout: Duration::from_millis(2000),
            answer_max_tokens: 256,
            translate_max_tokens: 64,
            suggest_max_tokens: 64,
        }
    }
}

impl From<&Settings> for AssistantOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            history_window: settings.history_window,
            query_timeout: Duration::from_millis(settings.query_timeout_ms),
            answer_max_tokens: settings.llm.answer_max_tokens,
            translate_max_tokens: settings.llm.translate_max_tokens,
            suggest_max_tokens: settings.llm.suggest_max_tokens,
        }
    }
}

// =============================================================================
// QUERY EXECUTION
// =============================================================================

/// Run a structured query against shared knowledge, bounded by `timeout`.
///
/// Waiting for a writer counts toward the timeout. Never fails: a timeout
/// becomes a single `Error: ...` item like any other query error.
///
/// The blocking evaluation cannot be cancelled from here, so it carries the
/// same deadline and stops itself, releasing its read guard for writers.
pub async fn run_query(knowledge: &SharedKnowledge, text: &str, timeout: Duration) -> QueryOutcome {
    let shared = Arc::clone(knowledge);
    let owned = text.to_string();
    let deadline = Instant::now().checked_add(timeout);
    let work = async move {
        let guard = shared.read_owned().await;
        tokio::task::spawn_blocking(move || match deadline {
            Some(deadline) => guard.query_until(&owned, deadline),
            None => guard.query(&owned),
        })
        .await
    };

    match tokio::time::timeout(timeout, work).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => {
            QueryOutcome::error(text.trim(), &KnowledgeError::Evaluation(join_error.to_string()))
        }
        Err(_) => {
            let error = KnowledgeError::Timeout(timeout.as_millis() as u64);
            tracing::warn!(query = %text.trim(), "{}", error);
            QueryOutcome::error(text.trim(), &error)
        }
    }
}

/// Facts as shown to the language model: joined, or a not-found notice.
#[must_use]
pub fn describe_facts(outcome: &QueryOutcome) -> String {
    if outcome.success && !outcome.found {
        NOT_FOUND.to_string()
    } else {
        outcome.facts.join(", ")
    }
}

// =============================================================================
// ASSISTANT
// =============================================================================

/// One conversation with the assistant.
pub struct Assistant<M: LanguageModel> {
    knowledge: SharedKnowledge,
    model: M,
    history: Conversation,
    options: AssistantOptions,
}

impl<M: LanguageModel> Assistant<M> {
    /// Create an assistant with an empty history.
    pub fn new(knowledge: SharedKnowledge, model: M, options: AssistantOptions) -> Self {
        Self {
            knowledge,
            model,
            history: Conversation::new(),
            options,
        }
    }

    #[must_use]
    pub fn history(&self) -> &Conversation {
        &self.history
    }

    #[must_use]
    pub fn knowledge(&self) -> &SharedKnowledge {
        &self.knowledge
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn options(&self) -> &AssistantOptions {
        &self.options
    }

    /// Run a structured query under the configured timeout.
    pub async fn query(&self, text: &str) -> QueryOutcome {
        run_query(&self.knowledge, text, self.options.query_timeout).await
    }

    /// Answer a natural-language question.
    pub async fn ask(&mut self, question: &str) -> Answer {
        let question = question.trim();
        if question.is_empty() {
            return Answer {
                question: String::new(),
                query: None,
                facts_used: String::new(),
                answer: EMPTY_QUESTION.to_string(),
            };
        }

        self.history.push(Role::User, question);

        let query = self.translate(question).await;
        let (facts_used, answer) = match &query {
            None => (NO_VALID_QUERY.to_string(), NOT_UNDERSTOOD.to_string()),
            Some(query) => {
                let outcome = self.query(query).await;
                let facts = if outcome.success {
                    safety::escalate(describe_facts(&outcome))
                } else {
                    describe_facts(&outcome)
                };
                let prompt = prompts::answer(
                    &self.history.render(self.options.history_window),
                    question,
                    &facts,
                );
                let answer = match self
                    .model
                    .complete(&prompt, self.options.answer_max_tokens)
                    .await
                {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Answer generation failed: {}", e);
                        format!("Error calling language model: {}", e)
                    }
                };
                (facts, answer)
            }
        };

        let answer = answer.trim().to_string();
        self.history.push(Role::Bot, answer.clone());

        Answer {
            question: question.to_string(),
            query,
            facts_used,
            answer,
        }
    }

    /// Translate a question to a query, if the model produced a usable one.
    async fn translate(&self, question: &str) -> Option<String> {
        let output = match self
            .model
            .complete(&prompts::translation(question), self.options.translate_max_tokens)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Query translation failed: {}", e);
                return None;
            }
        };

        if output.contains("Error") || output.contains("Unknown") {
            tracing::info!("Translator declined: {}", output);
            return None;
        }
        let query = first_expression(&output).map(|e| e.to_string());
        if let Some(ref q) = query {
            tracing::info!("Translated question to {}", q);
        }
        query
    }

    /// Add a fact to the knowledge base.
    pub async fn learn(&self, fact: &str) -> Result<LearnResponse, AppError> {
        let fact = fact.trim();
        if fact.is_empty() {
            return Err(AppError::InvalidInput(NO_FACT.to_string()));
        }

        let mut session = self.knowledge.write().await;
        let status = match session.add_fact(fact) {
            Ok(_) => "Learned".to_string(),
            Err(e) => {
                tracing::warn!("Failed to learn {}: {}", fact, e);
                format!("Failed to learn: {}", e)
            }
        };
        Ok(LearnResponse {
            status,
            fact: fact.to_string(),
        })
    }

    /// Propose a fact extracted from a free-text statement.
    pub async fn suggest_fact(&self, statement: &str) -> Suggestion {
        let statement = statement.trim();
        if statement.is_empty() {
            return Suggestion {
                suggestion: None,
                message: NO_INPUT.to_string(),
            };
        }

        let suggestion = match self
            .model
            .complete(&prompts::suggestion(statement), self.options.suggest_max_tokens)
            .await
        {
            Ok(output) => first_expression(&output).map(|e| e.to_string()),
            Err(e) => {
                tracing::warn!("Fact suggestion failed: {}", e);
                None
            }
        };

        let message = if suggestion.is_some() {
            SUGGESTION_PROMPT
        } else {
            SUGGESTION_FAILED
        };
        Suggestion {
            suggestion,
            message: message.to_string(),
        }
    }

    /// Explain a `causes` fact.
    pub async fn explain(&self, fact: &str) -> Explanation {
        let session = self.knowledge.read().await;
        explain::explain(&session, fact)
    }
}

// =============================================================================
// TESTS
// =============================================================================
