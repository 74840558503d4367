//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::AppError;
use crate::assistant::{
    Answer, Assistant, AssistantOptions, ChatClient, Explanation, LearnResponse, SharedKnowledge,
    Suggestion, explain, run_query,
};
use crate::config::Settings;
use medibot_core::{KnowledgeSession, LoadReport, QueryOutcome};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;

// =============================================================================
// HELPERS
// =============================================================================

/// Load the configured knowledge file.
fn open_knowledge(settings: &Settings) -> Result<(KnowledgeSession, LoadReport), AppError> {
    let (session, report) = KnowledgeSession::open(&settings.knowledge_file)?;
    if let Some(ref warning) = report.warning {
        tracing::warn!("{}", warning);
    }
    if !report.errors.is_empty() {
        tracing::warn!(
            "{} expression(s) rejected from {}",
            report.errors.len(),
            settings.knowledge_file.display()
        );
    }
    Ok((session, report))
}

fn open_shared(settings: &Settings) -> Result<SharedKnowledge, AppError> {
    let (session, _) = open_knowledge(settings)?;
    Ok(Arc::new(RwLock::new(session)))
}

fn build_assistant(settings: &Settings) -> Result<Assistant<ChatClient>, AppError> {
    let knowledge = open_shared(settings)?;
    let client = ChatClient::new(&settings.llm)?;
    Ok(Assistant::new(
        knowledge,
        client,
        AssistantOptions::from(settings),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Load the knowledge base and report the outcome.
pub fn cmd_check(settings: &Settings, json_mode: bool, verbose: bool) -> Result<(), AppError> {
    let (session, report) = open_knowledge(settings)?;

    if json_mode {
        let output = serde_json::json!({
            "knowledge_file": settings.knowledge_file.to_string_lossy(),
            "facts": session.fact_count(),
            "loaded": report.loaded_count(),
            "duplicates": report.duplicates,
            "errors": report.errors,
            "warning": report.warning.as_ref().map(ToString::to_string),
        });
        return print_json(&output);
    }

    println!("MediBot Knowledge Status");
    println!("========================");
    println!("Knowledge file: {}", settings.knowledge_file.display());
    println!();
    println!("Facts and rules: {}", session.fact_count());
    println!("Duplicates:      {}", report.duplicates);
    println!("Rejected:        {}", report.errors.len());

    if let Some(ref warning) = report.warning {
        println!();
        println!("Warning: {}", warning);
    }

    if verbose {
        for error in &report.errors {
            println!("  ✗ {}: {}", error.expression, error.reason);
        }
        for expression in session.expressions() {
            println!("  ✓ {}", expression);
        }
    }

    Ok(())
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Run a structured query.
pub async fn cmd_query(settings: &Settings, json_mode: bool, expression: &str) -> Result<(), AppError> {
    let knowledge = open_shared(settings)?;
    let timeout = Duration::from_millis(settings.query_timeout_ms);
    let outcome = run_query(&knowledge, expression, timeout).await;
    show_outcome(&outcome, json_mode)
}

fn show_outcome(outcome: &QueryOutcome, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        return print_json(outcome);
    }
    for fact in &outcome.facts {
        println!("{}", fact);
    }
    Ok(())
}

// =============================================================================
// ASSISTANT COMMANDS
// =============================================================================

/// Answer one question.
pub async fn cmd_ask(settings: &Settings, json_mode: bool, question: &str) -> Result<(), AppError> {
    let mut assistant = build_assistant(settings)?;
    let answer = assistant.ask(question).await;
    show_answer(&answer, json_mode)
}

/// Propose a fact from a statement.
pub async fn cmd_suggest(settings: &Settings, json_mode: bool, text: &str) -> Result<(), AppError> {
    let assistant = build_assistant(settings)?;
    let suggestion = assistant.suggest_fact(text).await;
    show_suggestion(&suggestion, json_mode)
}

/// Explain a `causes` fact. Needs no language model.
pub fn cmd_explain(settings: &Settings, json_mode: bool, fact: &str) -> Result<(), AppError> {
    let (session, _) = open_knowledge(settings)?;
    let explanation = explain::explain(&session, fact);
    show_explanation(&explanation, json_mode)
}

fn show_answer(answer: &Answer, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        return print_json(answer);
    }
    println!("{}", answer.answer);
    if let Some(ref query) = answer.query {
        tracing::debug!("Query: {}", query);
    }
    if !answer.facts_used.is_empty() {
        println!("  [facts: {}]", answer.facts_used);
    }
    Ok(())
}

fn show_suggestion(suggestion: &Suggestion, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        return print_json(suggestion);
    }
    if let Some(ref fact) = suggestion.suggestion {
        println!("{}", fact);
    }
    println!("{}", suggestion.message);
    Ok(())
}

fn show_explanation(explanation: &Explanation, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        return print_json(explanation);
    }
    println!("{}", explanation.explanation);
    println!("  Source:     {}", explanation.source);
    println!("  Confidence: {}", explanation.confidence);
    Ok(())
}

fn show_learned(response: &LearnResponse, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        return print_json(response);
    }
    let mark = if response.learned() { "✓" } else { "✗" };
    println!("{} {}: {}", mark, response.status, response.fact);
    Ok(())
}

// =============================================================================
// CHAT COMMAND
// =============================================================================

/// One line of chat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Ask(&'a str),
    Learn(&'a str),
    Suggest(&'a str),
    Explain(&'a str),
    History,
    Quit,
    Empty,
    Unknown(&'a str),
}

impl<'a> ChatCommand<'a> {
    /// Classify a line: `:command args` or a plain question.
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with(':') {
            return Self::Ask(line);
        }

        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));
        match command {
            ":learn" => Self::Learn(rest),
            ":suggest" => Self::Suggest(rest),
            ":explain" => Self::Explain(rest),
            ":history" => Self::History,
            ":quit" | ":exit" => Self::Quit,
            other => Self::Unknown(other),
        }
    }
}

const CHAT_HELP: &str =
    "Commands: :learn <fact>, :suggest <text>, :explain <fact>, :history, :quit";

/// Interactive loop with conversation history.
pub async fn cmd_chat(settings: &Settings, json_mode: bool) -> Result<(), AppError> {
    let mut assistant = build_assistant(settings)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !json_mode {
        println!("Ask a medical question. {}", CHAT_HELP);
    }

    loop {
        if !json_mode {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Ask(question) => {
                let answer = assistant.ask(question).await;
                show_answer(&answer, json_mode)?;
            }
            ChatCommand::Learn(fact) => match assistant.learn(fact).await {
                Ok(response) => show_learned(&response, json_mode)?,
                Err(e) => println!("{}", e),
            },
            ChatCommand::Suggest(text) => {
                let suggestion = assistant.suggest_fact(text).await;
                show_suggestion(&suggestion, json_mode)?;
            }
            ChatCommand::Explain(fact) => {
                let explanation = assistant.explain(fact).await;
                show_explanation(&explanation, json_mode)?;
            }
            ChatCommand::History => {
                if json_mode {
                    print_json(assistant.history())?;
                } else {
                    for turn in assistant.history().turns() {
                        println!("{}: {}", turn.role, turn.content);
                    }
                }
            }
            ChatCommand::Unknown(command) => println!("Unknown command {}. {}", command, CHAT_HELP),
        }
    }

    tracing::info!("Chat ended after {} turns", assistant.history().len());
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
