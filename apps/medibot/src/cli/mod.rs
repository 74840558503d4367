//! # MediBot CLI Module
//!
//! This module implements the CLI interface for MediBot.
//!
//! ## Available Commands
//!
//! - `check` - Load the knowledge base and report what was accepted
//! - `query` - Run a structured query
//! - `ask` - Answer one natural-language question
//! - `chat` - Interactive session with history
//! - `suggest` - Propose a fact from free text
//! - `explain` - Explain a `causes` fact

mod commands;

use crate::AppError;
use crate::config::Settings;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// MediBot - grounded medical question answering
///
/// Questions are translated into knowledge-base queries; answers are
/// phrased from the facts found. Not medical advice.
#[derive(Parser, Debug)]
#[command(name = "medibot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the knowledge file (overrides config and environment)
    #[arg(short, long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Load the knowledge base and report its status
    Check,

    /// Run a structured query such as "(getCauses ChestPain)"
    Query {
        /// Query expression
        expression: String,
    },

    /// Answer a natural-language question
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Start an interactive chat
    Chat,

    /// Propose a knowledge-base fact from a statement
    Suggest {
        /// Free-text statement
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Explain a fact such as "causes Flu Fever"
    Explain {
        /// The fact, with or without parentheses
        #[arg(required = true, num_args = 1..)]
        fact: Vec<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve settings: defaults, config file, environment, then `--knowledge`.
pub fn resolve_settings(
    config: Option<&Path>,
    knowledge: Option<&Path>,
) -> Result<Settings, AppError> {
    let mut settings = Settings::load(config)?;
    settings.apply_env()?;
    if let Some(path) = knowledge {
        settings.knowledge_file = path.to_path_buf();
    }
    Ok(settings)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let settings = resolve_settings(cli.config.as_deref(), cli.knowledge.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Check) => cmd_check(&settings, json_mode, cli.verbose),
        Some(Commands::Query { expression }) => cmd_query(&settings, json_mode, &expression).await,
        Some(Commands::Ask { question }) => {
            cmd_ask(&settings, json_mode, &question.join(" ")).await
        }
        Some(Commands::Chat) => cmd_chat(&settings, json_mode).await,
        Some(Commands::Suggest { text }) => cmd_suggest(&settings, json_mode, &text.join(" ")).await,
        Some(Commands::Explain { fact }) => cmd_explain(&settings, json_mode, &fact.join(" ")),
        None => {
            // No subcommand - check the knowledge base by default
            cmd_check(&settings, json_mode, cli.verbose)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "medibot",
            "query",
            "(getCauses Fever)",
            "--json-mode",
            "-k",
            "kb.metta",
        ])
        .expect("parse");
        assert!(cli.json_mode);
        assert_eq!(cli.knowledge, Some(PathBuf::from("kb.metta")));
        assert_eq!(
            cli.command,
            Some(Commands::Query {
                expression: "(getCauses Fever)".to_string()
            })
        );
    }

    #[test]
    fn ask_joins_words() {
        let cli = Cli::try_parse_from(["medibot", "ask", "What", "causes", "fever?"]).expect("parse");
        match cli.command {
            Some(Commands::Ask { question }) => assert_eq!(question.join(" "), "What causes fever?"),
            other => unreachable!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["medibot", "-q"]).expect("parse");
        assert!(cli.quiet);
        assert!(cli.command.is_none());
    }

    #[test]
    fn knowledge_flag_overrides_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("medibot.toml");
        std::fs::write(&config, "knowledge_file = \"from-config.metta\"\n").expect("write");

        let settings = resolve_settings(Some(&config), Some(Path::new("from-flag.metta")))
            .expect("settings");
        assert_eq!(settings.knowledge_file, PathBuf::from("from-flag.metta"));
    }
}
