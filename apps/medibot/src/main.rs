//! # MediBot
//!
//! Command-line entry point.
//!
//! ## Usage
//!
//! ```bash
//! # Validate the knowledge base
//! medibot check -k metta_kb/medical.metta
//!
//! # Structured query, no language model involved
//! medibot query "(getCauses ChestPain)"
//!
//! # Natural-language question (needs GROQ_API_KEY)
//! medibot ask "What causes chest pain?"
//!
//! # Interactive session with history
//! medibot chat
//! ```

use clap::Parser;
use medibot::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // MEDIBOT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MEDIBOT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medibot=info,medibot_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the MediBot startup banner.
fn print_banner() {
    println!(
        r#"
  ┌┬┐┌─┐┌┬┐┬┌┐ ┌─┐┌┬┐
  │││├┤  │││├┴┐│ │ │
  ┴ ┴└─┘─┴┘┴└─┘└─┘ ┴

  Medical Q&A over a symbolic knowledge base v{}

  Not medical advice.
"#,
        env!("CARGO_PKG_VERSION")
    );
}
