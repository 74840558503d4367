//! # MediBot
//!
//! Grounded medical question answering - THE BINARY.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    apps/medibot (THE BINARY)                │
//! │                                                             │
//! │  ┌─────────────┐    ┌──────────────┐    ┌───────────────┐   │
//! │  │    CLI      │───►│  Assistant   │───►│ LanguageModel │   │
//! │  │   (clap)    │    │ (history,    │    │  (reqwest)    │   │
//! │  └─────────────┘    │  escalation) │    └───────────────┘   │
//! │                     └──────┬───────┘                        │
//! │                            ▼                                │
//! │                  ┌───────────────────┐                      │
//! │                  │   medibot-core    │                      │
//! │                  │   (THE LOGIC)     │                      │
//! │                  └───────────────────┘                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;

pub use error::AppError;
