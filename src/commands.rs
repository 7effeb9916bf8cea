//! Command-line interface for the application, defined with `clap`.
//!
//! Three subcommands: `chat` for an interactive session, `ask` for a single
//! one-shot question, and `init` to write a starter configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Always)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
#[command(about, long_about = None, color = clap::ColorChoice::Always)]
pub enum Commands {
    /// Start an interactive chat session against the menu catalog.
    #[clap(name = "chat", alias = "c")]
    Chat {
        /// Catalog JSON file (overrides `catalog_path` from the config).
        #[arg(name = "catalog", long, short = 'k')]
        catalog: Option<PathBuf>,
    },

    /// Ask a single question and print the reply.
    #[clap(name = "ask", alias = "a")]
    Ask {
        /// The question to ask about the menu.
        question: String,

        /// Catalog JSON file (overrides `catalog_path` from the config).
        #[arg(name = "catalog", long, short = 'k')]
        catalog: Option<PathBuf>,
    },

    /// Write a starter `config.yaml` under the platform config directory.
    Init,
}
