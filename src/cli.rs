//! Command-line interface definition for docquery
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat session and the one-shot ask command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docquery - Chat with your PDF documents
///
/// Upload PDF files into a session and ask questions answered by a
/// remote document-search agent, with citations and follow-ups.
#[derive(Parser, Debug, Clone)]
#[command(name = "docquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the agent endpoint URL from config
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for docquery
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// PDF files to upload when the session starts
        #[arg(short, long = "documents", num_args = 1..)]
        documents: Vec<PathBuf>,
    },

    /// Ask a single question and print the agent's answer
    Ask {
        /// Question to send to the agent
        query: String,

        /// Print the rendered response as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            endpoint: None,
            command: Commands::Chat {
                documents: Vec::new(),
            },
        }
    }
}
