//! CLI command definitions using clap.
//!
//! - agent: interactive tool router (default)
//! - tools: list registered tools
//! - run: invoke one tool non-interactively
//! - chat: multi-turn chat session
//! - rag: retrieval-augmented chat with persisted memory
//! - qa: answer questions from local text or PDF files

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Toolrouter - route commands and free-text intents to local tools
#[derive(Parser, Debug)]
#[command(name = "toolrouter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive agent: pick a tool by name or describe what you want
    Agent,

    /// List the registered tools
    Tools,

    /// Run one tool and exit
    Run {
        /// Tool name or free-text intent
        tool: String,

        /// Tool argument as key=value (repeatable)
        #[arg(short = 'a', long = "arg", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },

    /// Chat with the local model, keeping the conversation as context
    Chat,

    /// Chat with retrieval over past messages and persisted memory
    Rag {
        /// Override the memory file from config
        #[arg(short, long)]
        memory: Option<PathBuf>,
    },

    /// Answer questions from local text or PDF files
    Qa {
        /// Files to ingest before answering
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Answer this one question and exit instead of prompting
        #[arg(short, long)]
        question: Option<String>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
