//! CLI module for toolrouter - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
