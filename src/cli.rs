//! Command-line interface definition and dispatch for nicechat.
//!
//! Uses [`clap`] for argument parsing with derive macros. A bare
//! `nicechat [PROFILE]` starts a chat; `profiles` and `models` are
//! listing subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::{chat, config, provider};

/// Top-level CLI structure for nicechat.
#[derive(Parser)]
#[command(name = "nicechat", about = "A streaming multi-provider AI chat client")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Profile to chat with (defaults to the configured default profile)
    pub profile: Option<String>,

    /// Enable the plugins' debug log channel
    #[arg(long)]
    pub debug: bool,
}

/// Available subcommands.
///
/// The `///` doc comments on variants double as `--help` text.
#[derive(Subcommand)]
pub enum Commands {
    /// Start a chat session (default when no subcommand is given)
    Chat {
        /// Profile to chat with
        profile: Option<String>,
        /// Enable the plugins' debug log channel
        #[arg(long)]
        debug: bool,
    },
    /// List configured profiles
    Profiles,
    /// List available OpenAI models
    Models,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;

    match cli.command {
        Some(Commands::Chat { profile, debug }) => {
            chat::run_chat(&config, profile.as_deref(), debug).await
        }
        Some(Commands::Profiles) => {
            list_profiles(&config);
            Ok(())
        }
        Some(Commands::Models) => provider::list_models(&config).await,
        None => chat::run_chat(&config, cli.profile.as_deref(), cli.debug).await,
    }
}

/// Prints configured profiles as `name  vendor  model` columns.
fn list_profiles(config: &config::Config) {
    println!("{}", "Available profiles:".bold());
    println!();

    if config.profiles.is_empty() {
        println!("{}", "  No profiles configured".dimmed());
        return;
    }

    for (name, profile) in &config.profiles {
        println!(
            "  {} {} {}",
            format!("{name:<15}").magenta(),
            format!("{:<12}", profile.vendor).dimmed(),
            profile.model,
        );
    }
    println!();
}
