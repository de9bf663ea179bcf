//! Entry point for nicechat, a streaming multi-provider AI chat client
//! for the terminal.
//!
//! This binary loads environment variables, parses CLI arguments via
//! [`cli`], and dispatches to the appropriate subcommand handler.

mod chat;
mod cli;
mod config;
mod constants;
mod engine;
mod error;
mod message;
mod output;
mod plugins;
mod provider;
mod stream;

use anyhow::Result;

/// Runs the nicechat CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, and dispatches via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    cli::run(cli).await
}
