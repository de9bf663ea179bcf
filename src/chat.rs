//! Interactive chat loop for nicechat.
//!
//! Reads user input between engine exchanges using [`rustyline`] for
//! readline support (line editing, persistent input history). The loop is
//! unbounded by design; it ends only on an exit command, Ctrl+D, or a
//! fatal engine error.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;

use crate::config::{Config, Profile};
use crate::constants::{EXIT_COMMANDS, HISTORY_FILENAME, MAX_INPUT_HISTORY};
use crate::engine::ConversationEngine;
use crate::output::StdoutRenderer;
use crate::plugins::PluginRegistry;
use crate::provider::{self, Vendor};

/// Prints the session starter line: `vendor/model [system prompt]`.
fn print_starter(vendor: Vendor, profile: &Profile) {
    println!(
        "{}/{} [{}]",
        vendor.to_string().bold(),
        profile.model.green(),
        profile.system.blue(),
    );
}

/// Runs the interactive chat session for one profile.
///
/// The exit tokens `exit`, `quit`, `q`, and `bye` (exact, case-sensitive,
/// full trimmed line) terminate the session, as does Ctrl+D; Ctrl+C only
/// cancels the current line. Input history is prefilled from the cache
/// directory and capped at [`MAX_INPUT_HISTORY`] lines, oldest first.
pub async fn run_chat(config: &Config, profile_name: Option<&str>, debug: bool) -> Result<()> {
    let (_, profile) = config.profile(profile_name)?;
    let (vendor, adapter) = provider::adapter_for_profile(profile, config)?;

    print_starter(vendor, profile);

    // Vendors outside the tool-calling protocol get an empty registry.
    let plugins = if vendor.supports_tools() {
        PluginRegistry::with_builtins()
    } else {
        PluginRegistry::new()
    };
    let mut engine = ConversationEngine::new(adapter, plugins, &profile.system, debug);

    // Readline with persistent, capped input history.
    let rl_config = rustyline::Config::builder()
        .max_history_size(MAX_INPUT_HISTORY)?
        .build();
    let mut rl: Editor<(), FileHistory> = Editor::with_config(rl_config)?;
    let history_path = Config::cache_dir()?.join(HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    let mut renderer = StdoutRenderer::new();

    loop {
        let readline = rl.readline(&format!("{} ", ">".yellow()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if EXIT_COMMANDS.contains(&line.as_str()) {
                    break;
                }
                let _ = rl.add_history_entry(&line);

                engine.push_user(&line);
                if let Err(e) = engine.run_exchange(&mut renderer).await {
                    // Propagate without printing; the error is reported
                    // once, at process exit.
                    save_history(&mut rl, &history_path);
                    return Err(e.into());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
    Ok(())
}

fn save_history(rl: &mut Editor<(), FileHistory>, path: &std::path::Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(path);
}
