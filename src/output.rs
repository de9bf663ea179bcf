//! Output rendering abstraction for nicechat.
//!
//! Defines the [`Renderer`] trait that decouples the conversation engine
//! from the display layer. [`StdoutRenderer`] prints tokens directly to the
//! terminal; engine tests substitute a capturing renderer.

use colored::Colorize;
use std::io::{self, Write};

/// Trait for rendering engine output as it happens.
pub trait Renderer {
    /// Render a single text delta as it arrives.
    fn render_token(&mut self, token: &str);

    /// Announce a tool invocation before it executes.
    fn tool_call(&mut self, name: &str, arguments_raw: &str);

    /// Called when one exchange (user turn fully answered) completes.
    fn render_done(&mut self);
}

/// Renders streaming output directly to stdout.
///
/// Each token is printed immediately with an explicit flush so the user
/// sees tokens as they are generated.
pub struct StdoutRenderer;

impl StdoutRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for StdoutRenderer {
    fn render_token(&mut self, token: &str) {
        print!("{}", token.green());
        io::stdout().flush().ok();
    }

    fn tool_call(&mut self, name: &str, arguments_raw: &str) {
        // Condense the raw JSON onto one line for the announcement.
        let condensed = arguments_raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        println!();
        println!("[{}]: {}", name.blue(), condensed.yellow());
    }

    fn render_done(&mut self) {
        println!();
        println!();
    }
}
