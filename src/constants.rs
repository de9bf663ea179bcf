//! Centralized constants for nicechat.
//!
//! All magic numbers, default strings, and endpoint URLs live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "nicechat";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "input_history.txt";

/// Maximum number of input-history lines retained (oldest dropped first).
pub const MAX_INPUT_HISTORY: usize = 500;

/// Full trimmed lines that terminate the chat session (case-sensitive).
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit", "q", "bye"];

/// Profile used when none is named on the command line.
pub const DEFAULT_PROFILE: &str = "default";

/// Default model for the generated first-run profile.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default system prompt for the generated first-run profile.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. You answer concisely and to the point.";

// --- Provider endpoints ---

/// OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// DeepSeek API base URL (OpenAI-compatible wire protocol).
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// OpenRouter API base URL (OpenAI-compatible wire protocol).
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Anthropic API base URL.
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Required `anthropic-version` header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Replicate API base URL.
pub const REPLICATE_BASE_URL: &str = "https://api.replicate.com";

// --- Completion limits ---

/// Maximum tokens requested from providers that require a cap.
pub const MAX_TOKENS: u64 = 1024;
