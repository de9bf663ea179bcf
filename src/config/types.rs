//! Struct definitions and serde defaults for nicechat configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration, deserialized from `config.toml`.
///
/// Profiles are kept in a `BTreeMap` so listings are deterministic.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Profile used when none is named on the command line.
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Named chat profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    /// Per-vendor API keys. Environment variables take precedence; this
    /// table is the fallback and supports `{env:VAR}` placeholders.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// One chat profile: which vendor and model to talk to, and with what
/// system prompt.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    /// Vendor name (openai, deepseek, openrouter, anthropic, replicate).
    pub vendor: String,
    /// Model identifier as the vendor expects it.
    pub model: String,
    /// System prompt seeding the conversation.
    #[serde(default = "default_system_prompt")]
    pub system: String,
}

/// Returns the default system prompt.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization
/// so profiles without an explicit `system` still get a sensible one.
pub(super) fn default_system_prompt() -> String {
    crate::constants::DEFAULT_SYSTEM_PROMPT.to_string()
}
