//! Vendor enumeration.
//!
//! Defines [`Vendor`], which identifies which provider backend a profile
//! talks to and whether that backend participates in tool-calling.

use crate::error::ChatError;

/// Identifies which provider backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    /// OpenAI (chat completions API).
    OpenAi,
    /// DeepSeek (OpenAI-compatible wire protocol).
    DeepSeek,
    /// OpenRouter (OpenAI-compatible multi-provider gateway).
    OpenRouter,
    /// Anthropic (messages API). Text only.
    Anthropic,
    /// Replicate (prediction streaming). Text only.
    Replicate,
}

impl Vendor {
    /// Parses a vendor name from a profile. Case-insensitive.
    pub fn from_str(s: &str) -> Result<Self, ChatError> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::DeepSeek),
            "openrouter" => Ok(Self::OpenRouter),
            "anthropic" => Ok(Self::Anthropic),
            "replicate" => Ok(Self::Replicate),
            other => Err(ChatError::Configuration(format!(
                "Unknown vendor: {other}. Supported: openai, deepseek, openrouter, anthropic, replicate"
            ))),
        }
    }

    /// The environment variable carrying this vendor's credential.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Replicate => "REPLICATE_API_KEY",
        }
    }

    /// The `[keys]` config table entry for this vendor.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::OpenRouter => "openrouter",
            Self::Anthropic => "anthropic",
            Self::Replicate => "replicate",
        }
    }

    /// Whether this vendor's adapter participates in tool-calling.
    ///
    /// Anthropic and Replicate sessions never advertise tools and never
    /// take the tool-call accumulation path.
    pub fn supports_tools(&self) -> bool {
        matches!(self, Self::OpenAi | Self::DeepSeek | Self::OpenRouter)
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_name())
    }
}
