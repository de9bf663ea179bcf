//! Provider adapters for nicechat.
//!
//! Each vendor gets one adapter implementing [`ProviderAdapter`]: a uniform
//! "send conversation, get stream of normalized events" call. The engine
//! depends only on the trait; vendor selection happens once per session in
//! [`build_adapter`].

mod anthropic;
mod kind;
mod listing;
mod openai;
mod replicate;
mod sse;

pub use kind::Vendor;
pub use listing::list_models;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::Profile;
use crate::error::ChatError;
use crate::message::Message;
use crate::plugins::ToolDefinition;
use crate::stream::StreamEvent;

use anthropic::AnthropicAdapter;
use openai::OpenAiAdapter;
use replicate::ReplicateAdapter;

/// One turn's event sequence: finite, ordered, not restartable.
///
/// The adapter's request task sends events FIFO and drops the sender when
/// the provider signals end-of-turn, which closes the channel. Errors
/// arrive in-band and end the turn.
pub type EventStream = mpsc::UnboundedReceiver<Result<StreamEvent, ChatError>>;

/// Vendor-specific translation layer producing normalized stream events.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Whether this adapter participates in tool-calling. When false the
    /// engine never advertises tools and never sees a tool-call turn.
    fn supports_tools(&self) -> bool;

    /// Sends the full conversation and returns the response event stream.
    ///
    /// A fresh call must be made per turn. The adapter never mutates
    /// history and never retries; transport failures surface as
    /// [`ChatError::Adapter`].
    async fn send_turn(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<EventStream, ChatError>;
}

/// Builds the adapter for a profile's vendor.
///
/// `api_key` must already be resolved; profile and credential validation
/// is the config layer's job.
pub fn build_adapter(vendor: Vendor, api_key: String, model: String) -> Box<dyn ProviderAdapter> {
    match vendor {
        Vendor::OpenAi => Box::new(OpenAiAdapter::new(
            api_key,
            model,
            crate::constants::OPENAI_BASE_URL,
        )),
        Vendor::DeepSeek => Box::new(OpenAiAdapter::new(
            api_key,
            model,
            crate::constants::DEEPSEEK_BASE_URL,
        )),
        Vendor::OpenRouter => Box::new(OpenAiAdapter::new(
            api_key,
            model,
            crate::constants::OPENROUTER_BASE_URL,
        )),
        Vendor::Anthropic => Box::new(AnthropicAdapter::new(api_key, model)),
        Vendor::Replicate => Box::new(ReplicateAdapter::new(api_key, model)),
    }
}

/// Resolves a profile into a ready adapter, including its credential.
pub fn adapter_for_profile(
    profile: &Profile,
    config: &crate::config::Config,
) -> Result<(Vendor, Box<dyn ProviderAdapter>), ChatError> {
    let vendor = Vendor::from_str(&profile.vendor)?;
    let api_key = config.resolve_api_key(vendor).ok_or_else(|| {
        ChatError::Configuration(format!(
            "No API key found for {vendor}. Set {} or add it to [keys] in config.toml",
            vendor.api_key_env()
        ))
    })?;
    Ok((vendor, build_adapter(vendor, api_key, profile.model.clone())))
}
