//! Error taxonomy for the conversation engine.
//!
//! The engine distinguishes four failure classes with different policies:
//! configuration and adapter errors are fatal to the session, an
//! unregistered tool is fatal (the conversation cannot answer the call),
//! and a plugin execution failure is recovered into a tool-result turn so
//! the model can see it and route around it.

use thiserror::Error;

/// Errors surfaced by the conversation engine and its collaborators.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing credential, unknown profile, or unknown vendor. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport or auth failure talking to a provider. Fatal to the
    /// current session; retry policy belongs to the transport, not here.
    #[error("provider request failed: {detail}")]
    Adapter {
        /// HTTP status, when the provider answered at all.
        status: Option<u16>,
        detail: String,
    },

    /// The model requested a tool with no matching descriptor. Fatal:
    /// an unknown tool is a programming or configuration defect.
    #[error("unregistered tool: {0}")]
    UnregisteredTool(String),

    /// A registered plugin failed while executing (including malformed
    /// JSON arguments). Recovered at the dispatch boundary.
    #[error("plugin {name} failed: {source}")]
    PluginExecution {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A single turn's stream mixed text and tool-call deltas. Not a
    /// known provider behavior; treated as a hard protocol error rather
    /// than silently dropping one channel.
    #[error("protocol violation: stream mixed text and tool-call deltas in one turn")]
    ProtocolViolation,
}

impl ChatError {
    /// Builds an [`ChatError::Adapter`] from a failed HTTP response.
    pub fn adapter_status(status: u16, body: impl Into<String>) -> Self {
        Self::Adapter {
            status: Some(status),
            detail: format!("HTTP {status}: {}", body.into()),
        }
    }

    /// Builds an [`ChatError::Adapter`] from a transport-level failure.
    pub fn adapter(detail: impl Into<String>) -> Self {
        Self::Adapter {
            status: None,
            detail: detail.into(),
        }
    }
}
