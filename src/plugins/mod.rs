//! Plugin registry and dispatch for nicechat.
//!
//! A plugin is a named, locally executed capability the model may invoke
//! mid-conversation. Each plugin exposes a static descriptor (name,
//! description, JSON-schema parameters) advertised to tool-calling-capable
//! providers, and an `execute` capability that receives the raw argument
//! text and a [`Toolkit`] logger. Plugins get no other context; in
//! particular they never see the conversation history.

pub mod current_time;
pub mod fetch_website;
pub mod url_opener;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ChatError;

use current_time::CurrentTime;
use fetch_website::FetchWebsite;
use url_opener::UrlOpener;

/// Structured logger handed to a plugin during execution.
///
/// The `log` channel is always active; `debug` is active only when debug
/// mode is enabled for the session. Both prefix lines with the plugin name.
pub struct Toolkit {
    prefix: String,
    debug_enabled: bool,
}

impl Toolkit {
    pub fn new(plugin_name: &str, debug_enabled: bool) -> Self {
        Self {
            prefix: format!("[{plugin_name}]"),
            debug_enabled,
        }
    }

    pub fn log(&self, msg: &str) {
        println!("{} {}", self.prefix.dimmed(), msg);
    }

    pub fn debug(&self, msg: &str) {
        if self.debug_enabled {
            println!("{} {}", self.prefix.dimmed(), msg.dimmed());
        }
    }
}

/// Descriptor advertised to the provider so the model knows what it may call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing accepted arguments.
    pub parameters: Value,
}

/// Every plugin implements this trait.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Globally unique name; the dispatch key.
    fn name(&self) -> &str;

    /// Human-readable description sent to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the plugin's arguments.
    fn parameters(&self) -> Value;

    /// Execute with the raw (concatenated) argument text. Parsing the
    /// arguments is the plugin's job, so malformed JSON surfaces here.
    async fn execute(&self, arguments_raw: &str, toolkit: &Toolkit) -> Result<String>;
}

/// Holds all registered plugins and dispatches calls by name.
///
/// Registration order is preserved for deterministic advertisement;
/// re-registering a name replaces the earlier descriptor in place.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Registry with all built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FetchWebsite::new()));
        registry.register(Box::new(CurrentTime));
        registry.register(Box::new(UrlOpener));
        registry
    }

    /// Register a plugin. Last registration wins for a given name.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let plugin: Arc<dyn Plugin> = Arc::from(plugin);
        if let Some(existing) = self
            .plugins
            .iter_mut()
            .find(|p| p.name() == plugin.name())
        {
            *existing = plugin;
        } else {
            self.plugins.push(plugin);
        }
    }

    /// Look up a plugin by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Descriptors for the provider advertisement, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.plugins
            .iter()
            .map(|p| ToolDefinition {
                name: p.name().to_string(),
                description: p.description().to_string(),
                parameters: p.parameters(),
            })
            .collect()
    }

    /// Look up a plugin by name and execute it.
    ///
    /// Fails with [`ChatError::UnregisteredTool`] when no descriptor
    /// matches; a plugin's own failure becomes
    /// [`ChatError::PluginExecution`] so the caller can recover it.
    /// No retry and no sandboxing here; each plugin contains its own
    /// failures.
    pub async fn execute(
        &self,
        name: &str,
        arguments_raw: &str,
        toolkit: &Toolkit,
    ) -> Result<String, ChatError> {
        let plugin = self
            .lookup(name)
            .ok_or_else(|| ChatError::UnregisteredTool(name.to_string()))?;
        plugin
            .execute(arguments_raw, toolkit)
            .await
            .map_err(|source| ChatError::PluginExecution {
                name: name.to_string(),
                source,
            })
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
