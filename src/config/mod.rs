//! Configuration types and path resolution for nicechat.
//!
//! Settings live as TOML at the platform's XDG config path
//! (e.g. `~/.config/nicechat/config.toml` on Linux): named profiles, each
//! declaring a vendor, model, and system prompt, plus an optional `[keys]`
//! table for credentials. Readline input history goes under the XDG cache
//! directory.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::{Config, Profile};

use anyhow::Result;

impl Config {
    /// Load config from disk, creating a default file if none exists,
    /// then resolve `{env:VAR}` substitutions.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.resolve_substitutions();
        Ok(config)
    }
}
