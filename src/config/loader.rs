//! File loading for nicechat configuration.

use anyhow::{Context, Result};
use std::fs;

use super::types::Config;

impl Config {
    /// Loads the config from `~/.config/nicechat/config.toml`.
    ///
    /// If no config file exists, creates one with a default openai profile
    /// and `{env:VAR}` placeholders for API keys, then returns it.
    pub(super) fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = format!(
                r#"default_profile = "{}"

[profiles.default]
vendor = "openai"
model = "{}"
system = "{}"

[keys]
openai = "{{env:OPENAI_API_KEY}}"
anthropic = "{{env:ANTHROPIC_API_KEY}}"
"#,
                crate::constants::DEFAULT_PROFILE,
                crate::constants::DEFAULT_MODEL,
                crate::constants::DEFAULT_SYSTEM_PROMPT,
            );
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            let config: Config = toml::from_str(&default_toml)
                .with_context(|| "Failed to parse default config".to_string())?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        Ok(config)
    }
}
