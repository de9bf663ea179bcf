//! Environment variable substitution, API key resolution, and profile
//! selection.

use crate::error::ChatError;
use crate::provider::Vendor;

use super::types::{Config, Profile};

impl Config {
    /// Resolve `{env:VAR_NAME}` patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        for key in self.keys.values_mut() {
            *key = Self::resolve_str(key);
        }
        for profile in self.profiles.values_mut() {
            profile.model = Self::resolve_str(&profile.model);
            profile.system = Self::resolve_str(&profile.system);
        }
    }

    /// Replace `{env:VAR}` with the environment variable value.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 5..start + end];
                let value = std::env::var(var_name).unwrap_or_default();
                result = format!(
                    "{}{}{}",
                    &result[..start],
                    value,
                    &result[start + end + 1..]
                );
            } else {
                break;
            }
        }
        result
    }

    /// Resolve the API key for a vendor: env var first, then `[keys]`.
    pub fn resolve_api_key(&self, vendor: Vendor) -> Option<String> {
        if let Ok(val) = std::env::var(vendor.api_key_env()) {
            if !val.is_empty() {
                return Some(val);
            }
        }
        self.keys
            .get(vendor.key_name())
            .filter(|k| !k.is_empty())
            .cloned()
    }

    /// Selects a profile by name, falling back to the configured default.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ChatError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(crate::constants::DEFAULT_PROFILE);
        match self.profiles.get(name) {
            Some(profile) => Ok((name.to_string(), profile)),
            None => {
                let known = self
                    .profiles
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(ChatError::Configuration(format!(
                    "Profile {name} not found. Possible values: {known}"
                )))
            }
        }
    }
}
