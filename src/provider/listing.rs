//! Model listing.
//!
//! Queries the OpenAI models endpoint and prints the available model IDs.
//! Isolates this display concern from the adapter core.

use anyhow::Result;
use serde::Deserialize;

use crate::config::Config;
use crate::constants::OPENAI_BASE_URL;
use crate::error::ChatError;

use super::Vendor;

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
    /// Cursor-pagination flag; absent when the listing fits one page.
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

/// Lists available OpenAI model IDs, one per line.
///
/// Follows the `has_more`/`after` cursor until the listing is complete.
pub async fn list_models(config: &Config) -> Result<()> {
    let api_key = config.resolve_api_key(Vendor::OpenAi).ok_or_else(|| {
        ChatError::Configuration(
            "No API key found for openai. Set OPENAI_API_KEY or add it to [keys] in config.toml"
                .to_string(),
        )
    })?;

    let url = format!("{OPENAI_BASE_URL}/models");
    let client = reqwest::Client::new();
    let mut ids: Vec<String> = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let mut request = client.get(&url).bearer_auth(&api_key);
        if let Some(cursor) = &after {
            request = request.query(&[("after", cursor.as_str())]);
        }
        let response = request.send().await?.error_for_status()?;
        let page: ModelsResponse = response.json().await?;

        let has_more = page.has_more;
        after = page.data.last().map(|m| m.id.clone());
        ids.extend(page.data.into_iter().map(|m| m.id));
        if !has_more || after.is_none() {
            break;
        }
    }

    ids.sort();
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parses_with_and_without_the_cursor_flag() {
        let page: ModelsResponse =
            serde_json::from_str(r#"{"data":[{"id":"gpt-4"}],"has_more":true}"#).unwrap();
        assert!(page.has_more);
        assert_eq!(page.data[0].id, "gpt-4");

        let page: ModelsResponse =
            serde_json::from_str(r#"{"object":"list","data":[{"id":"gpt-4"}]}"#).unwrap();
        assert!(!page.has_more);
    }
}
