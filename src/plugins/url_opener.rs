//! url_opener plugin: opens a URL in the user's default browser.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Plugin, Toolkit};

/// Plugin that opens a URL with the platform's default opener.
pub struct UrlOpener;

#[derive(Deserialize)]
struct UrlOpenerArgs {
    url: String,
}

#[async_trait::async_trait]
impl Plugin for UrlOpener {
    fn name(&self) -> &str {
        "url_opener"
    }

    fn description(&self) -> &str {
        "Opens a url in user's default browser"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The url of the website to open in browser"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments_raw: &str, toolkit: &Toolkit) -> Result<String> {
        let args: UrlOpenerArgs =
            serde_json::from_str(arguments_raw).context("invalid url_opener arguments")?;
        toolkit.debug(&format!("Opening: {}", args.url));

        let Some((program, opener_args)) = opener_invocation(std::env::consts::OS, &args.url)
        else {
            let os = std::env::consts::OS;
            toolkit.debug(&format!("Platform {os} not supported"));
            return Ok(format!("Platform {os} not supported"));
        };

        let status = tokio::process::Command::new(program)
            .args(&opener_args)
            .status()
            .await
            .with_context(|| format!("failed to run {program}"))?;

        if !status.success() {
            return Ok(format!("Opener exited with status {status}"));
        }
        Ok("Opened.".to_string())
    }
}

/// Maps an OS name to the program and arguments that open a URL there.
///
/// On Windows `start` is a cmd builtin, not an executable, so it has to
/// go through `cmd /C`; the empty string fills start's window-title slot
/// so the URL is not mistaken for it.
fn opener_invocation(os: &str, url: &str) -> Option<(&'static str, Vec<String>)> {
    match os {
        "macos" => Some(("open", vec![url.to_string()])),
        "windows" => Some((
            "cmd",
            vec!["/C".into(), "start".into(), String::new(), url.to_string()],
        )),
        "linux" => Some(("xdg-open", vec![url.to_string()])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_goes_through_cmd_because_start_is_a_builtin() {
        let (program, args) = opener_invocation("windows", "http://x.io").unwrap();
        assert_eq!(program, "cmd");
        assert_eq!(args, ["/C", "start", "", "http://x.io"]);
    }

    #[test]
    fn unix_platforms_invoke_their_opener_directly() {
        let (program, args) = opener_invocation("linux", "http://x.io").unwrap();
        assert_eq!(program, "xdg-open");
        assert_eq!(args, ["http://x.io"]);
        assert_eq!(opener_invocation("macos", "http://x.io").unwrap().0, "open");
    }

    #[test]
    fn unknown_platforms_have_no_opener() {
        assert!(opener_invocation("freebsd", "http://x.io").is_none());
    }
}
