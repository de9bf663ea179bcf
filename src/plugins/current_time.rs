//! current_time plugin: reports the local date and time.

use anyhow::Result;
use chrono::Local;
use serde_json::{json, Value};

use super::{Plugin, Toolkit};

/// Plugin that returns the current local date and time. Takes no arguments.
pub struct CurrentTime;

#[async_trait::async_trait]
impl Plugin for CurrentTime {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Returns the current date and time"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments_raw: &str, _toolkit: &Toolkit) -> Result<String> {
        let now = Local::now();
        let time = now.format("%H:%M:%S");
        let day = now.format("%A, %B %-d, %Y");
        Ok(format!("It is currently {time} on {day}"))
    }
}
