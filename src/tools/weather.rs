use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

use super::registry::ToolFunction;
use crate::providers::types::tool::Tool;

pub const WEATHER_TOOL_NAME: &str = "getCurrentWeather";
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Fetches the hourly apparent temperature forecast for a coordinate.
pub struct GetCurrentWeather {
    client: Client,
    url: String,
}

impl GetCurrentWeather {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn definition() -> Tool {
        Tool::new(
            WEATHER_TOOL_NAME,
            "Get the current weather in a given location given in latitude and longitude",
            json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "string" },
                    "longitude": { "type": "string" }
                },
                "required": ["longitude", "latitude"]
            }),
        )
    }
}

/// Models sometimes send coordinates as numbers despite the string schema.
fn coordinate(arguments: &Map<String, Value>, name: &str) -> Result<String> {
    match arguments.get(name) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(anyhow!("argument '{}' must be a string, got {}", name, other)),
        None => Err(anyhow!("missing argument '{}'", name)),
    }
}

#[async_trait]
impl ToolFunction for GetCurrentWeather {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
        let latitude = coordinate(arguments, "latitude")?;
        let longitude = coordinate(arguments, "longitude")?;

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", "apparent_temperature"),
            ])
            .send()
            .await
            .with_context(|| format!("weather request to {} failed", self.url))?
            .error_for_status()?;

        response
            .json::<Value>()
            .await
            .context("weather response was not JSON")
    }
}
