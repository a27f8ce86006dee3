use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

use super::registry::ToolFunction;
use crate::providers::types::tool::Tool;

pub const LOCATION_TOOL_NAME: &str = "getLocation";
pub const IPAPI_URL: &str = "https://ipapi.co/json/";

/// Looks up the caller's location from their public IP address.
pub struct GetLocation {
    client: Client,
    url: String,
}

impl GetLocation {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn definition() -> Tool {
        Tool::new(
            LOCATION_TOOL_NAME,
            "Get the user's location based on their IP address",
            json!({
                "type": "object",
                "properties": {}
            }),
        )
    }
}

#[async_trait]
impl ToolFunction for GetLocation {
    async fn call(&self, _arguments: &Map<String, Value>) -> Result<Value> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("location request to {} failed", self.url))?
            .error_for_status()?;

        response
            .json::<Value>()
            .await
            .context("location response was not JSON")
    }
}
