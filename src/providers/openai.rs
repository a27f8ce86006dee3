use std::time::Duration;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use super::{
    base::{Completion, Provider, Usage},
    configs::openai::OpenAiProviderConfig,
    types::{message::Message, tool::Tool},
    utils::{
        check_openai_context_length_error, messages_to_openai_spec, openai_response_to_message,
        openai_stop_reason, tools_to_openai_spec,
    },
};

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Result<Usage> {
        let usage = data.get("usage")
            .ok_or_else(|| anyhow!("No usage data in response"))?;

        let input_tokens = usage.get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage.get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage.get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| {
                match (input_tokens, output_tokens) {
                    (Some(input), Some(output)) => Some(input + output),
                    _ => None
                }
            });

        Ok(Usage::new(input_tokens, output_tokens, total_tokens))
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = self.config.completions_url();
        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            // Error bodies carry the context length code, let the caller inspect them
            StatusCode::BAD_REQUEST => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => Err(anyhow!("Request failed: {}", status)),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<Completion> {
        let messages_spec = messages_to_openai_spec(messages);
        let tools_spec = if !tools.is_empty() {
            tools_to_openai_spec(tools)?
        } else {
            vec![]
        };

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_spec
        });

        if let Some(object) = payload.as_object_mut() {
            if !tools_spec.is_empty() {
                object.insert("tools".to_string(), json!(tools_spec));
            }
            if let Some(temp) = self.config.temperature {
                object.insert("temperature".to_string(), json!(temp));
            }
            if let Some(tokens) = self.config.max_tokens {
                object.insert("max_tokens".to_string(), json!(tokens));
            }
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let message = openai_response_to_message(&response)?;
        let stop_reason = openai_stop_reason(&response);
        // Some OpenAI-compatible servers omit usage
        let usage = Self::get_usage(&response).unwrap_or_default();

        Ok(Completion { stop_reason, message, usage })
    }
}
