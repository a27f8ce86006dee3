use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::message::Message;
use super::types::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The model wants a tool invoked before it continues.
    ToolCall,
    /// The model produced its final answer.
    Stop,
    /// Anything else the provider reported, e.g. `length` or `content_filter`.
    Other(String),
}

impl StopReason {
    pub fn from_finish_reason(reason: &str) -> Self {
        match reason {
            "tool_calls" | "function_call" => StopReason::ToolCall,
            "stop" => StopReason::Stop,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// One completion returned by a provider.
#[derive(Debug, Clone)]
pub struct Completion {
    pub stop_reason: StopReason,
    pub message: Message,
    pub usage: Usage,
}

/// Base trait for AI providers (OpenAI, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message for the full conversation, advertising `tools` to the model
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<Completion>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<Completion> {
        (**self).complete(messages, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_creation() {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(20));
        assert_eq!(usage.total_tokens, Some(30));
    }

    #[test]
    fn test_usage_serialization() -> Result<()> {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        let json_value = serde_json::to_value(&usage)?;
        assert_eq!(json_value["input_tokens"], json!(10));
        assert_eq!(json_value["output_tokens"], json!(20));
        assert_eq!(json_value["total_tokens"], json!(30));
        Ok(())
    }

    #[test]
    fn test_stop_reason_from_finish_reason() {
        assert_eq!(StopReason::from_finish_reason("tool_calls"), StopReason::ToolCall);
        assert_eq!(StopReason::from_finish_reason("function_call"), StopReason::ToolCall);
        assert_eq!(StopReason::from_finish_reason("stop"), StopReason::Stop);
        assert_eq!(
            StopReason::from_finish_reason("length"),
            StopReason::Other("length".to_string())
        );
    }
}
