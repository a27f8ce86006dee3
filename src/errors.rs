use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    /// The model asked for a tool the registry cannot resolve.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool {tool_name} failed: {cause}")]
    ToolInvocation { tool_name: String, cause: String },

    /// The completion request failed or came back malformed.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid tool registry: {0}")]
    InvalidRegistry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn tool_invocation(tool_name: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        AgentError::ToolInvocation {
            tool_name: tool_name.into(),
            cause: cause.to_string(),
        }
    }

    /// Flattens an `anyhow` chain so the cause survives the `Clone`/`Serialize` bounds.
    pub fn provider(cause: &anyhow::Error) -> Self {
        AgentError::Provider(format!("{:#}", cause))
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_display() {
        assert_eq!(
            AgentError::ToolNotFound("getTime".to_string()).to_string(),
            "Tool not found: getTime"
        );
        assert_eq!(
            AgentError::tool_invocation("getLocation", "connection refused").to_string(),
            "Tool getLocation failed: connection refused"
        );
    }

    #[test]
    fn test_provider_keeps_context_chain() {
        let err = Err::<(), _>(anyhow::anyhow!("502 Bad Gateway"))
            .context("completion request failed")
            .unwrap_err();
        assert_eq!(
            AgentError::provider(&err),
            AgentError::Provider("completion request failed: 502 Bad Gateway".to_string())
        );
    }
}
