use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use anyhow::{Result, anyhow};

use super::content::{Content, Text, ToolUse, ToolResult};
use super::objectid::create_object_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub id: String,
    pub created: i64,
    pub content: Vec<Content>,
}

impl Message {
    pub fn new(role: Role, content: Vec<Content>) -> Result<Self> {
        let msg = Self {
            role,
            id: create_object_id("msg"),
            created: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default(),
            content,
        };
        msg.validate()?;
        Ok(msg)
    }

    fn validate(&self) -> Result<()> {
        match self.role {
            Role::System | Role::User => {
                if !self.has_text() {
                    return Err(anyhow!("{:?} message must include a Text", self.role));
                }
                if self.has_tool_use() || self.has_tool_result() {
                    return Err(anyhow!("{:?} message only supports Text", self.role));
                }
            }
            Role::Assistant => {
                if !self.has_text() && !self.has_tool_use() {
                    return Err(anyhow!("Assistant message must include a Text or ToolUse"));
                }
                if self.has_tool_result() {
                    return Err(anyhow!("Assistant message does not support ToolResult"));
                }
            }
            Role::Tool => {
                if self.content.len() != 1 || !self.has_tool_result() {
                    return Err(anyhow!("Tool message must hold exactly one ToolResult"));
                }
            }
        }
        Ok(())
    }

    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_use(&self) -> Vec<ToolUse> {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::ToolUse(tool_use) => Some(tool_use.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_result(&self) -> Vec<ToolResult> {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::ToolResult(tool_result) => Some(tool_result.clone()),
                _ => None,
            })
            .collect()
    }

    fn has_text(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::Text(_)))
    }

    fn has_tool_use(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::ToolUse(_)))
    }

    fn has_tool_result(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::ToolResult(_)))
    }

    pub fn system(text: &str) -> Result<Self> {
        Self::new(Role::System, vec![Content::Text(Text { text: text.to_string() })])
    }

    pub fn user(text: &str) -> Result<Self> {
        Self::new(Role::User, vec![Content::Text(Text { text: text.to_string() })])
    }

    pub fn assistant(text: &str) -> Result<Self> {
        Self::new(Role::Assistant, vec![Content::Text(Text { text: text.to_string() })])
    }

    /// Assistant turn asking for a single tool invocation.
    pub fn tool_call(tool_use: ToolUse) -> Result<Self> {
        Self::new(Role::Assistant, vec![Content::ToolUse(tool_use)])
    }

    /// Tool turn carrying the serialized result of `tool_use_id`.
    pub fn tool_output(tool_use_id: &str, name: &str, output: &str) -> Result<Self> {
        Self::new(
            Role::Tool,
            vec![Content::ToolResult(ToolResult {
                tool_use_id: tool_use_id.to_string(),
                name: name.to_string(),
                output: output.to_string(),
            })],
        )
    }
}
