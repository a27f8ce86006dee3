use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

/// A request from the model to invoke a tool.
///
/// `arguments` holds the decoded argument object in the order the model sent
/// it. When the model produced something that could not be interpreted, the
/// raw payload is kept as a JSON string and `is_error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    #[serde(default)]
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ToolUse {
    pub fn new<S: Into<String>>(id: S, name: S, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: Value::Object(arguments),
            is_error: false,
            error_message: None,
        }
    }

    /// The argument mapping, if the model sent a well-formed object.
    pub fn arguments_map(&self) -> Option<&Map<String, Value>> {
        if self.is_error {
            return None;
        }
        self.arguments.as_object()
    }
}

// Tool result content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub name: String,
    pub output: String,
}

// Enum to handle all content types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    Text(Text),
    ToolUse(ToolUse),
    ToolResult(ToolResult),
}
