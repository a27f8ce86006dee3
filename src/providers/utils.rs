use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

use super::base::StopReason;
use super::types::{
    content::{Content, Text, ToolUse},
    message::{Message, Role},
    tool::Tool,
};

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        for content in &message.content {
            match content {
                Content::Text(Text { text }) => {
                    converted["content"] = json!(text);
                }
                Content::ToolUse(tool_use) => {
                    let sanitized_name = sanitize_function_name(&tool_use.name);
                    // Undecodable arguments are kept as the raw string the model sent
                    let arguments = match &tool_use.arguments {
                        Value::String(raw) => raw.clone(),
                        other => other.to_string(),
                    };
                    if let Some(tool_calls) = converted
                        .as_object_mut()
                        .map(|object| object.entry("tool_calls").or_insert(json!([])))
                        .and_then(Value::as_array_mut)
                    {
                        tool_calls.push(json!({
                            "id": tool_use.id,
                            "type": "function",
                            "function": {
                                "name": sanitized_name,
                                "arguments": arguments,
                            }
                        }));
                    }
                }
                Content::ToolResult(tool_result) => {
                    converted["content"] = json!(tool_result.output);
                    converted["tool_call_id"] = json!(tool_result.tool_use_id);
                }
            }
        }

        if message.role == Role::Assistant && converted.get("content").is_none() {
            converted["content"] = Value::Null;
        }
        messages_spec.push(converted);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Read the stop reason of the first choice, inferring it from the message when absent
pub fn openai_stop_reason(response: &Value) -> StopReason {
    let choice = &response["choices"][0];
    match choice.get("finish_reason").and_then(Value::as_str) {
        Some(reason) => StopReason::from_finish_reason(reason),
        None if choice["message"].get("tool_calls").is_some_and(|calls| !calls.is_null()) => {
            StopReason::ToolCall
        }
        None => StopReason::Stop,
    }
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("Response has no choices[0].message: {}", response))?;
    let mut content = Vec::new();

    if let Some(text_str) = original.get("content").and_then(Value::as_str) {
        content.push(Content::Text(Text {
            text: text_str.to_string(),
        }));
    }

    if let Some(tool_calls_array) = original.get("tool_calls").and_then(Value::as_array) {
        for tool_call in tool_calls_array {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            content.push(Content::ToolUse(parse_tool_use(id, function_name, arguments)));
        }
    }

    Message::new(Role::Assistant, content)
}

fn parse_tool_use(id: String, function_name: String, arguments: String) -> ToolUse {
    if !is_valid_function_name(&function_name) {
        return ToolUse {
            id,
            error_message: Some(format!(
                "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                function_name
            )),
            name: function_name,
            arguments: json!(arguments),
            is_error: true,
        };
    }

    // Models send "" for functions without parameters
    let decoded = if arguments.trim().is_empty() {
        Ok(json!({}))
    } else {
        serde_json::from_str::<Value>(&arguments)
    };

    match decoded {
        Ok(params) if params.is_object() => ToolUse {
            id,
            name: function_name,
            arguments: params,
            is_error: false,
            error_message: None,
        },
        _ => ToolUse {
            error_message: Some(format!(
                "Could not interpret tool use parameters for id {}: {}",
                id, arguments
            )),
            id,
            name: function_name,
            arguments: json!(arguments),
            is_error: true,
        },
    }
}

fn function_name_regexes() -> &'static (Regex, Regex) {
    static REGEXES: OnceLock<(Regex, Regex)> = OnceLock::new();
    REGEXES.get_or_init(|| {
        (
            Regex::new(r"[^a-zA-Z0-9_-]").expect("invalid sanitize regex"),
            Regex::new(r"^[a-zA-Z0-9_-]+$").expect("invalid function name regex"),
        )
    })
}

fn sanitize_function_name(name: &str) -> String {
    function_name_regexes().0.replace_all(name, "_").to_string()
}

pub fn is_valid_function_name(name: &str) -> bool {
    function_name_regexes().1.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Input message too long. Message: {0}")]
pub struct InitialMessageTooLargeError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<InitialMessageTooLargeError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(InitialMessageTooLargeError(message))
    } else {
        None
    }
}
