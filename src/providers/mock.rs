use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::providers::base::{Completion, Provider, StopReason, Usage};
use crate::providers::types::content::ToolUse;
use crate::providers::types::message::Message;
use crate::providers::types::tool::Tool;

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Mutex<VecDeque<Completion>>,
    repeat: Option<Completion>,
    seen: Mutex<Vec<usize>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Completion>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A provider answering every call with the same completion
    pub fn repeating(completion: Completion) -> Self {
        Self {
            repeat: Some(completion),
            ..Self::new(Vec::new())
        }
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Conversation length observed by each call, in call order
    pub fn conversation_lengths(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, messages: &[Message], _tools: &[Tool]) -> Result<Completion> {
        self.seen.lock().unwrap().push(messages.len());
        let next = self.responses.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| anyhow!("no scripted responses left"))
    }
}

pub fn final_answer(text: &str) -> Completion {
    Completion {
        stop_reason: StopReason::Stop,
        message: Message::assistant(text).unwrap(),
        usage: Usage::default(),
    }
}

pub fn tool_call(name: &str, arguments: Value) -> Completion {
    let arguments = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Completion {
        stop_reason: StopReason::ToolCall,
        message: Message::tool_call(ToolUse::new("call_mock", name, arguments)).unwrap(),
        usage: Usage::default(),
    }
}
