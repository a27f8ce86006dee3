use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::conversation::Conversation;
use crate::errors::{AgentError, AgentResult};
use crate::providers::base::{Completion, Provider, StopReason};
use crate::providers::types::message::Message;
use crate::tools::ToolRegistry;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Only use the functions you have been provided with.";
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Prefix of the tool-result message fed back to the model.
pub const TOOL_RESULT_PREFIX: &str = "The result of the last function was this: ";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub system_prompt: String,
    /// Upper bound on provider calls per conversation
    pub max_rounds: usize,
    /// Deadline applied to each provider call and each tool dispatch
    pub round_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_timeout: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> AgentResult<()> {
        if self.max_rounds == 0 {
            return Err(AgentError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.round_timeout == Some(Duration::ZERO) {
            return Err(AgentError::InvalidConfig(
                "round_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced a final answer.
    Answered,
    /// The round budget ran out first; the reply text carries a diagnostic dump.
    RoundsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub rounds_used: usize,
    pub outcome: Outcome,
}

/// Agent drives a bounded tool-calling conversation against a completion provider
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    config: AgentConfig,
}

impl Agent {
    /// Create a new Agent, failing fast if the tool catalog and registry disagree
    pub fn new(
        provider: Box<dyn Provider>,
        registry: ToolRegistry,
        config: AgentConfig,
    ) -> AgentResult<Self> {
        config.validate()?;
        registry.validate()?;
        Ok(Self {
            provider,
            registry,
            config,
        })
    }

    /// A fresh history holding only the configured system prompt
    pub fn new_conversation(&self) -> AgentResult<Conversation> {
        Conversation::new(&self.config.system_prompt)
            .map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Answer `user_input` in a private conversation
    pub async fn run_conversation(&self, user_input: &str) -> AgentResult<Reply> {
        let mut conversation = self.new_conversation()?;
        self.run(&mut conversation, user_input).await
    }

    /// Answer `user_input` within a caller-owned conversation.
    ///
    /// Each round asks the provider once. A tool call is dispatched and its
    /// result appended before the next round; a final answer ends the run.
    /// Running out of rounds is not an error: the reply then has
    /// [`Outcome::RoundsExhausted`] and a diagnostic text. On error nothing is
    /// appended for the failing round.
    pub async fn run(&self, conversation: &mut Conversation, user_input: &str) -> AgentResult<Reply> {
        let user_message =
            Message::user(user_input).map_err(|e| AgentError::Internal(e.to_string()))?;
        conversation.push(user_message);

        let max_rounds = self.config.max_rounds;
        for round in 0..max_rounds {
            debug!(round, messages = conversation.len(), "requesting completion");
            let completion = self.request_completion(conversation).await?;
            debug!(
                round,
                input_tokens = ?completion.usage.input_tokens,
                output_tokens = ?completion.usage.output_tokens,
                total_tokens = ?completion.usage.total_tokens,
                "completion received"
            );

            match completion.stop_reason {
                StopReason::ToolCall => {
                    self.dispatch_tool_call(conversation, completion.message)
                        .await?;
                }
                StopReason::Stop => {
                    let text = completion.message.text();
                    conversation.push(completion.message);
                    return Ok(Reply {
                        text,
                        rounds_used: round + 1,
                        outcome: Outcome::Answered,
                    });
                }
                StopReason::Other(reason) => {
                    warn!(round, %reason, "completion ended without an answer or a tool call");
                }
            }
        }

        warn!(max_rounds, "no answer within the round limit");
        Ok(self.rounds_exhausted(conversation))
    }

    async fn request_completion(&self, conversation: &Conversation) -> AgentResult<Completion> {
        let request = self
            .provider
            .complete(conversation.messages(), self.registry.definitions());

        let completion = match self.config.round_timeout {
            Some(limit) => timeout(limit, request).await.map_err(|_| {
                AgentError::Provider(format!("completion timed out after {:?}", limit))
            })?,
            None => request.await,
        };

        completion.map_err(|e| AgentError::provider(&e))
    }

    /// Run the first tool call of `message` and append the call with its result
    async fn dispatch_tool_call(
        &self,
        conversation: &mut Conversation,
        message: Message,
    ) -> AgentResult<()> {
        let mut tool_uses = message.tool_use().into_iter();
        let tool_use = tool_uses.next().ok_or_else(|| {
            AgentError::Provider("tool call response carried no tool call".to_string())
        })?;
        if tool_uses.len() > 0 {
            warn!(
                dropped = tool_uses.len(),
                "only the first tool call of a round is dispatched"
            );
        }

        if self.registry.get(&tool_use.name).is_none() {
            return Err(AgentError::ToolNotFound(tool_use.name));
        }
        let arguments = tool_use.arguments_map().ok_or_else(|| {
            AgentError::Provider(
                tool_use
                    .error_message
                    .clone()
                    .unwrap_or_else(|| format!("malformed arguments for {}", tool_use.name)),
            )
        })?;

        info!("{}({})", tool_use.name, render_arguments(arguments.values()));

        let dispatch = self.registry.dispatch(&tool_use.name, arguments);
        let result = match self.config.round_timeout {
            Some(limit) => timeout(limit, dispatch).await.map_err(|_| {
                AgentError::tool_invocation(&tool_use.name, format!("timed out after {:?}", limit))
            })??,
            None => dispatch.await?,
        };

        let output = format!("{}{}", TOOL_RESULT_PREFIX, result);
        let call = Message::tool_call(tool_use.clone())
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        let response = Message::tool_output(&tool_use.id, &tool_use.name, &output)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        conversation.push(call);
        conversation.push(response);
        Ok(())
    }

    fn rounds_exhausted(&self, conversation: &Conversation) -> Reply {
        Reply {
            text: format!(
                "The maximum number of iterations {} has been met without a suitable answer\n{}.\nPlease try again with a more specific input.",
                self.config.max_rounds,
                conversation.dump()
            ),
            rounds_used: self.config.max_rounds,
            outcome: Outcome::RoundsExhausted,
        }
    }
}

fn render_arguments<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
