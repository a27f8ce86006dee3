use anyhow::Result;
use serde::Serialize;

use crate::providers::types::content::Content;
use crate::providers::types::message::{Message, Role};

/// Append-only message history owned by a single conversation run.
///
/// Always starts with the system message, so it is never empty.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: &str) -> Result<Self> {
        Ok(Self {
            messages: vec![Message::system(system_prompt)?],
        })
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Pretty JSON rendering of the whole history, for diagnostics.
    ///
    /// Only roles and content are rendered, so replaying the same turns yields the same text.
    pub fn dump(&self) -> String {
        let turns: Vec<Turn<'_>> = self
            .messages
            .iter()
            .map(|message| Turn {
                role: message.role,
                content: &message.content,
            })
            .collect();
        serde_json::to_string_pretty(&turns).unwrap_or_else(|_| format!("{:#?}", turns))
    }
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: Role,
    content: &'a [Content],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_system_message() -> Result<()> {
        let conversation = Conversation::new("You are a helpful assistant.")?;
        assert_eq!(conversation.len(), 1);
        assert!(!conversation.is_empty());
        assert_eq!(conversation.messages()[0].role, Role::System);
        Ok(())
    }

    #[test]
    fn test_push_appends_in_order() -> Result<()> {
        let mut conversation = Conversation::new("system")?;
        conversation.push(Message::user("hi")?);
        conversation.push(Message::assistant("hello")?);

        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant]);
        assert_eq!(conversation.last().map(Message::text), Some("hello".to_string()));
        Ok(())
    }

    #[test]
    fn test_dump_is_json_array() -> Result<()> {
        let mut conversation = Conversation::new("system")?;
        conversation.push(Message::user("hi")?);

        let dumped: serde_json::Value = serde_json::from_str(&conversation.dump())?;
        assert_eq!(dumped.as_array().map(Vec::len), Some(2));
        assert_eq!(dumped[1]["role"], "user");
        Ok(())
    }

    #[test]
    fn test_dump_leaves_out_ids_and_timestamps() -> Result<()> {
        let build = || -> Result<Conversation> {
            let mut conversation = Conversation::new("system")?;
            conversation.push(Message::user("hi")?);
            conversation.push(Message::tool_output("call_1", "getLocation", "{}")?);
            Ok(conversation)
        };
        let first = build()?;
        let second = build()?;

        assert_ne!(first.messages()[1].id, second.messages()[1].id);
        assert_eq!(first.dump(), second.dump());

        let dumped: serde_json::Value = serde_json::from_str(&first.dump())?;
        assert!(dumped[1].get("id").is_none());
        assert!(dumped[1].get("created").is_none());
        assert_eq!(dumped[2]["content"][0]["tool_use_id"], "call_1");
        Ok(())
    }
}
