use crate::error::{LlmError, Result};
use crate::types::{Message, Role};

/// Append-only transcript sent to the provider on every request.
///
/// Insertion order is the order the provider sees. The only way to remove
/// messages is [`Conversation::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, content: impl Into<String>) -> Result<()> {
        self.add(Role::User, content.into())
    }

    pub fn add_system(&mut self, content: impl Into<String>) -> Result<()> {
        self.add(Role::System, content.into())
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) -> Result<()> {
        self.add(Role::Assistant, content.into())
    }

    /// Append a message with the given role; empty content is rejected.
    pub fn add(&mut self, role: Role, content: String) -> Result<()> {
        if content.is_empty() {
            return Err(LlmError::invalid_argument(format!(
                "{} message content must not be empty",
                role.as_str()
            )));
        }
        self.messages.push(Message::new(role, content));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the most recently appended assistant message.
    pub fn last_assistant_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|msg| msg.role() == Role::Assistant)
            .map(Message::content)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}
