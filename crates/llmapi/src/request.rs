use crate::config::ClientConfig;
use crate::conversation::Conversation;
use crate::error::{LlmError, Result};
use crate::types::Message;
use serde::{Deserialize, Serialize};

/// Body of a `POST /chat/completions` call.
///
/// A snapshot of the transcript taken when the request is built; it is not
/// kept once the request completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

impl ChatRequest {
    /// Snapshot `conversation` into a request for the configured model.
    ///
    /// Fails with `InvalidState` when no model is set (checked first) or the
    /// transcript is empty.
    pub fn build(config: &ClientConfig, conversation: &Conversation, stream: bool) -> Result<Self> {
        let model = config
            .model
            .as_deref()
            .filter(|model| !model.is_empty())
            .ok_or_else(|| LlmError::invalid_state("model is not set; call set_model first"))?;

        if conversation.is_empty() {
            return Err(LlmError::invalid_state(
                "conversation is empty; add a message before requesting",
            ));
        }

        Ok(Self {
            model: model.to_string(),
            messages: conversation.messages().to_vec(),
            stream,
        })
    }
}
