use crate::config::{BaseUrl, ClientConfig};
use crate::conversation::Conversation;
use crate::error::{LlmError, Result};
use crate::request::ChatRequest;
use crate::response::extract_content;
use crate::streaming::StreamEvent;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Message, Role};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;

/// Chat client holding one conversation.
///
/// Every successful request appends exactly one assistant message; a failed
/// request leaves the transcript as it was. Request methods take `&mut self`,
/// so one instance never has two requests in flight.
///
/// ```rust,no_run
/// # async fn run() -> llmapi::Result<()> {
/// let mut client = llmapi::Client::new("sk-...", llmapi::BaseUrl::Poe)?;
/// client.set_model("gpt-5")?.system("You are a helpful assistant.")?;
/// client.user("What is the capital of China?")?;
/// let answer = client.request().await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    config: ClientConfig,
    conversation: Conversation,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client talking HTTP to `base_url` with the given bearer key
    pub fn new(api_key: impl Into<String>, base_url: impl Into<BaseUrl>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key).with_base_url(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client sending through a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            conversation: Conversation::new(),
            transport,
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> Result<&mut Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LlmError::invalid_argument("model must not be empty"));
        }
        self.config.model = Some(model);
        Ok(self)
    }

    pub fn model(&self) -> Option<&str> {
        self.config.model.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn user(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.conversation.add_user(content)?;
        Ok(self)
    }

    pub fn system(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.conversation.add_system(content)?;
        Ok(self)
    }

    pub fn assistant(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.conversation.add_assistant(content)?;
        Ok(self)
    }

    pub fn clear(&mut self) -> &mut Self {
        self.conversation.clear();
        self
    }

    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Latest assistant answer, if the transcript has one
    pub fn answer(&self) -> Option<&str> {
        self.conversation.last_assistant_answer()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Send the transcript and wait for the whole answer.
    pub async fn request(&mut self) -> Result<String> {
        self.request_with(|answer| Ok(answer.to_string())).await
    }

    /// Like [`Client::request`], but `accept` sees the answer before it is
    /// committed. An error from `accept` fails the turn and leaves the
    /// transcript untouched.
    pub async fn request_with<T, F>(&mut self, accept: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        let request = ChatRequest::build(&self.config, &self.conversation, false)?;
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream = false,
            "sending chat request"
        );

        let document = self.transport.send(&request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "chat request failed");
        })?;
        let answer = extract_content(&document).inspect_err(|e| {
            tracing::warn!(error = %e, "chat response carried no answer");
        })?;

        let accepted = accept(&answer).inspect_err(|e| {
            tracing::warn!(error = %e, "chat answer rejected");
        })?;
        self.commit(answer)?;
        Ok(accepted)
    }

    /// Send the transcript in streaming mode.
    ///
    /// `on_chunk` runs in-line for every non-empty delta, in receipt order.
    /// The accumulated answer is committed and returned only once the
    /// provider signals completion; a stream that drops first is a
    /// `Network` error and nothing is committed.
    pub async fn request_stream<F>(&mut self, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let request = ChatRequest::build(&self.config, &self.conversation, true)?;
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream = true,
            "sending chat request"
        );

        let mut events = self.transport.send_stream(&request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "chat stream request failed");
        })?;

        let mut answer = String::new();
        let mut completed = false;
        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::Delta { content }) => {
                    on_chunk(&content);
                    answer.push_str(&content);
                }
                Ok(StreamEvent::Done { finish_reason }) => {
                    tracing::trace!(?finish_reason, "chat stream completed");
                    completed = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, received = answer.len(), "chat stream failed");
                    return Err(e);
                }
            }
        }

        if !completed {
            tracing::warn!(received = answer.len(), "chat stream closed early");
            return Err(LlmError::network(
                "stream closed before the completion marker",
            ));
        }
        if answer.is_empty() {
            return Err(LlmError::empty_response("stream completed without content"));
        }

        self.commit(answer.clone())?;
        Ok(answer)
    }

    fn commit(&mut self, answer: String) -> Result<()> {
        self.conversation.add(Role::Assistant, answer)?;
        tracing::debug!(messages = self.conversation.len(), "assistant turn committed");
        Ok(())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("messages", &self.conversation.len())
            .finish_non_exhaustive()
    }
}
