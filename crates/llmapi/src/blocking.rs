//! Synchronous facade over [`crate::Client`].
//!
//! Each instance owns a current-thread runtime, so a request blocks the
//! calling thread and stream callbacks run on that same thread. Do not use
//! it from inside another async runtime; `block_on` would panic there.

use crate::config::{BaseUrl, ClientConfig};
use crate::conversation::Conversation;
use crate::error::{LlmError, Result};
use crate::transport::Transport;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

#[derive(Debug)]
pub struct Client {
    inner: crate::Client,
    runtime: Runtime,
}

impl Client {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<BaseUrl>) -> Result<Self> {
        Self::from_async(crate::Client::new(api_key, base_url)?)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Self::from_async(crate::Client::from_config(config)?)
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::from_async(crate::Client::with_transport(config, transport))
    }

    /// Wrap an async client, giving it a runtime of its own
    pub fn from_async(inner: crate::Client) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to start runtime: {}", e)))?;
        Ok(Self { inner, runtime })
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> Result<&mut Self> {
        self.inner.set_model(model)?;
        Ok(self)
    }

    pub fn model(&self) -> Option<&str> {
        self.inner.model()
    }

    pub fn user(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.inner.user(content)?;
        Ok(self)
    }

    pub fn system(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.inner.system(content)?;
        Ok(self)
    }

    pub fn assistant(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.inner.assistant(content)?;
        Ok(self)
    }

    pub fn clear(&mut self) -> &mut Self {
        self.inner.clear();
        self
    }

    pub fn message_count(&self) -> usize {
        self.inner.message_count()
    }

    pub fn answer(&self) -> Option<&str> {
        self.inner.answer()
    }

    pub fn conversation(&self) -> &Conversation {
        self.inner.conversation()
    }

    /// See [`crate::Client::request`]
    pub fn request(&mut self) -> Result<String> {
        self.runtime.block_on(self.inner.request())
    }

    /// See [`crate::Client::request_with`]
    pub fn request_with<T, F>(&mut self, accept: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        self.runtime.block_on(self.inner.request_with(accept))
    }

    /// See [`crate::Client::request_stream`]
    pub fn request_stream<F>(&mut self, on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        self.runtime.block_on(self.inner.request_stream(on_chunk))
    }
}
