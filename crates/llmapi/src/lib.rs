//! Client for OpenAI-compatible chat completion APIs.
//!
//! A [`Client`] keeps one conversation, sends it to `/chat/completions`
//! either whole or streaming, and appends the assistant's reply to the
//! transcript. [`blocking::Client`] is the synchronous variant used by the
//! C bindings.

pub mod blocking;
pub mod buffer_utils;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod request;
pub mod response;
pub mod streaming;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::{BaseUrl, ClientConfig, URL_OPENAI, URL_POE};
pub use conversation::Conversation;
pub use error::{ErrorKind, LlmError, Result};
pub use request::ChatRequest;
pub use streaming::{EventStream, StreamEvent};
pub use transport::{HttpTransport, Transport};
pub use types::{Message, Role};
