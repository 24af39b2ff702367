#![allow(dead_code)]

use async_trait::async_trait;
use llmapi::{ChatRequest, EventStream, LlmError, Result, StreamEvent, Transport};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// What the mock answers with, for both modes
#[derive(Clone)]
pub enum Reply {
    Document(Value),
    Events(Vec<Result<StreamEvent>>),
    Fail(LlmError),
}

/// Transport that replays a fixed reply and records every request it sees
pub struct MockTransport {
    reply: Reply,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockTransport {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(content: &str) -> Arc<Self> {
        Self::new(Reply::Document(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })))
    }

    pub fn streaming(chunks: &[&str]) -> Arc<Self> {
        let mut events: Vec<Result<StreamEvent>> = chunks
            .iter()
            .map(|c| {
                Ok(StreamEvent::Delta {
                    content: c.to_string(),
                })
            })
            .collect();
        events.push(Ok(StreamEvent::Done {
            finish_reason: Some("stop".to_string()),
        }));
        Self::new(Reply::Events(events))
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Self::new(Reply::Fail(error))
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ChatRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Document(doc) => Ok(doc.clone()),
            Reply::Events(_) => Err(LlmError::unknown("mock only streams")),
            Reply::Fail(err) => Err(err.clone()),
        }
    }

    async fn send_stream(&self, request: &ChatRequest) -> Result<EventStream> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Events(events) => Ok(Box::pin(futures::stream::iter(events.clone()))),
            Reply::Document(_) => Err(LlmError::unknown("mock does not stream")),
            Reply::Fail(err) => Err(err.clone()),
        }
    }
}
