#![allow(dead_code)]

use async_trait::async_trait;
use llmapi::{
    blocking, ChatRequest, ClientConfig, EventStream, LlmError, Result, StreamEvent, Transport,
};
use llmapi_ffi::{into_raw_handle, llmapi_free_string, LlmapiClient};
use serde_json::{json, Value};
use std::ffi::{c_char, CStr};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub enum Reply {
    Document(Value),
    Events(Vec<Result<StreamEvent>>),
    Fail(LlmError),
    Panic(&'static str),
}

/// Canned transport; counts the requests it receives
pub struct MockTransport {
    reply: Reply,
    sent: Mutex<usize>,
}

impl MockTransport {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            sent: Mutex::new(0),
        })
    }

    pub fn answering(content: &str) -> Arc<Self> {
        Self::new(Reply::Document(json!({
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

    pub fn panicking(message: &'static str) -> Arc<Self> {
        Self::new(Reply::Panic(message))
    }

    pub fn request_count(&self) -> usize {
        *self.sent.lock().unwrap()
    }

    fn record(&self) {
        *self.sent.lock().unwrap() += 1;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, _request: &ChatRequest) -> Result<Value> {
        self.record();
        match &self.reply {
            Reply::Document(doc) => Ok(doc.clone()),
            Reply::Events(_) => Err(LlmError::unknown("mock only streams")),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Panic(message) => panic!("{}", message),
        }
    }

    async fn send_stream(&self, _request: &ChatRequest) -> Result<EventStream> {
        self.record();
        match &self.reply {
            Reply::Events(events) => Ok(Box::pin(futures::stream::iter(events.clone()))),
            Reply::Document(_) => Err(LlmError::unknown("mock does not stream")),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Panic(message) => panic!("{}", message),
        }
    }
}

/// A C handle over `transport`, with `model` preselected when given
pub fn handle_over(transport: Arc<MockTransport>, model: Option<&str>) -> *mut LlmapiClient {
    let mut config = ClientConfig::new("test-key");
    if let Some(model) = model {
        config = config.with_model(model);
    }
    let client = blocking::Client::with_transport(config, transport).unwrap();
    into_raw_handle(client)
}

/// Copy out and release a string returned by the library
pub fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null());
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
    unsafe { llmapi_free_string(ptr) };
    text
}

pub fn borrowed(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string())
    }
}
