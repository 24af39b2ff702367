use std::fmt::Display;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::buffer_utils::CircularLineBuffer;
use crate::error::{LlmError, Result};
use crate::response::extract_error;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental answer text, forwarded verbatim
    Delta {
        content: String,
    },

    /// The provider signalled the end of the answer
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

// Some providers send `"delta": null` on the final chunk.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatStreamChunk {
    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Delta {
                        content: content.clone(),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Decode one SSE line into events. Non-`data` lines (comments, `event:`,
/// `id:`) carry nothing for chat completions and yield no events.
fn decode_line(line: &str) -> Result<Vec<StreamEvent>> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(Vec::new());
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(vec![StreamEvent::Done { finish_reason: None }]);
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|e| LlmError::parse(format!("Failed to parse chat chunk: {}", e)))?;

    if let Some(message) = extract_error(&value) {
        return Err(LlmError::network(format!("Provider error in stream: {}", message)));
    }

    let chunk: ChatStreamChunk = serde_json::from_value(value)
        .map_err(|e| LlmError::parse(format!("Unexpected chat chunk shape: {}", e)))?;
    Ok(chunk.to_stream_events())
}

/// Turn a body of `text/event-stream` bytes into chat stream events.
///
/// The stream stops after the first `Done` or the first error. If the body
/// ends without a completion marker the stream simply ends; callers decide
/// what an unterminated stream means.
pub fn parse_chat_sse_stream<S, B, E>(body: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(body);
        let mut buffer = CircularLineBuffer::with_capacity(8192);
        let mut finished = false;

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        let events = match line_result.and_then(|line| decode_line(&line)) {
                            Ok(events) => events,
                            Err(e) => {
                                yield Err(e);
                                finished = true;
                                break 'read;
                            }
                        };

                        for event in events {
                            let is_done = matches!(event, StreamEvent::Done { .. });
                            yield Ok(event);
                            if is_done {
                                finished = true;
                                break 'read;
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(LlmError::network(format!("Stream error: {}", e)));
                    finished = true;
                    break 'read;
                }
            }
        }

        if !finished {
            if let Some(line_result) = buffer.take_remaining() {
                match line_result.and_then(|line| decode_line(&line)) {
                    Ok(events) => {
                        for event in events {
                            let is_done = matches!(event, StreamEvent::Done { .. });
                            yield Ok(event);
                            if is_done {
                                break;
                            }
                        }
                    }
                    Err(e) => yield Err(e),
                }
            }
        }
    })
}
