// Reading answer text out of provider response documents

use crate::error::{LlmError, Result};
use serde_json::Value;

/// Extract `choices[0].message.content` from a non-streaming response body.
///
/// A missing path, a non-text value and an empty string are all
/// `EmptyResponse`; the body itself was well formed.
pub fn extract_content(document: &Value) -> Result<String> {
    let content = document
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::empty_response("No content in response"))?;

    if content.is_empty() {
        return Err(LlmError::empty_response("Response content is empty"));
    }

    Ok(content.to_string())
}

/// Provider error message carried in a body or stream chunk, if any
pub fn extract_error(document: &Value) -> Option<String> {
    let error = document.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(message)
}
