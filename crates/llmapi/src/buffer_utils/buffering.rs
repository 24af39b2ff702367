use crate::error::{LlmError, Result};
use std::collections::VecDeque;

/// Byte buffer that hands out complete `\n`-terminated lines.
///
/// Network chunks may split a line (or a UTF-8 sequence) anywhere, so bytes
/// are only decoded once the terminating newline has arrived.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n), trimmed.
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(decode(line_bytes))
    }

    /// Drain whatever is left once the input has ended without a final newline
    pub fn take_remaining(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line_bytes: Vec<u8> = self.buffer.drain(..).collect();
        Some(decode(line_bytes))
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode(line_bytes: Vec<u8>) -> Result<String> {
    match String::from_utf8(line_bytes) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(e) => Err(LlmError::parse(format!("Invalid UTF-8 in stream: {}", e))),
    }
}
