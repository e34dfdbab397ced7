//! Streaming support for LLM responses.
//!
//! The backend streams newline-delimited JSON. Network chunks do not line up
//! with frame boundaries, so bytes are buffered until a full line is present.

use tokio::sync::mpsc;

use super::types::ResponseFrame;
use crate::error::{Result, RouterError};

/// Chunk types emitted to consumers during streaming.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Text content delta
    Text(String),
    /// Stream completed successfully
    Done,
    /// Stream error
    Error(String),
}

/// Handle for receiving streaming chunks.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamChunk>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamChunk>) -> Self {
        Self { receiver }
    }

    /// Receive the next chunk from the stream.
    pub async fn recv(&mut self) -> Option<StreamChunk> {
        self.receiver.recv().await
    }

    /// Collect all text from the stream into a single string.
    #[cfg(test)]
    pub(crate) async fn collect_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(chunk) = self.recv().await {
            match chunk {
                StreamChunk::Text(t) => text.push_str(&t),
                StreamChunk::Done | StreamChunk::Error(_) => break,
            }
        }
        text
    }
}

/// Builder for stream handle pairs (sender and handle).
pub fn create_stream_channel(buffer_size: usize) -> (mpsc::Sender<StreamChunk>, StreamHandle) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (tx, StreamHandle::new(rx))
}

/// Splits a byte stream into complete lines.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, get back every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Whatever is left once the stream has ended without a trailing newline.
    pub fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.buffer).trim().to_string();
        if rest.is_empty() { None } else { Some(rest) }
    }
}

/// Parse one NDJSON line into a frame.
pub fn parse_frame(line: &str) -> Result<ResponseFrame> {
    serde_json::from_str(line).map_err(|e| RouterError::InvalidResponse(format!("bad stream frame '{}': {}", line, e)))
}

/// State tracker for parsing streaming responses.
#[derive(Debug, Default)]
pub struct StreamParser {
    /// Accumulated text content
    pub text_content: String,
    /// Set once a `done` frame has been seen
    pub finished: bool,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a frame and emit chunks.
    pub fn process_frame(&mut self, frame: ResponseFrame) -> Vec<StreamChunk> {
        let mut chunks = Vec::new();

        if let Some(message) = frame.error {
            chunks.push(StreamChunk::Error(message));
            return chunks;
        }

        if let Some(text) = frame.text()
            && !text.is_empty()
        {
            self.text_content.push_str(text);
            chunks.push(StreamChunk::Text(text.to_string()));
        }

        if frame.done {
            self.finished = true;
            chunks.push(StreamChunk::Done);
        }

        chunks
    }
}
