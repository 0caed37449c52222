//! Server-Sent Events (SSE) parser for Groq responses
//!
//! Groq's OpenAI-compatible SSE format is a sequence of `data:` blocks
//! separated by a blank line, terminated by a `[DONE]` sentinel:
//! ```text
//! data: {"id":"chatcmpl-123","choices":[{"delta":{"content":"Hi"}, ...}]}
//!
//! data: [DONE]
//! ```
//!
//! This parser:
//! 1. Buffers incoming bytes
//! 2. Scans for event boundaries (double newline)
//! 3. Extracts and parses JSON from `data:` lines
//! 4. Returns a stream of parsed events
//!
//! Transport chunk boundaries carry no meaning; an event split across any
//! number of chunks reassembles identically. Buffering stays in bytes and
//! only complete events are decoded, so a multi-byte character split across
//! chunks is not an error.

use bytes::{Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::{ChatCompletionChunk, GroqStreamEvent};

/// Parse a stream of bytes as Groq SSE events
pub fn parse_sse_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<GroqStreamEvent, LlmError>> + Send>> {
    // Buffer to accumulate partial events, kept as raw bytes so a chunk may
    // end in the middle of a multi-byte character
    let mut buffer = BytesMut::new();

    let event_stream = byte_stream.flat_map(move |chunk_result| {
        let chunk = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
            }
        };

        buffer.extend_from_slice(&chunk);

        // Process complete events (delimited by \n\n); only those are
        // decoded, so text is validated on event boundaries
        let mut events = Vec::new();
        while let Some(event_end) = find_event_boundary(&buffer) {
            let event_bytes = buffer.split_to(event_end + 2); // Event + both newlines

            match std::str::from_utf8(&event_bytes[..event_end]) {
                Ok(event_text) => {
                    if let Some(parsed_event) = parse_event(event_text) {
                        events.push(parsed_event);
                    }
                }
                Err(e) => {
                    events.push(Err(LlmError::StreamError(format!(
                        "Invalid UTF-8 in stream: {}",
                        e
                    ))));
                }
            }
        }

        // Return all events found in this chunk
        futures::stream::iter(events)
    });

    Box::pin(event_stream)
}

fn find_event_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\n\n")
}

/// Parse a single SSE event from its text representation
fn parse_event(event_text: &str) -> Option<Result<GroqStreamEvent, LlmError>> {
    let mut data: Option<String> = None;

    for line in event_text.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        // Comment lines (keep-alives) start with a colon
        if line.starts_with(':') {
            continue;
        }

        if let Some(data_val) = line.strip_prefix("data:") {
            data = Some(data_val.trim().to_string());
        }
    }

    // We need data to parse an event
    let data = data?;

    if data.is_empty() {
        return None;
    }

    // Terminal sentinel
    if data == "[DONE]" {
        return Some(Ok(GroqStreamEvent::Done));
    }

    match serde_json::from_str::<ChatCompletionChunk>(&data) {
        Ok(chunk) => Some(Ok(GroqStreamEvent::Chunk(chunk))),
        Err(e) => Some(Err(LlmError::SerializationError(format!(
            "Failed to parse Groq SSE chunk: {}. Data: {}",
            e, data
        )))),
    }
}
