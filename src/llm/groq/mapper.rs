//! Mapping between abstraction types and Groq-specific types

use crate::llm::core::types::{
    FinishReason, GenerateRequest, Message, MessageRole, StreamEvent,
};

use super::types::{ChatCompletionRequest, GroqMessage, GroqStreamEvent};

/// Convert our abstraction request to Groq's request format
pub fn to_groq_request(model: &str, request: GenerateRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: request.messages.into_iter().map(to_groq_message).collect(),
        max_tokens: Some(request.config.max_tokens),
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        stop: request.config.stop_sequences,
        stream: true,
    }
}

/// Convert our Message to Groq's GroqMessage
fn to_groq_message(message: Message) -> GroqMessage {
    let role = match message.role {
        MessageRole::User => "user".to_string(),
        MessageRole::Assistant => "assistant".to_string(),
    };

    GroqMessage {
        role,
        content: message.content,
    }
}

/// Convert a Groq stream event to our abstraction's StreamEvent
///
/// Returns a vector because one chunk can carry both a text delta and a
/// finish reason.
pub fn from_groq_event(event: GroqStreamEvent) -> Vec<StreamEvent> {
    match event {
        GroqStreamEvent::Chunk(chunk) => {
            let mut events = Vec::new();

            // Only the first choice is requested
            if let Some(choice) = chunk.choices.into_iter().next() {
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        events.push(StreamEvent::TextDelta { text });
                    }
                }

                if let Some(reason) = choice.finish_reason {
                    events.push(StreamEvent::Done {
                        finish_reason: Some(FinishReason::parse(&reason)),
                    });
                }
            }

            events
        }
        GroqStreamEvent::Done => vec![StreamEvent::Done {
            finish_reason: None,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::config::GenerationConfig;
    use crate::llm::groq::types::{ChatCompletionChunk, ChunkChoice, ChunkDelta};

    fn chunk(content: Option<&str>, finish_reason: Option<&str>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: "chatcmpl-1".to_string(),
            model: None,
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: None,
                    content: content.map(|s| s.to_string()),
                },
                finish_reason: finish_reason.map(|s| s.to_string()),
            }],
        }
    }

    #[test]
    fn test_to_groq_request() {
        let request = GenerateRequest {
            messages: vec![Message::user("hi"), Message::assistant("hello")],
            config: GenerationConfig::default(),
        };

        let groq = to_groq_request("llama-3.1-70b-versatile", request);
        assert_eq!(groq.model, "llama-3.1-70b-versatile");
        assert!(groq.stream);
        assert_eq!(groq.max_tokens, Some(8000));
        assert_eq!(groq.messages.len(), 2);
        assert_eq!(groq.messages[0].role, "user");
        assert_eq!(groq.messages[1].role, "assistant");
        assert_eq!(groq.messages[1].content, "hello");
    }

    #[test]
    fn test_content_chunk_maps_to_text_delta() {
        let events = from_groq_event(GroqStreamEvent::Chunk(chunk(Some("Hello"), None)));
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                text: "Hello".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_delta_maps_to_nothing() {
        let events = from_groq_event(GroqStreamEvent::Chunk(chunk(None, None)));
        assert!(events.is_empty());

        let events = from_groq_event(GroqStreamEvent::Chunk(chunk(Some(""), None)));
        assert!(events.is_empty());
    }

    #[test]
    fn test_finish_reason_maps_to_done() {
        let events = from_groq_event(GroqStreamEvent::Chunk(chunk(None, Some("stop"))));
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                finish_reason: Some(FinishReason::Stop)
            }]
        );
    }

    #[test]
    fn test_chunk_with_text_and_finish_reason_splits() {
        let events = from_groq_event(GroqStreamEvent::Chunk(chunk(Some("bye"), Some("length"))));
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            StreamEvent::TextDelta {
                text: "bye".to_string()
            }
        );
        assert_eq!(
            events[1],
            StreamEvent::Done {
                finish_reason: Some(FinishReason::Length)
            }
        );
    }

    #[test]
    fn test_done_sentinel_maps_to_done() {
        let events = from_groq_event(GroqStreamEvent::Done);
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                finish_reason: None
            }]
        );
    }
}
