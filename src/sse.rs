use std::convert::Infallible;
use warp::sse::Event;

/// Create a content SSE event carrying one text fragment
pub fn create_content_event(chunk: &str) -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "content": chunk
    });

    Ok(Event::default().data(payload.to_string()))
}

/// Create a done SSE event to signal stream completion
pub fn create_done_event() -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "done": true
    });

    Ok(Event::default().data(payload.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_content_event() {
        // Test that the function creates an event without panicking
        let result = create_content_event("Hello world");
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_done_event() {
        let result = create_done_event();
        assert!(result.is_ok());
    }

    #[test]
    fn test_content_payload_format() {
        let payload = serde_json::json!({
            "content": "Hello world"
        });
        assert_eq!(payload.to_string(), r#"{"content":"Hello world"}"#);
    }

    #[test]
    fn test_done_payload_format() {
        let payload = serde_json::json!({
            "done": true
        });
        assert_eq!(payload.to_string(), r#"{"done":true}"#);
    }
}
