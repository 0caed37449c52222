// POST /api/chat handler: the streaming relay
//
// Persists the user message, forwards the conversation to the upstream
// provider, relays text deltas to the client as SSE events, and persists the
// accumulated response as the assistant message once the stream ends.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use futures::channel::mpsc;
use futures_util::StreamExt;
use tokio::sync::OwnedMutexGuard;
use warp::http::StatusCode;
use warp::sse::Event;

use crate::llm::{
    GenerateRequest, GenerationConfig, LlmProvider, Message, MessageRole, StreamEvent,
};
use crate::models::{ChatRequest, ErrorBody, Role};
use crate::sse::{create_content_event, create_done_event};
use crate::store::ChatStore;

/// One async mutex per conversation id, so concurrent chat requests against
/// the same conversation are serialized rather than interleaving their
/// history writes. Entries are never reaped; the map grows with the number of
/// conversations chatted in since startup.
#[derive(Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<parking_lot::Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a conversation
    pub async fn acquire(&self, conversation_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock();
            Arc::clone(map.entry(conversation_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Assistant message substituted when the upstream provider is unreachable or
/// unconfigured
pub fn fallback_message(user_message: &str) -> String {
    format!(
        "I'm currently operating in demo mode. To enable full AI capabilities:\n\
         \n\
         1. Sign up for a free Groq API key at https://console.groq.com\n\
         2. Set GROQ_API_KEY=your_key_here in the server environment\n\
         3. Restart the server\n\
         \n\
         Your message was: \"{}\"",
        user_message
    )
}

pub async fn send_chat_handler(
    request: ChatRequest,
    store: ChatStore,
    provider: Arc<dyn LlmProvider>,
    locks: ConversationLocks,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    // Reject empty input before any side effect
    if request.message.trim().is_empty() {
        return Ok(Box::new(warp::reply::with_status(
            warp::reply::json(&ErrorBody::new("Message is required")),
            StatusCode::BAD_REQUEST,
        )));
    }

    let conversation_id = request.conversation_id;
    tracing::info!(conversation_id, "chat turn started");

    // Held until the relay task finishes
    let guard = locks.acquire(conversation_id).await;

    if let Err(e) = store
        .append_message(conversation_id, Role::User, &request.message)
        .await
    {
        tracing::error!(conversation_id, error = %e, "failed to persist user message");
        return Ok(Box::new(warp::reply::with_status(
            warp::reply::json(&ErrorBody::new("Failed to process message")),
            StatusCode::INTERNAL_SERVER_ERROR,
        )));
    }

    // Full ordered history is the upstream context
    let history = match store.get_messages(conversation_id).await {
        Ok(messages) => messages
            .into_iter()
            .map(|msg| Message {
                role: match msg.role {
                    Role::User => MessageRole::User,
                    Role::Assistant => MessageRole::Assistant,
                },
                content: msg.content,
            })
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::error!(conversation_id, error = %e, "failed to fetch history");
            return Ok(Box::new(warp::reply::with_status(
                warp::reply::json(&ErrorBody::new("Failed to process message")),
                StatusCode::INTERNAL_SERVER_ERROR,
            )));
        }
    };

    // warp's SSE reply requires a Sync event stream, and the provider's
    // stream is only Send. The relay runs on its own task and feeds the
    // response through a channel; the receiver half satisfies the bound.
    let (tx, rx) = mpsc::unbounded();
    tokio::spawn(run_relay(
        store,
        provider,
        conversation_id,
        history,
        request.message,
        guard,
        tx,
    ));

    Ok(Box::new(warp::sse::reply(
        warp::sse::keep_alive().stream(rx),
    )))
}

/// Relay the upstream response to the client over the event channel
///
/// Every completed relay ends with exactly one persisted assistant message
/// followed by a done event: a clean upstream finish persists the full text,
/// a mid-stream interruption persists whatever accumulated, and an upstream
/// failure before any content persists the fallback message. A failed send
/// means the client is gone; forwarding stops and nothing is persisted.
async fn run_relay(
    store: ChatStore,
    provider: Arc<dyn LlmProvider>,
    conversation_id: i64,
    history: Vec<Message>,
    user_message: String,
    guard: OwnedMutexGuard<()>,
    tx: mpsc::UnboundedSender<Result<Event, Infallible>>,
) {
    let _guard = guard;

    let request = GenerateRequest {
        messages: history,
        config: GenerationConfig::default(),
    };

    let mut full_text = String::new();
    let mut upstream_failed = false;

    match provider.stream_generate(request).await {
        Ok(mut events) => {
            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        full_text.push_str(&text);
                        if tx.unbounded_send(create_content_event(&text)).is_err() {
                            tracing::warn!(
                                conversation_id,
                                "client disconnected mid-stream, discarding partial response"
                            );
                            return;
                        }
                    }
                    Ok(StreamEvent::Done { .. }) => break,
                    Err(e) => {
                        // Partial text accumulated so far is the answer
                        tracing::error!(conversation_id, error = %e, "upstream stream interrupted");
                        upstream_failed = true;
                        break;
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!(conversation_id, error = %e, "upstream unavailable");
            upstream_failed = true;
        }
    }

    // Nothing arrived before the failure: substitute the fallback so the
    // turn still produces exactly one assistant message.
    if upstream_failed && full_text.is_empty() {
        full_text = fallback_message(&user_message);
        if tx.unbounded_send(create_content_event(&full_text)).is_err() {
            tracing::warn!(conversation_id, "client disconnected, discarding fallback");
            return;
        }
    }

    if let Err(e) = store
        .append_message(conversation_id, Role::Assistant, &full_text)
        .await
    {
        tracing::error!(conversation_id, error = %e, "failed to persist assistant message");
    }

    tracing::info!(conversation_id, chars = full_text.len(), "chat turn finished");
    let _ = tx.unbounded_send(create_done_event());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::llm::{EventStream, FinishReason, LlmError};

    struct FixedProvider {
        chunks: Vec<&'static str>,
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        async fn stream_generate(
            &self,
            _request: GenerateRequest,
        ) -> Result<EventStream, LlmError> {
            let mut events: Vec<Result<StreamEvent, LlmError>> = self
                .chunks
                .iter()
                .map(|text| {
                    Ok(StreamEvent::TextDelta {
                        text: text.to_string(),
                    })
                })
                .collect();
            events.push(Ok(StreamEvent::Done {
                finish_reason: Some(FinishReason::Stop),
            }));

            Ok(Box::pin(futures::stream::iter(events)))
        }
    }

    #[test]
    fn test_fallback_message_mentions_demo_mode() {
        let text = fallback_message("hi");
        assert!(text.contains("demo mode"));
        assert!(text.contains("GROQ_API_KEY"));
        assert!(text.contains("\"hi\""));
    }

    #[tokio::test]
    async fn test_relay_feeds_channel_then_persists() {
        let store = ChatStore::open_in_memory().unwrap();
        let id = store.create_conversation("Chat").await.unwrap();
        store.append_message(id, Role::User, "hi").await.unwrap();

        let locks = ConversationLocks::new();
        let guard = locks.acquire(id).await;

        let (tx, rx) = mpsc::unbounded();
        run_relay(
            store.clone(),
            Arc::new(FixedProvider {
                chunks: vec!["Hel", "lo"],
            }),
            id,
            vec![Message::user("hi")],
            "hi".to_string(),
            guard,
            tx,
        )
        .await;

        // Two content events plus the terminal done event
        let events: Vec<_> = rx.collect().await;
        assert_eq!(events.len(), 3);

        let messages = store.get_messages(id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Hello");
    }

    #[tokio::test]
    async fn test_relay_discards_when_receiver_dropped() {
        let store = ChatStore::open_in_memory().unwrap();
        let id = store.create_conversation("Chat").await.unwrap();
        store.append_message(id, Role::User, "hi").await.unwrap();

        let locks = ConversationLocks::new();
        let guard = locks.acquire(id).await;

        let (tx, rx) = mpsc::unbounded();
        drop(rx);
        run_relay(
            store.clone(),
            Arc::new(FixedProvider {
                chunks: vec!["never seen"],
            }),
            id,
            vec![Message::user("hi")],
            "hi".to_string(),
            guard,
            tx,
        )
        .await;

        // Only the user message remains; the partial response was discarded
        let messages = store.get_messages(id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_conversation_locks_serialize_same_id() {
        let locks = ConversationLocks::new();
        let guard = locks.acquire(1).await;

        let locks2 = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = locks2.acquire(1).await;
        });

        // The second acquire must block while the first guard is held
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_conversation_locks_independent_ids() {
        let locks = ConversationLocks::new();
        let _guard = locks.acquire(1).await;

        // A different conversation is not blocked
        let other = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(other.is_ok());
    }
}
