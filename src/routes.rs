// Route definitions and state injection

use std::convert::Infallible;
use std::sync::Arc;

use warp::Filter;

use crate::handlers::{self, ConversationLocks};
use crate::llm::LlmProvider;
use crate::store::ChatStore;

pub fn configure_routes(
    store: ChatStore,
    provider: Arc<dyn LlmProvider>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let locks = ConversationLocks::new();

    let api = warp::path("api");

    // GET /api/conversations
    let list_conversations = api
        .and(warp::path("conversations"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(handlers::list_conversations_handler);

    // POST /api/conversations
    let create_conversation = api
        .and(warp::path("conversations"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(handlers::create_conversation_handler);

    // GET /api/conversations/{id}/messages
    let get_messages = api
        .and(warp::path("conversations"))
        .and(warp::path::param::<i64>())
        .and(warp::path("messages"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(handlers::get_messages_handler);

    // DELETE /api/conversations/{id}
    let delete_conversation = api
        .and(warp::path("conversations"))
        .and(warp::path::param::<i64>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_store(store.clone()))
        .and_then(handlers::delete_conversation_handler);

    // POST /api/chat
    let chat = api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_store(store))
        .and(with_provider(provider))
        .and(with_locks(locks))
        .and_then(handlers::send_chat_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    // Combine routes
    list_conversations
        .or(create_conversation)
        .or(get_messages)
        .or(delete_conversation)
        .or(chat)
        .with(cors)
}

fn with_store(
    store: ChatStore,
) -> impl Filter<Extract = (ChatStore,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn with_provider(
    provider: Arc<dyn LlmProvider>,
) -> impl Filter<Extract = (Arc<dyn LlmProvider>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&provider))
}

fn with_locks(
    locks: ConversationLocks,
) -> impl Filter<Extract = (ConversationLocks,), Error = Infallible> + Clone {
    warp::any().map(move || locks.clone())
}
