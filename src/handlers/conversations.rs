// Conversation CRUD handlers

use std::convert::Infallible;

use warp::http::StatusCode;

use crate::models::{
    CreateConversationRequest, CreateConversationResponse, DeleteConversationResponse, ErrorBody,
};
use crate::store::ChatStore;

/// Title assigned when the client does not provide one
pub const DEFAULT_TITLE: &str = "New Chat";

/// GET /api/conversations
pub async fn list_conversations_handler(
    store: ChatStore,
) -> Result<impl warp::Reply, Infallible> {
    match store.list_conversations().await {
        Ok(conversations) => Ok(warp::reply::with_status(
            warp::reply::json(&conversations),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch conversations");
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorBody::new("Failed to fetch conversations")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

/// POST /api/conversations
pub async fn create_conversation_handler(
    request: CreateConversationRequest,
    store: ChatStore,
) -> Result<impl warp::Reply, Infallible> {
    let title = request.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());

    match store.create_conversation(&title).await {
        Ok(id) => {
            tracing::info!(conversation_id = id, title = %title, "conversation created");
            Ok(warp::reply::with_status(
                warp::reply::json(&CreateConversationResponse { id, title }),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create conversation");
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorBody::new("Failed to create conversation")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

/// GET /api/conversations/{id}/messages
pub async fn get_messages_handler(
    conversation_id: i64,
    store: ChatStore,
) -> Result<impl warp::Reply, Infallible> {
    match store.get_messages(conversation_id).await {
        Ok(messages) => Ok(warp::reply::with_status(
            warp::reply::json(&messages),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!(conversation_id, error = %e, "failed to fetch messages");
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorBody::new("Failed to fetch messages")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

/// DELETE /api/conversations/{id}
pub async fn delete_conversation_handler(
    conversation_id: i64,
    store: ChatStore,
) -> Result<impl warp::Reply, Infallible> {
    match store.delete_conversation(conversation_id).await {
        Ok(()) => {
            tracing::info!(conversation_id, "conversation deleted");
            Ok(warp::reply::with_status(
                warp::reply::json(&DeleteConversationResponse { success: true }),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            tracing::error!(conversation_id, error = %e, "failed to delete conversation");
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorBody::new("Failed to delete conversation")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}
