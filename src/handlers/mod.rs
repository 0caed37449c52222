// Handlers module

pub mod chat;
pub mod conversations;

pub use chat::{send_chat_handler, ConversationLocks};
pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_messages_handler,
    list_conversations_handler,
};
