//! Process configuration from environment variables

use std::env;
use std::path::PathBuf;

use crate::llm::groq::{DEFAULT_MODEL, DEMO_API_KEY};

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Groq API credential; None means demo mode
    pub groq_api_key: Option<String>,
    /// Groq model identifier
    pub groq_model: String,
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(3000);

        let database_path = env::var("CHAT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("chat.db"));

        let groq_api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let groq_model = env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            port,
            database_path,
            groq_api_key,
            groq_model,
        }
    }

    /// Whether a real upstream credential is configured
    pub fn has_credential(&self) -> bool {
        self.groq_api_key.is_some()
    }

    /// The credential to send upstream; the demo placeholder fails
    /// authentication, which routes every chat turn through the fallback.
    pub fn credential(&self) -> &str {
        self.groq_api_key.as_deref().unwrap_or(DEMO_API_KEY)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_path: PathBuf::from("chat.db"),
            groq_api_key: None,
            groq_model: DEFAULT_MODEL.to_string(),
        }
    }
}
