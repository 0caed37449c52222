use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chat_relay::config::ServerConfig;
use chat_relay::llm::{GroqClient, GroqConfig, LlmProvider};
use chat_relay::routes::configure_routes;
use chat_relay::store::ChatStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let store = ChatStore::open(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "database connected");

    if config.has_credential() {
        tracing::info!(model = %config.groq_model, "AI capabilities enabled with Groq API");
    } else {
        tracing::warn!(
            "running in demo mode (no GROQ_API_KEY detected); chat turns will get the fallback message"
        );
    }

    let provider: Arc<dyn LlmProvider> = Arc::new(GroqClient::new(
        GroqConfig::new(config.credential()).with_model(&config.groq_model),
    )?);

    let routes = configure_routes(store, provider);

    let addr: SocketAddr = ([127, 0, 0, 1], config.port).into();
    let server = warp::serve(routes).bind(addr).await;
    tracing::info!("server running on http://{}", addr);

    server
        .graceful(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .run()
        .await;
    tracing::info!("shutting down");

    Ok(())
}
