use rag_chatbot::api::{create_router, AppState};
use rag_chatbot::infrastructure::{initialize, AppConfig};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_chatbot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let components = initialize(&config).await;
    if components.pipeline.is_ready() {
        info!("RAG pipeline ready");
    } else {
        info!("RAG pipeline unavailable, serving fallback responses");
    }

    let state = AppState::new(components, config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
