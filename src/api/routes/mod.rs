pub mod chatbot;

use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, Method};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::middleware;
use crate::api::state::AppState;

/// Assembles the full application router: the chatbot API under
/// `/api/chatbot`, static frontend files at the root, and a JSON 404 for
/// everything else.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors.allowed_origins);
    let static_files = ServeDir::new(&state.config.server.static_dir)
        .not_found_service(chatbot::endpoint_not_found.into_service());

    Router::new()
        .nest("/api/chatbot", chatbot_routes())
        .fallback_service(static_files)
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logger,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn chatbot_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(chatbot::query_chatbot))
        .route("/status", get(chatbot::get_status))
        .route("/process-document", post(chatbot::process_document))
        .route("/health", get(chatbot::health_check))
        .fallback(chatbot::endpoint_not_found)
}
