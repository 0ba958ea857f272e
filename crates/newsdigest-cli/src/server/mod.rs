//! HTTP transport for the summary pipeline
//!
//! # Routes
//!
//! - `GET /` - Service status
//! - `POST /summarize` - NDJSON stream of summaries for a URL or parameter map
//! - `POST /summarize/events` - Same, as server-sent events
//! - `POST /top-headlines` - NDJSON stream restricted to top headlines
//! - `GET /top-headlines` - Aggregated digest of top headlines
//! - `GET /headlines/:category` - NDJSON stream for a category preset

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use newsdigest_core::{AppConfig, SummaryPipeline};

pub mod error_response;
pub mod routes;
pub mod state;

pub use error_response::ApiError;
pub use state::AppState;

/// Create the router with all routes and the CORS layer
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(routes::root))
        .route("/summarize", post(routes::summarize))
        .route("/summarize/events", post(routes::summarize_events))
        .route(
            "/top-headlines",
            post(routes::top_headlines_stream).get(routes::top_headlines_digest),
        )
        .route("/headlines/:category", get(routes::category_headlines))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Bind and serve until the process is stopped
pub async fn start_server(config: Arc<AppConfig>, bind_address: &str) -> anyhow::Result<()> {
    let pipeline = SummaryPipeline::from_config(&config)?;
    let app = create_router(AppState::new(pipeline, config));

    let listener = TcpListener::bind(bind_address).await?;
    tracing::info!(address = %bind_address, "HTTP server listening");

    axum::serve(listener, app).await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
