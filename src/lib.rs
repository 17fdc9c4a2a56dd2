// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod storage;

use crate::handlers::{all_visitors, health_check, track_visitor, visitor_counts};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request as AxumRequest},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::{path::PathBuf, sync::Arc, time::Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

// Re-export key types for convenience.
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use state::AppState;

/// Build the application router.
///
/// The visitor API sits under `/api` behind a permissive CORS layer (any
/// origin, GET/POST/OPTIONS); the health probe stays outside it.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api_routes = Router::new()
        .route("/visitors/track", post(track_visitor))
        .route("/visitors/count", get(visitor_counts))
        .route("/visitors/all", get(all_visitors))
        .layer(cors);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .with_state(state)
}

/// Middleware attaching a request ID and a tracing span to every request.
async fn trace_requests(
    mut req: AxumRequest<Body>,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        http.method = %method,
        url.path = %path,
    );

    req.extensions_mut().insert(request_id);

    async move {
        let mut response = next.run(req).await;
        let elapsed = start_time.elapsed();

        response.headers_mut().insert(
            "X-Request-ID",
            HeaderValue::from_str(&request_id.to_string()).unwrap(),
        );

        info!(
            http.response.duration = ?elapsed,
            http.status_code = response.status().as_u16(),
            "Finished processing request"
        );

        response
    }
    .instrument(span)
    .await
}

/// Main application setup: configuration, state, router.
pub async fn run(
    config_path_override: Option<PathBuf>,
) -> std::result::Result<(Router, AppConfig), AppError> {
    info!("Starting visitor analytics service...");

    let config_path = config_path_override.unwrap_or_else(|| {
        std::env::var("CONFIG_PATH").map_or_else(|_| PathBuf::from("config.yaml"), PathBuf::from)
    });

    let config_path_display = config_path.display().to_string();
    if config_path.exists() {
        info!(config.path = %config_path_display, "Using configuration file");
    } else {
        info!(config.path = %config_path_display, "Optional configuration file not found. Using defaults and environment variables.");
    }

    let app_config = config::load_config(&config_path).map_err(|e| {
        error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration. Exiting."
        );
        e
    })?;

    let backend = if app_config.mongodb_uri.is_some() { "mongodb" } else { "file" };
    info!(
        server.port = app_config.server.port,
        storage.backend = backend,
        "Configuration loaded and validated successfully."
    );

    let app_state = AppState::new(&app_config).await.map_err(|e| {
        error!(error = ?e, "Failed to initialize application state. Exiting.");
        e
    })?;

    let app = create_router(Arc::new(app_state))
        .layer(axum::middleware::from_fn(trace_requests));

    Ok((app, app_config))
}
