use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::config::AppSettings;
use crate::constants::MAX_BODY_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

/// Build the application router over prepared state.
pub fn build_router(state: ServerState) -> Router {
    let cors = cors_layer(&state.settings().cors_origins);
    let static_dir = state.settings().static_dir.clone();

    let api = Router::new()
        .route("/api/health", get(routes::health::health_handler))
        .route("/api/outline", post(routes::outline::outline_handler))
        .route("/api/generate", post(routes::generate::generate_handler))
        .route("/api/regenerate", post(routes::generate::regenerate_handler))
        .route("/api/images/{filename}", get(routes::images::image_handler))
        .route("/api/history", get(routes::history::list_handler))
        .route(
            "/api/history/{id}",
            get(routes::history::get_handler).delete(routes::history::delete_handler),
        )
        .route("/api/config", get(routes::config::config_get_handler))
        .route(
            "/api/config/active",
            put(routes::config::config_active_handler),
        )
        .route(
            "/api-doc/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(Arc::new(state));

    let app = match static_dir {
        Some(dir) => api.fallback_service(frontend(&dir)),
        None => api,
    };

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C.
pub(super) async fn serve(settings: AppSettings, addr: SocketAddr) -> Result<(), ServerError> {
    let state = ServerState::new(settings)?;
    let app = build_router(state);

    info!(%addr, "Binding REST server");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = origin.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Serve a built single-page frontend, falling back to its `index.html`.
fn frontend(dir: &Path) -> ServeDir<ServeFile> {
    info!(dir = %dir.display(), "Serving static frontend");
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
