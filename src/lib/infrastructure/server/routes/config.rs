use super::super::dto::{ActiveProviderRequest, ConfigResponse, ErrorResponse};
use super::super::error::{ApiError, api_error, from_config, from_rejection};
use super::super::state::ServerState;
use crate::config::{ProviderCategory, ProvidersFile, set_active_provider};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    get,
    path = "/api/config",
    tag = "config",
    responses(
        (status = 200, description = "Provider configuration with masked keys", body = ConfigResponse),
        (status = 500, description = "Configuration could not be loaded", body = ErrorResponse)
    )
)]
pub async fn config_get_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let settings = state.settings();
    let load = |category| {
        settings
            .providers(category)
            .map(|file| file.masked())
            .map_err(|err| {
                error!(%category, error = %err, "Failed to load provider configuration");
                from_config(&err)
            })
    };

    Ok(Json(ConfigResponse {
        text: load(ProviderCategory::Text)?,
        image: load(ProviderCategory::Image)?,
    }))
}

#[utoipa::path(
    put,
    path = "/api/config/active",
    tag = "config",
    request_body = ActiveProviderRequest,
    responses(
        (status = 200, description = "Active provider switched", body = ProvidersFile),
        (status = 400, description = "Invalid body or undeclared provider", body = ErrorResponse),
        (status = 500, description = "Configuration could not be written", body = ErrorResponse)
    )
)]
pub async fn config_active_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ActiveProviderRequest>, JsonRejection>,
) -> Result<Json<ProvidersFile>, ApiError> {
    let Json(payload) = payload.map_err(from_rejection)?;
    let provider = payload.provider.trim();
    if provider.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "provider cannot be empty"));
    }

    let updated = set_active_provider(&state.settings().config_dir, payload.category, provider)
        .map_err(|err| {
            error!(
                category = %payload.category,
                provider,
                error = %err,
                "Failed to switch provider"
            );
            from_config(&err)
        })?;
    info!(category = %payload.category, provider, "Active provider switched");
    Ok(Json(updated.masked()))
}
