use super::super::dto::{ErrorResponse, OutlineRequest, OutlineResponse, decode_images};
use super::super::error::{ApiError, api_error, from_outline, from_rejection};
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/api/outline",
    tag = "generation",
    request_body = OutlineRequest,
    responses(
        (status = 200, description = "Outline generated", body = OutlineResponse),
        (status = 400, description = "Invalid body, empty topic or invalid image", body = ErrorResponse),
        (status = 500, description = "Provider configuration problem", body = ErrorResponse),
        (status = 502, description = "Text provider failed", body = ErrorResponse)
    )
)]
pub async fn outline_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<OutlineRequest>, JsonRejection>,
) -> Result<Json<OutlineResponse>, ApiError> {
    let Json(payload) = payload.map_err(from_rejection)?;
    info!(images = payload.images.len(), "Received /api/outline request");

    let images = decode_images(&payload.images).map_err(|message| {
        error!(%message, "Rejecting /api/outline request");
        api_error(StatusCode::BAD_REQUEST, message)
    })?;

    match state.outline().generate_outline(&payload.topic, images).await {
        Ok(result) => Ok(Json(OutlineResponse {
            success: true,
            result,
        })),
        Err(err) => {
            error!(error = %err, "Outline generation failed");
            Err(from_outline(&err))
        }
    }
}
